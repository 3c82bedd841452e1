//! Matching domain - scores supplier products against a buyer requirement

pub mod engine;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use engine::match_candidates;
pub use models::{MatchAttribute, MatchResult, ProductMatch};
