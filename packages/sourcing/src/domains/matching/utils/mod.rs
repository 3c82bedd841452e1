pub mod relevance;

pub use relevance::{check_relevance_by_fit, RelevanceConfidence, RelevanceResult};
