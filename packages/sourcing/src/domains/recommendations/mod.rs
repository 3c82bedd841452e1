//! Recommendations domain - personalized product suggestions from historical signals

pub mod activities;
pub mod algorithm;
pub mod engine;
pub mod models;

pub use activities::{recommend, RecommendationRequest};
pub use algorithm::RecommendationAlgorithm;
pub use engine::RecommendationEngine;
pub use models::{Recommendation, RecommendationQuery, SignalSnapshot};
