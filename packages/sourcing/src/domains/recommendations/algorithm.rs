use serde::{Deserialize, Serialize};

use crate::common::ValidationError;

/// Recommendation strategy, selected by name per call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationAlgorithm {
    /// Weighted mix of the four signal strategies
    Blended,
    BrowsingHistory,
    IndustryPeers,
    Trending,
    SimilarBuyers,
}

impl RecommendationAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationAlgorithm::Blended => "blended",
            RecommendationAlgorithm::BrowsingHistory => "browsing_history",
            RecommendationAlgorithm::IndustryPeers => "industry_peers",
            RecommendationAlgorithm::Trending => "trending",
            RecommendationAlgorithm::SimilarBuyers => "similar_buyers",
        }
    }
}

impl Default for RecommendationAlgorithm {
    fn default() -> Self {
        RecommendationAlgorithm::Blended
    }
}

impl std::fmt::Display for RecommendationAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecommendationAlgorithm {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "blended" | "default" => Ok(RecommendationAlgorithm::Blended),
            "browsing_history" => Ok(RecommendationAlgorithm::BrowsingHistory),
            "industry_peers" => Ok(RecommendationAlgorithm::IndustryPeers),
            "trending" => Ok(RecommendationAlgorithm::Trending),
            "similar_buyers" => Ok(RecommendationAlgorithm::SimilarBuyers),
            _ => Err(ValidationError::UnknownAlgorithm(s.to_string())),
        }
    }
}
