use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::common::{OrganizationId, ProductId, UserId};
use crate::domains::recommendations::algorithm::RecommendationAlgorithm;

pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 50;

/// Clamp a caller-supplied result count into `[MIN_LIMIT, MAX_LIMIT]`.
pub fn clamp_limit(requested: i64) -> usize {
    requested.clamp(MIN_LIMIT as i64, MAX_LIMIT as i64) as usize
}

/// Validated recommendation query handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationQuery {
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub algorithm: RecommendationAlgorithm,
    /// Already clamped.
    pub limit: usize,
    pub exclude: BTreeSet<ProductId>,
}

impl RecommendationQuery {
    pub fn new(
        user_id: UserId,
        organization_id: OrganizationId,
        algorithm: RecommendationAlgorithm,
        requested_limit: i64,
        exclude: impl IntoIterator<Item = ProductId>,
    ) -> Self {
        Self {
            user_id,
            organization_id,
            algorithm,
            limit: clamp_limit(requested_limit),
            exclude: exclude.into_iter().collect(),
        }
    }
}

/// One suggested product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub product_id: ProductId,
    /// Normalized relevance in `[0, 1]`.
    pub score: f64,
    /// Human-readable "why recommended".
    pub reason: String,
    /// Strategy that produced the item. `None` for plain catalog backfill.
    pub algorithm: Option<RecommendationAlgorithm>,
    /// True when the item came from a fallback rather than the requested strategy.
    pub fallback: bool,
}
