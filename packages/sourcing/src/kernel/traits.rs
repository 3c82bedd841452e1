// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Scoring lives in the domain engines; these only move data in and out.
//
// Naming convention: Base* for trait names (e.g., BaseCandidateSource)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::RequirementId;
use crate::domains::intake::models::{NewRequirement, Requirement};
use crate::domains::matching::ProductMatch;
use crate::domains::products::models::{Product, RobotCategory};
use crate::domains::recommendations::models::SignalSnapshot;

// =============================================================================
// Candidate Source (read-only catalog)
// =============================================================================

#[async_trait]
pub trait BaseCandidateSource: Send + Sync {
    /// Published, non-deleted products. `None` means every category.
    async fn eligible_candidates(&self, category: Option<RobotCategory>) -> Result<Vec<Product>>;
}

// =============================================================================
// Match Store (requirements + match persistence)
// =============================================================================

#[async_trait]
pub trait BaseMatchStore: Send + Sync {
    /// Store a new requirement in `pending` state.
    async fn create_requirement(&self, new: NewRequirement) -> Result<Requirement>;

    async fn find_requirement(&self, id: RequirementId) -> Result<Option<Requirement>>;

    /// Write every match of a run and move the requirement to `matched`.
    ///
    /// All-or-nothing: on any error no match is visible and the requirement
    /// is still `pending`. Fails if the requirement is not pending.
    async fn record_matches(
        &self,
        requirement_id: RequirementId,
        matches: &[ProductMatch],
    ) -> Result<usize>;

    /// Matches of the last run, best first.
    async fn matches_for_requirement(&self, id: RequirementId) -> Result<Vec<ProductMatch>>;
}

// =============================================================================
// Signal Source (read-only interaction history)
// =============================================================================

#[async_trait]
pub trait BaseSignalSource: Send + Sync {
    /// Eligible catalog plus the trailing `window_days` of interaction events.
    async fn load_snapshot(&self, window_days: i64) -> Result<SignalSnapshot>;
}
