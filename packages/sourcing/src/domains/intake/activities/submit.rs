//! Requirement intake actions
//!
//! Normalize -> store pending requirement -> match -> persist matches and
//! flip the requirement to matched in one all-or-nothing write.

use anyhow::Context;
use serde::Serialize;
use tracing::{info, instrument};

use crate::common::{CoreError, RequirementId};
use crate::domains::intake::data::RequirementInput;
use crate::domains::intake::models::{IntakeStatus, Requirement};
use crate::domains::intake::normalize::normalize_requirement;
use crate::domains::matching::{match_candidates, ProductMatch};
use crate::kernel::ServerDeps;

/// Result of a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeOutcome {
    pub requirement: Requirement,
    /// Best first.
    pub matches: Vec<ProductMatch>,
}

/// Submit a buyer requirement and run matching for it.
///
/// If matching or persistence fails the requirement stays `pending` and can
/// be retried with [`run_matching`].
pub async fn submit_requirement(
    input: RequirementInput,
    deps: &ServerDeps,
) -> Result<IntakeOutcome, CoreError> {
    let new = normalize_requirement(input)?;

    info!(
        organization_id = %new.organization_id,
        category = ?new.criteria.category,
        "Submitting requirement"
    );

    let requirement = deps
        .match_store
        .create_requirement(new)
        .await
        .context("Failed to store requirement")
        .map_err(CoreError::Persistence)?;

    let matches = run_matching(requirement.id, deps).await?;

    // Read back so the caller sees the stored transition timestamp
    let requirement = deps
        .match_store
        .find_requirement(requirement.id)
        .await
        .context("Failed to reload matched requirement")
        .map_err(CoreError::DataUnavailable)?
        .ok_or(CoreError::NotFound(requirement.id))?;

    Ok(IntakeOutcome {
        requirement,
        matches,
    })
}

/// Match a pending requirement against the eligible catalog and persist
/// the run.
#[instrument(skip_all, fields(requirement_id = %requirement_id))]
pub async fn run_matching(
    requirement_id: RequirementId,
    deps: &ServerDeps,
) -> Result<Vec<ProductMatch>, CoreError> {
    let requirement = deps
        .match_store
        .find_requirement(requirement_id)
        .await
        .map_err(CoreError::DataUnavailable)?
        .ok_or(CoreError::NotFound(requirement_id))?;

    if requirement.status != IntakeStatus::Pending {
        return Err(CoreError::InvalidState {
            id: requirement_id,
            status: requirement.status.to_string(),
        });
    }

    let candidates = deps
        .candidates
        .eligible_candidates(requirement.criteria.category)
        .await
        .context("Failed to load candidate products")
        .map_err(CoreError::DataUnavailable)?;

    let results = match_candidates(&requirement.criteria, &candidates)?;
    let matches = ProductMatch::from_results(requirement_id, results);

    let written = deps
        .match_store
        .record_matches(requirement_id, &matches)
        .await
        .with_context(|| format!("Matching run for requirement {} rolled back", requirement_id))
        .map_err(CoreError::Persistence)?;

    info!(
        candidates = candidates.len(),
        matches = written,
        top_fit = matches.first().map(|m| m.result.fit_score),
        "Requirement matched"
    );

    Ok(matches)
}
