//! Requirement read actions

use crate::common::{CoreError, RequirementId, ValidationError};
use crate::domains::intake::models::Requirement;
use crate::domains::matching::ProductMatch;
use crate::kernel::ServerDeps;

/// Load a requirement by its string id.
pub async fn get_requirement(
    requirement_id: &str,
    deps: &ServerDeps,
) -> Result<Requirement, CoreError> {
    let id = parse_requirement_id(requirement_id)?;
    deps.match_store
        .find_requirement(id)
        .await
        .map_err(CoreError::DataUnavailable)?
        .ok_or(CoreError::NotFound(id))
}

/// Persisted matches for a requirement, best first.
///
/// Empty for a requirement that is still pending.
pub async fn get_matches(
    requirement_id: &str,
    deps: &ServerDeps,
) -> Result<Vec<ProductMatch>, CoreError> {
    let requirement = get_requirement(requirement_id, deps).await?;
    deps.match_store
        .matches_for_requirement(requirement.id)
        .await
        .map_err(CoreError::DataUnavailable)
}

fn parse_requirement_id(raw: &str) -> Result<RequirementId, ValidationError> {
    RequirementId::parse(raw)
        .ok()
        .filter(|id| !id.is_nil())
        .ok_or_else(|| ValidationError::MalformedIdentity {
            field: "requirement_id",
            value: raw.to_string(),
        })
}
