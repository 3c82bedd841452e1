//! Recommendation read activity
//!
//! Validates the request, loads a signal snapshot and ranks. Nothing is
//! written.

use tracing::{info, warn};
use typed_builder::TypedBuilder;

use crate::common::{CoreError, Id, OrganizationId, ProductId, UserId, ValidationError};
use crate::domains::recommendations::algorithm::RecommendationAlgorithm;
use crate::domains::recommendations::models::{Recommendation, RecommendationQuery};
use crate::kernel::ServerDeps;

/// Raw recommendation request as received from the caller.
#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct RecommendationRequest {
    pub user_id: String,
    pub organization_id: String,
    #[builder(default = RecommendationAlgorithm::default().to_string())]
    pub algorithm: String,
    /// Falls back to the configured default when absent.
    #[builder(default, setter(strip_option))]
    pub limit: Option<i64>,
    #[builder(default)]
    pub exclude_ids: Vec<String>,
}

/// Rank products for a buyer.
///
/// All validation happens before the snapshot is fetched, so an unknown
/// algorithm or malformed id never touches the signal source.
pub async fn recommend(
    request: RecommendationRequest,
    deps: &ServerDeps,
) -> Result<Vec<Recommendation>, CoreError> {
    let query = build_query(&request, deps.default_recommendation_limit)?;

    info!(
        user_id = %query.user_id,
        algorithm = %query.algorithm,
        limit = query.limit,
        "Computing recommendations"
    );

    let snapshot = deps
        .signals
        .load_snapshot(deps.signal_window_days)
        .await
        .map_err(CoreError::DataUnavailable)?;

    let recommendations = deps.recommendation_engine.recommend(&query, &snapshot);

    let fallbacks = recommendations.iter().filter(|r| r.fallback).count();
    if fallbacks > 0 {
        warn!(
            user_id = %query.user_id,
            algorithm = %query.algorithm,
            fallbacks,
            "Recommendations backfilled from fallback strategies"
        );
    }

    info!(
        user_id = %query.user_id,
        returned = recommendations.len(),
        "Recommendations computed"
    );

    Ok(recommendations)
}

fn build_query(
    request: &RecommendationRequest,
    default_limit: i64,
) -> Result<RecommendationQuery, ValidationError> {
    let algorithm: RecommendationAlgorithm = request.algorithm.parse()?;
    let user_id: UserId = parse_identity("user_id", &request.user_id)?;
    let organization_id: OrganizationId =
        parse_identity("organization_id", &request.organization_id)?;
    let exclude = request
        .exclude_ids
        .iter()
        .map(|raw| parse_identity("exclude_ids", raw))
        .collect::<Result<Vec<ProductId>, _>>()?;

    Ok(RecommendationQuery::new(
        user_id,
        organization_id,
        algorithm,
        request.limit.unwrap_or(default_limit),
        exclude,
    ))
}

fn parse_identity<T>(field: &'static str, raw: &str) -> Result<Id<T>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    match Id::<T>::parse(raw) {
        Ok(id) if !id.is_nil() => Ok(id),
        _ => Err(ValidationError::MalformedIdentity {
            field,
            value: raw.to_string(),
        }),
    }
}
