use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::BTreeMap;

use crate::common::OrganizationId;
use crate::domains::products::models::Product;
use crate::domains::recommendations::models::interaction::{
    find_organization_industries, Interaction,
};

const MAX_WINDOW_DAYS: i64 = 3_650;

/// Read-only bundle of everything one recommendation call scores over.
///
/// `as_of` anchors recency decay, so the engine never reads the clock.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SignalSnapshot {
    /// Eligible catalog: published and not deleted.
    pub catalog: Vec<Product>,
    pub interactions: Vec<Interaction>,
    /// Lowercased industry per organization.
    pub industries: BTreeMap<OrganizationId, String>,
    pub as_of: DateTime<Utc>,
}

impl SignalSnapshot {
    /// Load the catalog plus the trailing `window_days` of interaction events.
    pub async fn load(window_days: i64, pool: &PgPool) -> Result<Self> {
        let as_of = Utc::now();
        let since = as_of - Duration::days(window_days.clamp(0, MAX_WINDOW_DAYS));

        let catalog = Product::find_eligible(None, pool)
            .await
            .context("Failed to load eligible catalog")?;
        let interactions = Interaction::find_between(since, as_of, pool)
            .await
            .context("Failed to load interaction events")?;
        let industries = find_organization_industries(pool)
            .await
            .context("Failed to load organization industries")?;

        Ok(Self {
            catalog,
            interactions,
            industries,
            as_of,
        })
    }
}
