use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::BTreeMap;
use tracing::warn;

use crate::common::{OrganizationId, ProductId, UserId};

/// Kind of buyer interaction with a listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    View,
    Quote,
    Order,
}

impl InteractionKind {
    /// Signal strength of one event of this kind.
    pub fn weight(&self) -> f64 {
        match self {
            InteractionKind::View => 1.0,
            InteractionKind::Quote => 3.0,
            InteractionKind::Order => 5.0,
        }
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionKind::View => write!(f, "view"),
            InteractionKind::Quote => write!(f, "quote"),
            InteractionKind::Order => write!(f, "order"),
        }
    }
}

impl std::str::FromStr for InteractionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "view" => Ok(InteractionKind::View),
            "quote" => Ok(InteractionKind::Quote),
            "order" => Ok(InteractionKind::Order),
            _ => Err(anyhow::anyhow!("Invalid interaction kind: {}", s)),
        }
    }
}

/// One historical view, quote request or order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub product_id: ProductId,
    pub kind: InteractionKind,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct InteractionRow {
    user_id: UserId,
    organization_id: OrganizationId,
    product_id: ProductId,
    kind: String,
    occurred_at: DateTime<Utc>,
}

impl TryFrom<InteractionRow> for Interaction {
    type Error = anyhow::Error;

    fn try_from(row: InteractionRow) -> Result<Self> {
        Ok(Interaction {
            user_id: row.user_id,
            organization_id: row.organization_id,
            product_id: row.product_id,
            kind: row.kind.parse()?,
            occurred_at: row.occurred_at,
        })
    }
}

impl Interaction {
    /// Events in `[since, until]`, oldest first. An unknown kind fails the load.
    pub async fn find_between(
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, InteractionRow>(
            r#"
            SELECT user_id, organization_id, product_id, kind, occurred_at
            FROM interaction_events
            WHERE occurred_at >= $1 AND occurred_at <= $2
            ORDER BY occurred_at, id
            "#,
        )
        .bind(since)
        .bind(until)
        .fetch_all(pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Interaction::try_from(row).inspect_err(|e| {
                    warn!(error = %e, "Malformed interaction event");
                })
            })
            .collect::<Result<Vec<_>>>()
            .context("Interaction history contains a malformed event")
    }
}

/// Industry label of every organization that declared one.
pub async fn find_organization_industries(
    pool: &PgPool,
) -> Result<BTreeMap<OrganizationId, String>> {
    let rows = sqlx::query_as::<_, (OrganizationId, String)>(
        "SELECT id, industry FROM organizations WHERE industry IS NOT NULL",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, industry)| (id, industry.trim().to_lowercase()))
        .filter(|(_, industry)| !industry.is_empty())
        .collect())
}
