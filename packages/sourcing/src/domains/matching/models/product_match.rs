use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::common::{MatchId, ProductId, RequirementId, SupplierId};
use crate::domains::matching::models::{
    AttributeScore, CommercialTerms, DeliveryTerms, MatchResult, ServiceTerms,
};

/// Persisted match record - one per (requirement, product) per matching run.
///
/// Written once, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductMatch {
    pub id: MatchId,
    pub requirement_id: RequirementId,
    /// 1-based position in the ranked run.
    pub rank: i32,
    #[serde(flatten)]
    pub result: MatchResult,
    pub created_at: DateTime<Utc>,
}

impl ProductMatch {
    /// Assign ids and ranks to an ordered run of results.
    pub fn from_results(requirement_id: RequirementId, results: Vec<MatchResult>) -> Vec<Self> {
        let created_at = Utc::now();
        results
            .into_iter()
            .enumerate()
            .map(|(idx, result)| ProductMatch {
                id: MatchId::new(),
                requirement_id,
                rank: idx as i32 + 1,
                result,
                created_at,
            })
            .collect()
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductMatchRow {
    id: MatchId,
    requirement_id: RequirementId,
    product_id: ProductId,
    supplier_id: SupplierId,
    category: String,
    rank: i32,
    fit_score: f64,
    rationale: String,
    assumptions: Json<Vec<String>>,
    attributes: Json<Vec<AttributeScore>>,
    commercial_terms: Json<CommercialTerms>,
    delivery_terms: Json<DeliveryTerms>,
    service_terms: Json<ServiceTerms>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductMatchRow> for ProductMatch {
    type Error = anyhow::Error;

    fn try_from(row: ProductMatchRow) -> Result<Self> {
        Ok(ProductMatch {
            id: row.id,
            requirement_id: row.requirement_id,
            rank: row.rank,
            result: MatchResult {
                product_id: row.product_id,
                supplier_id: row.supplier_id,
                category: row.category.parse()?,
                fit_score: row.fit_score,
                rationale: row.rationale,
                assumptions: row.assumptions.0,
                attributes: row.attributes.0,
                commercial: row.commercial_terms.0,
                delivery: row.delivery_terms.0,
                service: row.service_terms.0,
            },
            created_at: row.created_at,
        })
    }
}

impl ProductMatch {
    /// Atomically record a matching run.
    ///
    /// Flips the requirement from `pending` to `matched` and inserts every
    /// match inside one transaction. If the requirement is no longer pending,
    /// or any insert fails, nothing is written.
    pub async fn record_run(
        requirement_id: RequirementId,
        matches: &[ProductMatch],
        pool: &PgPool,
    ) -> Result<usize> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE requirements
            SET status = 'matched', matched_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(requirement_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            bail!("Requirement {} is not pending", requirement_id);
        }

        for m in matches {
            sqlx::query(
                r#"
                INSERT INTO product_matches (
                    id, requirement_id, product_id, supplier_id, category, rank,
                    fit_score, rationale, assumptions, attributes,
                    commercial_terms, delivery_terms, service_terms, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                "#,
            )
            .bind(m.id)
            .bind(m.requirement_id)
            .bind(m.result.product_id)
            .bind(m.result.supplier_id)
            .bind(m.result.category.as_str())
            .bind(m.rank)
            .bind(m.result.fit_score)
            .bind(&m.result.rationale)
            .bind(Json(&m.result.assumptions))
            .bind(Json(&m.result.attributes))
            .bind(Json(&m.result.commercial))
            .bind(Json(&m.result.delivery))
            .bind(Json(&m.result.service))
            .bind(m.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(matches.len())
    }

    /// All matches for a requirement, best first
    pub async fn find_by_requirement(
        requirement_id: RequirementId,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, ProductMatchRow>(
            "SELECT * FROM product_matches WHERE requirement_id = $1 ORDER BY rank",
        )
        .bind(requirement_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(ProductMatch::try_from).collect()
    }
}
