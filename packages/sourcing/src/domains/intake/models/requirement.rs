use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::BTreeMap;
use typed_builder::TypedBuilder;

use crate::common::{OrganizationId, RequirementId, UserId};
use crate::domains::products::models::{PriceRange, RobotCategory};

/// Intake status for type-safe querying
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStatus {
    Pending,
    Matched,
}

impl std::fmt::Display for IntakeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeStatus::Pending => write!(f, "pending"),
            IntakeStatus::Matched => write!(f, "matched"),
        }
    }
}

impl std::str::FromStr for IntakeStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(IntakeStatus::Pending),
            "matched" => Ok(IntakeStatus::Matched),
            _ => Err(anyhow::anyhow!("Invalid intake status: {}", s)),
        }
    }
}

/// What the buyer asked for, in canonical form. This is the matching input.
///
/// `category: None` means the buyer accepts any robot family.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
pub struct RequirementCriteria {
    #[builder(setter(strip_option))]
    pub category: Option<RobotCategory>,
    #[builder(setter(strip_option))]
    pub payload_kg: Option<f64>,
    #[builder(setter(strip_option))]
    pub reach_mm: Option<f64>,
    #[builder(setter(strip_option))]
    pub repeatability_mm: Option<f64>,
    #[builder(setter(strip_option))]
    pub speed_mps: Option<f64>,
    #[builder(setter(strip_option))]
    pub ip_rating: Option<String>,
    #[builder(setter(strip_option))]
    pub controller: Option<String>,
    #[builder(setter(strip_option))]
    pub budget: Option<PriceRange>,
    #[builder(default = "USD".to_string())]
    pub currency: String,
    #[builder(setter(strip_option))]
    pub max_lead_time_days: Option<i32>,
    pub specs: BTreeMap<String, String>,
}

impl RequirementCriteria {
    /// Whether anything beyond the category narrows the match.
    pub fn has_constraints(&self) -> bool {
        self.payload_kg.is_some()
            || self.reach_mm.is_some()
            || self.repeatability_mm.is_some()
            || self.speed_mps.is_some()
            || self.ip_rating.is_some()
            || self.controller.is_some()
            || self.budget.is_some()
            || self.max_lead_time_days.is_some()
            || !self.specs.is_empty()
    }
}

/// A validated submission that has not been stored yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewRequirement {
    pub organization_id: OrganizationId,
    pub submitted_by: UserId,
    pub title: Option<String>,
    pub criteria: RequirementCriteria,
}

/// Stored buyer requirement. Immutable apart from the status transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Requirement {
    pub id: RequirementId,
    pub organization_id: OrganizationId,
    pub submitted_by: UserId,
    pub title: Option<String>,
    pub criteria: RequirementCriteria,
    pub status: IntakeStatus,
    pub created_at: DateTime<Utc>,
    pub matched_at: Option<DateTime<Utc>>,
}

impl Requirement {
    /// Materialize a new pending requirement from a validated submission.
    pub fn pending(new: NewRequirement) -> Self {
        Self {
            id: RequirementId::new(),
            organization_id: new.organization_id,
            submitted_by: new.submitted_by,
            title: new.title,
            criteria: new.criteria,
            status: IntakeStatus::Pending,
            created_at: Utc::now(),
            matched_at: None,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct RequirementRow {
    id: RequirementId,
    organization_id: OrganizationId,
    submitted_by: UserId,
    title: Option<String>,
    category: Option<String>,
    payload_kg: Option<f64>,
    reach_mm: Option<f64>,
    repeatability_mm: Option<f64>,
    speed_mps: Option<f64>,
    ip_rating: Option<String>,
    controller: Option<String>,
    budget_min: Option<Decimal>,
    budget_max: Option<Decimal>,
    currency: String,
    max_lead_time_days: Option<i32>,
    specs: Json<BTreeMap<String, String>>,
    status: String,
    created_at: DateTime<Utc>,
    matched_at: Option<DateTime<Utc>>,
}

impl TryFrom<RequirementRow> for Requirement {
    type Error = anyhow::Error;

    fn try_from(row: RequirementRow) -> Result<Self> {
        let category = row
            .category
            .as_deref()
            .map(str::parse::<RobotCategory>)
            .transpose()?;

        Ok(Requirement {
            id: row.id,
            organization_id: row.organization_id,
            submitted_by: row.submitted_by,
            title: row.title,
            criteria: RequirementCriteria {
                category,
                payload_kg: row.payload_kg,
                reach_mm: row.reach_mm,
                repeatability_mm: row.repeatability_mm,
                speed_mps: row.speed_mps,
                ip_rating: row.ip_rating,
                controller: row.controller,
                budget: PriceRange::from_bounds(row.budget_min, row.budget_max),
                currency: row.currency,
                max_lead_time_days: row.max_lead_time_days,
                specs: row.specs.0,
            },
            status: row.status.parse()?,
            created_at: row.created_at,
            matched_at: row.matched_at,
        })
    }
}

impl Requirement {
    /// Insert a new pending requirement
    pub async fn create(new: NewRequirement, pool: &PgPool) -> Result<Self> {
        let requirement = Requirement::pending(new);
        let criteria = &requirement.criteria;

        sqlx::query(
            r#"
            INSERT INTO requirements (
                id, organization_id, submitted_by, title, category,
                payload_kg, reach_mm, repeatability_mm, speed_mps,
                ip_rating, controller, budget_min, budget_max, currency,
                max_lead_time_days, specs, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(requirement.id)
        .bind(requirement.organization_id)
        .bind(requirement.submitted_by)
        .bind(&requirement.title)
        .bind(criteria.category.map(|c| c.as_str()))
        .bind(criteria.payload_kg)
        .bind(criteria.reach_mm)
        .bind(criteria.repeatability_mm)
        .bind(criteria.speed_mps)
        .bind(&criteria.ip_rating)
        .bind(&criteria.controller)
        .bind(criteria.budget.map(|b| b.min))
        .bind(criteria.budget.map(|b| b.max))
        .bind(&criteria.currency)
        .bind(criteria.max_lead_time_days)
        .bind(Json(&criteria.specs))
        .bind(requirement.status.to_string())
        .bind(requirement.created_at)
        .execute(pool)
        .await?;

        Ok(requirement)
    }

    /// Find requirement by ID, returning None if not found
    pub async fn find_by_id(id: RequirementId, pool: &PgPool) -> Result<Option<Self>> {
        let row = sqlx::query_as::<_, RequirementRow>("SELECT * FROM requirements WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        row.map(Requirement::try_from).transpose()
    }
}
