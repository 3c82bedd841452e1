use serde::{Deserialize, Serialize};

use crate::common::{ProductId, SupplierId};
use crate::domains::products::models::{PriceRange, RobotCategory};

/// Attributes the matching engine scores, with their aggregation weights.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchAttribute {
    Payload,
    Reach,
    Repeatability,
    Speed,
    Environment,
    Controller,
    Price,
    LeadTime,
    Specs,
}

impl MatchAttribute {
    /// Aggregation weight. The weights of all attributes sum to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            MatchAttribute::Payload => 0.24,
            MatchAttribute::Reach => 0.14,
            MatchAttribute::Repeatability => 0.14,
            MatchAttribute::Speed => 0.10,
            MatchAttribute::Environment => 0.10,
            MatchAttribute::Controller => 0.05,
            MatchAttribute::Price => 0.12,
            MatchAttribute::LeadTime => 0.06,
            MatchAttribute::Specs => 0.05,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchAttribute::Payload => "payload",
            MatchAttribute::Reach => "reach",
            MatchAttribute::Repeatability => "repeatability",
            MatchAttribute::Speed => "speed",
            MatchAttribute::Environment => "environmental rating",
            MatchAttribute::Controller => "controller",
            MatchAttribute::Price => "price",
            MatchAttribute::LeadTime => "lead time",
            MatchAttribute::Specs => "specifications",
        }
    }
}

/// How well one attribute lined up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Assessment {
    Matched,
    Approximated,
    Missing,
}

/// Per-attribute breakdown of a fit score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeScore {
    pub attribute: MatchAttribute,
    /// Closeness in `[0, 1]`, rounded to three decimals.
    pub score: f64,
    pub assessment: Assessment,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommercialTerms {
    pub price: Option<PriceRange>,
    pub currency: String,
    /// `None` when the buyer gave no budget or the currencies differ.
    pub within_budget: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryTerms {
    pub lead_time_days: Option<i32>,
    /// `None` when either side left lead time unspecified.
    pub meets_deadline: Option<bool>,
    pub includes_installation: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceTerms {
    pub warranty_months: Option<i32>,
    pub support_tier: Option<String>,
}

/// One scored candidate from a matching run.
///
/// Contains no generated ids or timestamps, so identical inputs serialize
/// to identical bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub product_id: ProductId,
    pub supplier_id: SupplierId,
    pub category: RobotCategory,
    /// Bounded fit score, 0.0 to 100.0 with one decimal.
    pub fit_score: f64,
    pub rationale: String,
    pub assumptions: Vec<String>,
    pub attributes: Vec<AttributeScore>,
    pub commercial: CommercialTerms,
    pub delivery: DeliveryTerms,
    pub service: ServiceTerms,
}
