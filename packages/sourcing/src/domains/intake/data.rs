use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Raw buyer intake submission, as received from the surrounding application.
///
/// Everything is optional at this layer so that missing fields surface as
/// `ValidationError`s from the normalizer instead of deserialization errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementInput {
    pub organization_id: Option<String>,
    pub submitted_by: Option<String>,
    pub title: Option<String>,
    /// Robot family, or `"any"`.
    pub category: Option<String>,
    pub payload_kg: Option<f64>,
    pub reach_mm: Option<f64>,
    pub repeatability_mm: Option<f64>,
    pub speed_mps: Option<f64>,
    pub ip_rating: Option<String>,
    pub controller: Option<String>,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    pub currency: Option<String>,
    pub max_lead_time_days: Option<i32>,
    /// Free-form spec map; nested objects are flattened to dotted keys.
    pub specs: Option<serde_json::Value>,
}
