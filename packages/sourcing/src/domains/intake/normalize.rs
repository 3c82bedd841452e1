//! Requirement normalizer
//!
//! Turns a raw [`RequirementInput`] into a canonical [`NewRequirement`]:
//! identities parsed, category resolved, numbers range-checked, text trimmed
//! and the free-form spec map flattened. Pure; no I/O.

use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::common::{Id, OrganizationId, UserId, ValidationError};
use crate::domains::intake::data::RequirementInput;
use crate::domains::intake::models::{NewRequirement, RequirementCriteria};
use crate::domains::products::models::{PriceRange, RobotCategory};

/// Category value meaning "any robot family".
pub const ANY_CATEGORY: &str = "any";

const DEFAULT_CURRENCY: &str = "USD";

pub fn normalize_requirement(input: RequirementInput) -> Result<NewRequirement, ValidationError> {
    let organization_id: OrganizationId =
        parse_identity("organization_id", input.organization_id.as_deref())?;
    let submitted_by: UserId = parse_identity("submitted_by", input.submitted_by.as_deref())?;

    let category = parse_category(input.category.as_deref())?;

    let criteria = RequirementCriteria {
        category,
        payload_kg: positive("payload_kg", input.payload_kg)?,
        reach_mm: positive("reach_mm", input.reach_mm)?,
        repeatability_mm: positive("repeatability_mm", input.repeatability_mm)?,
        speed_mps: positive("speed_mps", input.speed_mps)?,
        ip_rating: clean_text(input.ip_rating).map(|r| r.to_ascii_uppercase()),
        controller: clean_text(input.controller),
        budget: parse_budget(input.budget_min, input.budget_max)?,
        currency: parse_currency(input.currency)?,
        max_lead_time_days: non_negative_days(input.max_lead_time_days)?,
        specs: match input.specs {
            Some(value) => flatten_specs(value)?,
            None => BTreeMap::new(),
        },
    };

    Ok(NewRequirement {
        organization_id,
        submitted_by,
        title: clean_text(input.title),
        criteria,
    })
}

fn parse_identity<T>(field: &'static str, raw: Option<&str>) -> Result<Id<T>, ValidationError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingField(field))?;

    let id = Id::<T>::parse(raw).map_err(|_| ValidationError::MalformedIdentity {
        field,
        value: raw.to_string(),
    })?;

    if id.is_nil() {
        return Err(ValidationError::MalformedIdentity {
            field,
            value: raw.to_string(),
        });
    }
    Ok(id)
}

fn parse_category(raw: Option<&str>) -> Result<Option<RobotCategory>, ValidationError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingField("category"))?;

    if raw.eq_ignore_ascii_case(ANY_CATEGORY) {
        return Ok(None);
    }
    raw.parse::<RobotCategory>().map(Some)
}

fn positive(field: &'static str, value: Option<f64>) -> Result<Option<f64>, ValidationError> {
    match value {
        None => Ok(None),
        Some(v) if !v.is_finite() => {
            Err(ValidationError::invalid(field, "must be a finite number"))
        }
        Some(v) if v <= 0.0 => {
            Err(ValidationError::invalid(field, "must be greater than zero"))
        }
        Some(v) => Ok(Some(v)),
    }
}

fn non_negative_days(value: Option<i32>) -> Result<Option<i32>, ValidationError> {
    match value {
        Some(days) if days < 0 => Err(ValidationError::invalid(
            "max_lead_time_days",
            "must not be negative",
        )),
        other => Ok(other),
    }
}

fn parse_budget(
    min: Option<Decimal>,
    max: Option<Decimal>,
) -> Result<Option<PriceRange>, ValidationError> {
    let max = match (min, max) {
        (None, None) => return Ok(None),
        (Some(_), None) => {
            return Err(ValidationError::invalid(
                "budget_max",
                "required when budget_min is set",
            ))
        }
        (_, Some(max)) => max,
    };
    let min = min.unwrap_or(Decimal::ZERO);

    if min.is_sign_negative() || max.is_sign_negative() {
        return Err(ValidationError::invalid("budget", "must not be negative"));
    }
    if min > max {
        return Err(ValidationError::invalid(
            "budget",
            format!("minimum {} exceeds maximum {}", min, max),
        ));
    }
    Ok(Some(PriceRange { min, max }))
}

fn parse_currency(raw: Option<String>) -> Result<String, ValidationError> {
    let Some(code) = clean_text(raw) else {
        return Ok(DEFAULT_CURRENCY.to_string());
    };
    let code = code.to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::invalid(
            "currency",
            format!("{:?} is not a three-letter currency code", code),
        ));
    }
    Ok(code)
}

fn clean_text(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Flattens a JSON object into lowercase dotted keys with string values.
pub fn flatten_specs(value: Value) -> Result<BTreeMap<String, String>, ValidationError> {
    let Value::Object(map) = value else {
        return Err(ValidationError::invalid("specs", "must be an object"));
    };

    let mut out = BTreeMap::new();
    for (key, value) in map {
        flatten_into(&mut out, &normalize_key(&key), value);
    }
    Ok(out)
}

fn flatten_into(out: &mut BTreeMap<String, String>, key: &str, value: Value) {
    if key.is_empty() {
        return;
    }
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (child, value) in map {
                let child = normalize_key(&child);
                if child.is_empty() {
                    continue;
                }
                flatten_into(out, &format!("{}.{}", key, child), value);
            }
        }
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(",");
            if !joined.is_empty() {
                out.insert(key.to_string(), joined);
            }
        }
        scalar => {
            if let Some(text) = scalar_text(&scalar) {
                out.insert(key.to_string(), text);
            }
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}
