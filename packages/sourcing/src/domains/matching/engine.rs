//! Matching engine
//!
//! Scores every eligible candidate product against one requirement and
//! returns the results ranked best first. Pure function of its inputs: no
//! I/O, no clock, no randomness, so identical inputs always produce
//! identical output.
//!
//! Pipeline per call:
//! 1. Structural validation of the candidate set (identity only)
//! 2. Hard filter on category (skipped when the buyer accepts any)
//! 3. Per-attribute closeness for every attribute the buyer specified
//! 4. Weighted aggregate into a 0-100 fit score
//! 5. Rationale + assumptions + terms
//! 6. Sort by fit descending, product id ascending

use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::common::utils::scoring::{
    capacity_fit, environment_fit, minimum_fit, price_fit, round_to, tolerance_fit,
    weighted_mean, NEUTRAL_SCORE,
};
use crate::common::ValidationError;
use crate::domains::intake::models::RequirementCriteria;
use crate::domains::matching::models::{
    Assessment, AttributeScore, CommercialTerms, DeliveryTerms, MatchAttribute, MatchResult,
    ServiceTerms,
};
use crate::domains::matching::utils::check_relevance_by_fit;
use crate::domains::products::models::Product;

/// Fit given to every eligible candidate when the buyer set no constraints.
pub const NO_CONSTRAINT_SCORE: f64 = 50.0;

/// Attribute closeness at or above this counts as "matched" in the rationale.
const MATCHED_THRESHOLD: f64 = 0.9;

/// Closeness when the buyer's preferred controller is not offered.
const CONTROLLER_MISMATCH_SCORE: f64 = 0.2;

/// Score and rank `candidates` against `criteria`.
///
/// Only fails on structurally invalid input: a nil or duplicated candidate
/// id. Missing optional attributes on either side degrade to assumptions.
pub fn match_candidates(
    criteria: &RequirementCriteria,
    candidates: &[Product],
) -> Result<Vec<MatchResult>, ValidationError> {
    validate_candidates(candidates)?;

    let mut results: Vec<MatchResult> = candidates
        .iter()
        .filter(|candidate| match criteria.category {
            Some(category) => candidate.category == category,
            None => true,
        })
        .map(|candidate| score_candidate(criteria, candidate))
        .collect();

    results.sort_by(|a, b| {
        b.fit_score
            .total_cmp(&a.fit_score)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });

    debug!(
        candidates = candidates.len(),
        eligible = results.len(),
        "Scored candidates"
    );

    Ok(results)
}

fn validate_candidates(candidates: &[Product]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate.id.is_nil() {
            return Err(ValidationError::MalformedIdentity {
                field: "candidate.id",
                value: candidate.id.to_string(),
            });
        }
        if !seen.insert(candidate.id) {
            return Err(ValidationError::DuplicateCandidate(candidate.id));
        }
    }
    Ok(())
}

/// Accumulates attribute scores and assumptions for one candidate.
#[derive(Default)]
struct Scorecard {
    parts: Vec<AttributeScore>,
    assumptions: Vec<String>,
}

impl Scorecard {
    fn record(&mut self, attribute: MatchAttribute, score: f64, detail: String) {
        let assessment = if score >= MATCHED_THRESHOLD {
            Assessment::Matched
        } else {
            Assessment::Approximated
        };
        self.parts.push(AttributeScore {
            attribute,
            score: round_to(score, 3),
            assessment,
            detail,
        });
    }

    /// The buyer asked for this attribute but it cannot be compared.
    fn unknown(&mut self, attribute: MatchAttribute, detail: &str, assumption: Option<String>) {
        self.parts.push(AttributeScore {
            attribute,
            score: NEUTRAL_SCORE,
            assessment: Assessment::Missing,
            detail: detail.to_string(),
        });
        if let Some(assumption) = assumption {
            self.assumptions.push(assumption);
        }
    }

    fn not_listed(&mut self, attribute: MatchAttribute) {
        self.unknown(
            attribute,
            "not listed by supplier",
            Some(format!(
                "Supplier did not list {}; assumed a partial fit",
                attribute.label()
            )),
        );
    }

    /// The supplier listed a value no real robot can have.
    fn implausible(&mut self, attribute: MatchAttribute, listed: impl std::fmt::Display) {
        self.unknown(
            attribute,
            "implausible value listed by supplier",
            Some(format!(
                "Supplier listed {} as {}; treated as not listed",
                attribute.label(),
                listed
            )),
        );
    }

    fn fit_score(&self) -> f64 {
        let pairs: Vec<(f64, f64)> = self
            .parts
            .iter()
            .map(|part| (part.attribute.weight(), part.score))
            .collect();
        match weighted_mean(&pairs) {
            Some(mean) => round_to(mean * 100.0, 1),
            None => NO_CONSTRAINT_SCORE,
        }
    }
}

/// Physical quantities must be finite and strictly positive to be compared.
fn plausible(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn score_candidate(criteria: &RequirementCriteria, candidate: &Product) -> MatchResult {
    let mut card = Scorecard::default();

    if let Some(required) = criteria.payload_kg {
        match candidate.payload_kg {
            Some(offered) if plausible(offered) => card.record(
                MatchAttribute::Payload,
                capacity_fit(required, offered),
                format!("{} kg offered, {} kg required", offered, required),
            ),
            Some(offered) => card.implausible(MatchAttribute::Payload, offered),
            None => card.not_listed(MatchAttribute::Payload),
        }
    }

    if let Some(required) = criteria.reach_mm {
        match candidate.reach_mm {
            Some(offered) if plausible(offered) => card.record(
                MatchAttribute::Reach,
                capacity_fit(required, offered),
                format!("{} mm offered, {} mm required", offered, required),
            ),
            Some(offered) => card.implausible(MatchAttribute::Reach, offered),
            None => card.not_listed(MatchAttribute::Reach),
        }
    }

    if let Some(allowed) = criteria.repeatability_mm {
        match candidate.repeatability_mm {
            Some(offered) if plausible(offered) => card.record(
                MatchAttribute::Repeatability,
                tolerance_fit(allowed, offered),
                format!("±{} mm offered, ±{} mm allowed", offered, allowed),
            ),
            Some(offered) => card.implausible(MatchAttribute::Repeatability, offered),
            None => card.not_listed(MatchAttribute::Repeatability),
        }
    }

    if let Some(required) = criteria.speed_mps {
        match candidate.speed_mps {
            Some(offered) if plausible(offered) => card.record(
                MatchAttribute::Speed,
                minimum_fit(required, offered),
                format!("{} m/s offered, {} m/s required", offered, required),
            ),
            Some(offered) => card.implausible(MatchAttribute::Speed, offered),
            None => card.not_listed(MatchAttribute::Speed),
        }
    }

    if let Some(required) = &criteria.ip_rating {
        match &candidate.ip_rating {
            Some(offered) => card.record(
                MatchAttribute::Environment,
                environment_fit(required, offered),
                format!("{} offered, {} required", offered, required),
            ),
            None => card.not_listed(MatchAttribute::Environment),
        }
    }

    if let Some(preferred) = &criteria.controller {
        match &candidate.controller {
            Some(offered) => {
                let score = if offered.trim().eq_ignore_ascii_case(preferred.trim()) {
                    1.0
                } else {
                    CONTROLLER_MISMATCH_SCORE
                };
                card.record(
                    MatchAttribute::Controller,
                    score,
                    format!("{} offered, {} preferred", offered, preferred),
                );
            }
            None => card.not_listed(MatchAttribute::Controller),
        }
    }

    let same_currency = candidate.currency.eq_ignore_ascii_case(&criteria.currency);
    if let Some(budget) = &criteria.budget {
        match &candidate.price {
            None => card.not_listed(MatchAttribute::Price),
            Some(price) if price.min.is_sign_negative() => {
                card.implausible(MatchAttribute::Price, price.min)
            }
            Some(_) if !same_currency => card.unknown(
                MatchAttribute::Price,
                "listed in a different currency",
                Some(format!(
                    "Price listed in {} but budget is in {}; not compared",
                    candidate.currency, criteria.currency
                )),
            ),
            Some(price) => card.record(
                MatchAttribute::Price,
                price_fit(budget.max_f64(), price.min_f64(), price.max_f64()),
                format!(
                    "{}-{} {} against a budget of {} {}",
                    price.min, price.max, candidate.currency, budget.max, criteria.currency
                ),
            ),
        }
    }

    if let Some(allowed) = criteria.max_lead_time_days {
        match candidate.lead_time_days {
            Some(offered) if offered >= 0 => card.record(
                MatchAttribute::LeadTime,
                tolerance_fit(f64::from(allowed), f64::from(offered)),
                format!("{} days offered, {} days acceptable", offered, allowed),
            ),
            Some(offered) => card.implausible(MatchAttribute::LeadTime, offered),
            None => card.not_listed(MatchAttribute::LeadTime),
        }
    }

    if !criteria.specs.is_empty() {
        score_specs(&mut card, &criteria.specs, &candidate.specs);
    }

    let constrained = criteria.has_constraints();
    if !constrained {
        card.assumptions
            .push("No technical constraints were specified; ranked on category only".to_string());
    }

    let fit_score = card.fit_score();
    let rationale = build_rationale(fit_score, &card, constrained);

    let within_budget = match (&criteria.budget, &candidate.price) {
        (Some(budget), Some(price)) if same_currency && !price.min.is_sign_negative() => {
            Some(price.max <= budget.max)
        }
        _ => None,
    };
    let meets_deadline = match (criteria.max_lead_time_days, candidate.lead_time_days) {
        (Some(allowed), Some(offered)) if offered >= 0 => Some(offered <= allowed),
        _ => None,
    };

    MatchResult {
        product_id: candidate.id,
        supplier_id: candidate.supplier_id,
        category: candidate.category,
        fit_score,
        rationale,
        assumptions: card.assumptions,
        attributes: card.parts,
        commercial: CommercialTerms {
            price: candidate.price,
            currency: candidate.currency.clone(),
            within_budget,
        },
        delivery: DeliveryTerms {
            lead_time_days: candidate.lead_time_days,
            meets_deadline,
            includes_installation: candidate.includes_installation,
        },
        service: ServiceTerms {
            warranty_months: candidate.warranty_months,
            support_tier: candidate.support_tier.clone(),
        },
    }
}

/// Share of requested spec keys the candidate satisfies. Keys the supplier
/// never listed count as neutral and are recorded as assumptions.
fn score_specs(
    card: &mut Scorecard,
    wanted: &BTreeMap<String, String>,
    offered: &BTreeMap<String, String>,
) {
    let offered: BTreeMap<String, &str> = offered
        .iter()
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim()))
        .collect();

    let mut listed = 0usize;
    let mut satisfied = 0usize;
    let mut total = 0.0;

    for (key, value) in wanted {
        match offered.get(key) {
            Some(offered_value) => {
                listed += 1;
                if offered_value.eq_ignore_ascii_case(value.trim()) {
                    satisfied += 1;
                    total += 1.0;
                }
            }
            None => {
                total += NEUTRAL_SCORE;
                card.assumptions
                    .push(format!("Supplier did not list spec '{}'", key));
            }
        }
    }

    if listed == 0 {
        card.unknown(MatchAttribute::Specs, "none of the requested specs listed", None);
        return;
    }

    card.record(
        MatchAttribute::Specs,
        total / wanted.len() as f64,
        format!("{}/{} requested specs satisfied", satisfied, wanted.len()),
    );
}

fn build_rationale(fit_score: f64, card: &Scorecard, constrained: bool) -> String {
    let relevance = check_relevance_by_fit(fit_score / 100.0);
    let mut text = format!("{} ({:.1}/100).", relevance.label, fit_score);

    if !constrained {
        text.push_str(" Category match only; no technical constraints were specified.");
        return text;
    }

    for (assessment, heading) in [
        (Assessment::Matched, "Matched"),
        (Assessment::Approximated, "Approximated"),
        (Assessment::Missing, "Missing"),
    ] {
        let items: Vec<String> = card
            .parts
            .iter()
            .filter(|part| part.assessment == assessment)
            .map(|part| format!("{} ({})", part.attribute.label(), part.detail))
            .collect();
        if !items.is_empty() {
            text.push_str(&format!(" {}: {}.", heading, items.join("; ")));
        }
    }

    text
}
