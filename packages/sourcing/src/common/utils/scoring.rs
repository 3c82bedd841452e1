//! Pure scoring primitives shared by the matching and recommendation engines.
//!
//! Every closeness function returns a value in `[0.0, 1.0]`. None of these
//! functions touch I/O, clocks or randomness.

use std::collections::BTreeSet;

/// Score given to an attribute that one side did not state.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Headroom above a required capacity that still counts as a perfect fit.
const CAPACITY_HEADROOM: f64 = 0.25;

/// Lowest score an oversized (but sufficient) offer can fall to.
const OVERSIZE_FLOOR: f64 = 0.3;

/// Closeness for "at least this much, but not wildly more" attributes
/// such as payload or reach.
///
/// - offered within `[required, required * 1.25]` -> 1.0
/// - oversized offers decay slowly towards 0.3
/// - undersized offers are penalised quadratically
pub fn capacity_fit(required: f64, offered: f64) -> f64 {
    if required <= 0.0 {
        return 1.0;
    }
    if offered <= 0.0 {
        return 0.0;
    }
    let ratio = offered / required;
    if ratio < 1.0 {
        return clamp_unit(ratio * ratio * 0.5);
    }
    let overshoot = ratio - 1.0;
    if overshoot <= CAPACITY_HEADROOM {
        1.0
    } else {
        (1.0 - (overshoot - CAPACITY_HEADROOM) * 0.25).max(OVERSIZE_FLOOR)
    }
}

/// Closeness for "at least this much, more is fine" attributes (speed).
pub fn minimum_fit(required: f64, offered: f64) -> f64 {
    if required <= 0.0 || offered >= required {
        return 1.0;
    }
    clamp_unit(offered / required)
}

/// Closeness for "at most this much" attributes (repeatability tolerance,
/// lead time).
///
/// A negative offer is not a measurement and scores 0.0.
pub fn tolerance_fit(allowed: f64, offered: f64) -> f64 {
    if offered < 0.0 {
        return 0.0;
    }
    if offered <= allowed {
        return 1.0;
    }
    clamp_unit(allowed / offered)
}

/// Parses an ingress-protection rating such as `IP67` or `IP5X`.
///
/// An `X` digit (not tested) is read as 0.
pub fn parse_ip_rating(rating: &str) -> Option<(u8, u8)> {
    let rating = rating.trim().to_ascii_uppercase();
    let digits = rating.strip_prefix("IP")?;
    let mut chars = digits.chars();
    let dust = ip_digit(chars.next()?)?;
    let water = ip_digit(chars.next()?)?;
    if chars.next().is_some() {
        return None;
    }
    Some((dust, water))
}

fn ip_digit(c: char) -> Option<u8> {
    match c {
        'X' => Some(0),
        d => d.to_digit(10).map(|d| d as u8),
    }
}

/// Closeness between two environmental ratings.
///
/// IP ratings are compared digit by digit, each digit worth half the score.
/// Anything else (cleanroom classes, vendor labels) must match exactly,
/// ignoring case.
pub fn environment_fit(required: &str, offered: &str) -> f64 {
    match (parse_ip_rating(required), parse_ip_rating(offered)) {
        (Some((req_dust, req_water)), Some((off_dust, off_water))) => {
            0.5 * digit_fit(req_dust, off_dust) + 0.5 * digit_fit(req_water, off_water)
        }
        _ => {
            if required.trim().eq_ignore_ascii_case(offered.trim()) {
                1.0
            } else {
                0.0
            }
        }
    }
}

fn digit_fit(required: u8, offered: u8) -> f64 {
    if offered >= required || required == 0 {
        1.0
    } else {
        f64::from(offered) / f64::from(required)
    }
}

/// Closeness of a supplier price band against a buyer's budget ceiling.
///
/// - whole band at or under budget -> 1.0
/// - band straddles the budget -> 0.7
/// - band entirely above budget -> `0.6 * budget / price_min`
pub fn price_fit(budget_max: f64, price_min: f64, price_max: f64) -> f64 {
    if price_max <= budget_max {
        1.0
    } else if price_min <= budget_max {
        0.7
    } else if price_min <= 0.0 {
        0.0
    } else {
        clamp_unit(0.6 * budget_max / price_min)
    }
}

/// Weighted mean of `(weight, score)` pairs. `None` when no weight is given.
pub fn weighted_mean(parts: &[(f64, f64)]) -> Option<f64> {
    let total_weight: f64 = parts.iter().map(|(w, _)| w).sum();
    if total_weight <= 0.0 {
        return None;
    }
    let weighted: f64 = parts.iter().map(|(w, s)| w * s).sum();
    Some(weighted / total_weight)
}

/// Exponential decay with the given half-life. Negative ages count as fresh.
pub fn recency_decay(age_days: f64, half_life_days: f64) -> f64 {
    if age_days <= 0.0 || half_life_days <= 0.0 {
        return 1.0;
    }
    0.5_f64.powf(age_days / half_life_days)
}

/// Jaccard similarity of two sets. Two empty sets are not similar.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Rounds to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
