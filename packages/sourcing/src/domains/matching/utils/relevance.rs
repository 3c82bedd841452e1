/// Pure utility functions for labelling a fit score
///
/// These functions contain NO side effects - they turn a normalized fit
/// (0.0 to 1.0) into the headline used at the start of a match rationale.

/// Relevance thresholds for normalized fit (0.0 to 1.0)
pub const FIT_THRESHOLD_LOW: f64 = 0.4;
pub const FIT_THRESHOLD_MEDIUM: f64 = 0.6;
pub const FIT_THRESHOLD_HIGH: f64 = 0.8;

/// Result of relevance check
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceResult {
    pub is_relevant: bool,
    pub label: &'static str,
    pub confidence: RelevanceConfidence,
}

/// Confidence level of the relevance decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelevanceConfidence {
    /// Below the low threshold
    Low,
    /// Between the low and high thresholds
    Medium,
    /// At or above the high threshold
    High,
}

/// Check relevance based on a normalized fit
///
/// Algorithm:
/// - fit < 0.4 -> "Weak match", not relevant (low confidence)
/// - fit >= 0.8 -> "Strong match" (high confidence)
/// - 0.4 <= fit < 0.8 -> "Good match" from 0.6, "Partial match" below
///   (medium confidence)
///
/// # Examples
/// ```
/// use sourcing_core::domains::matching::utils::{check_relevance_by_fit, RelevanceConfidence};
///
/// let result = check_relevance_by_fit(0.85);
/// assert!(result.is_relevant);
/// assert_eq!(result.confidence, RelevanceConfidence::High);
///
/// let result = check_relevance_by_fit(0.3);
/// assert!(!result.is_relevant);
/// assert_eq!(result.confidence, RelevanceConfidence::Low);
/// ```
pub fn check_relevance_by_fit(fit: f64) -> RelevanceResult {
    if fit < FIT_THRESHOLD_LOW {
        return RelevanceResult {
            is_relevant: false,
            label: "Weak match",
            confidence: RelevanceConfidence::Low,
        };
    }

    if fit >= FIT_THRESHOLD_HIGH {
        return RelevanceResult {
            is_relevant: true,
            label: "Strong match",
            confidence: RelevanceConfidence::High,
        };
    }

    let label = if fit >= FIT_THRESHOLD_MEDIUM {
        "Good match"
    } else {
        "Partial match"
    };

    RelevanceResult {
        is_relevant: true,
        label,
        confidence: RelevanceConfidence::Medium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_very_low_fit_is_weak() {
        let result = check_relevance_by_fit(0.1);
        assert!(!result.is_relevant);
        assert_eq!(result.confidence, RelevanceConfidence::Low);
        assert_eq!(result.label, "Weak match");
    }

    #[test]
    fn test_at_low_threshold_is_partial() {
        let result = check_relevance_by_fit(0.4);
        assert!(result.is_relevant);
        assert_eq!(result.confidence, RelevanceConfidence::Medium);
        assert_eq!(result.label, "Partial match");
    }

    #[test]
    fn test_neutral_fit_is_partial() {
        assert_eq!(check_relevance_by_fit(0.5).label, "Partial match");
    }

    #[test]
    fn test_medium_threshold_is_good() {
        let result = check_relevance_by_fit(0.6);
        assert_eq!(result.label, "Good match");
        assert_eq!(result.confidence, RelevanceConfidence::Medium);
    }

    #[test]
    fn test_high_threshold_is_strong() {
        let result = check_relevance_by_fit(0.8);
        assert_eq!(result.label, "Strong match");
        assert_eq!(result.confidence, RelevanceConfidence::High);
    }

    #[test]
    fn test_perfect_fit() {
        let result = check_relevance_by_fit(1.0);
        assert!(result.is_relevant);
        assert_eq!(result.label, "Strong match");
    }

    #[test]
    fn test_boundary_values() {
        assert_eq!(check_relevance_by_fit(0.399).label, "Weak match");
        assert_eq!(check_relevance_by_fit(0.599).label, "Partial match");
        assert_eq!(check_relevance_by_fit(0.799).label, "Good match");
    }
}
