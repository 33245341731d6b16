//! Decision Threshold
//!
//! Maps the class-1 probability to a loan decision.

use serde::{Deserialize, Serialize};

use crate::constants::{APPROVED_LABEL, DEFAULT_DECISION_THRESHOLD, REJECTED_LABEL};

/// Loan decision reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanDecision {
    Approved,
    Rejected,
}

impl LoanDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanDecision::Approved => APPROVED_LABEL,
            LoanDecision::Rejected => REJECTED_LABEL,
        }
    }
}

impl std::fmt::Display for LoanDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability cut-off (inclusive) for approval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionThreshold {
    cutoff: f64,
}

impl DecisionThreshold {
    /// Cut-off clamped to [0, 1]; NaN falls back to the default
    pub fn new(cutoff: f64) -> Self {
        let cutoff = if cutoff.is_nan() {
            DEFAULT_DECISION_THRESHOLD
        } else {
            cutoff.clamp(0.0, 1.0)
        };
        Self { cutoff }
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn decide(&self, probability: f64) -> LoanDecision {
        if probability >= self.cutoff {
            LoanDecision::Approved
        } else {
            LoanDecision::Rejected
        }
    }
}

impl Default for DecisionThreshold {
    fn default() -> Self {
        Self::new(DEFAULT_DECISION_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold() {
        let threshold = DecisionThreshold::default();
        assert_eq!(threshold.cutoff(), 0.5);
        assert_eq!(threshold.decide(0.5), LoanDecision::Approved);
        assert_eq!(threshold.decide(0.49), LoanDecision::Rejected);
    }

    #[test]
    fn test_threshold_clamped() {
        assert_eq!(DecisionThreshold::new(1.7).cutoff(), 1.0);
        assert_eq!(DecisionThreshold::new(-0.2).cutoff(), 0.0);
        assert_eq!(DecisionThreshold::new(f64::NAN).cutoff(), 0.5);
    }

    #[test]
    fn test_decision_labels() {
        assert_eq!(LoanDecision::Approved.as_str(), "Approved");
        assert_eq!(LoanDecision::Rejected.to_string(), "Rejected");
        assert_eq!(serde_json::to_value(LoanDecision::Rejected).unwrap(), "Rejected");
    }
}
