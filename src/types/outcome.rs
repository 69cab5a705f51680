//! Outcome data structures produced by the classifier

use serde::{Deserialize, Serialize};
use std::fmt;

/// Four-way outcome of a scored transaction against its ground-truth label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Fraud, flagged
    TruePositive,
    /// Fraud, not flagged
    FalseNegative,
    /// Legitimate, flagged
    FalsePositive,
    /// Legitimate, not flagged
    TrueNegative,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 4] = [
        OutcomeKind::TruePositive,
        OutcomeKind::FalseNegative,
        OutcomeKind::FalsePositive,
        OutcomeKind::TrueNegative,
    ];

    /// Everything except a true negative is worth showing
    pub fn is_interesting(self) -> bool {
        !matches!(self, OutcomeKind::TrueNegative)
    }

    /// Whether the scorer flagged the transaction
    pub fn is_flagged(self) -> bool {
        matches!(self, OutcomeKind::TruePositive | OutcomeKind::FalsePositive)
    }

    /// Human-readable message shown next to the outcome
    pub fn message(self) -> &'static str {
        match self {
            OutcomeKind::TruePositive => "Correct fraud detection!",
            OutcomeKind::FalseNegative => "Missed actual fraud!",
            OutcomeKind::FalsePositive => "False alarm!",
            OutcomeKind::TrueNegative => "",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutcomeKind::TruePositive => "true_positive",
            OutcomeKind::FalseNegative => "false_negative",
            OutcomeKind::FalsePositive => "false_positive",
            OutcomeKind::TrueNegative => "true_negative",
        };
        f.write_str(name)
    }
}

/// Which outcomes are kept for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayPolicy {
    /// Every transaction, legitimate ones included
    #[default]
    ShowAll,
    /// Only detections, misses and false alarms
    InterestingOnly,
}

impl DisplayPolicy {
    /// Whether an outcome of this kind is displayed under the policy
    pub fn admits(self, kind: OutcomeKind) -> bool {
        match self {
            DisplayPolicy::ShowAll => true,
            DisplayPolicy::InterestingOnly => kind.is_interesting(),
        }
    }
}

/// A classified transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Outcome kind
    pub kind: OutcomeKind,

    /// 1-based position of the row in the input
    pub index: u64,

    /// Raw transaction amount
    pub amount: f64,

    /// Fraud probability returned by the scorer
    pub probability: f64,

    /// Message describing the outcome
    pub message: String,
}

impl Outcome {
    /// Create an outcome with the default message for its kind
    pub fn new(kind: OutcomeKind, index: u64, amount: f64, probability: f64) -> Self {
        Self {
            kind,
            index,
            amount,
            probability,
            message: kind.message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_true_negative_is_uninteresting() {
        let interesting: Vec<_> = OutcomeKind::ALL
            .iter()
            .filter(|k| k.is_interesting())
            .collect();
        assert_eq!(interesting.len(), 3);
        assert!(!OutcomeKind::TrueNegative.is_interesting());
    }

    #[test]
    fn test_display_policy_admits() {
        assert!(DisplayPolicy::ShowAll.admits(OutcomeKind::TrueNegative));
        assert!(!DisplayPolicy::InterestingOnly.admits(OutcomeKind::TrueNegative));
        assert!(DisplayPolicy::InterestingOnly.admits(OutcomeKind::FalsePositive));
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = Outcome::new(OutcomeKind::FalseNegative, 7, 120.5, 0.02);

        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"kind\":\"false_negative\""));

        let deserialized: Outcome = serde_json::from_str(&json).unwrap();
        assert_eq!(outcome, deserialized);
        assert_eq!(deserialized.message, "Missed actual fraud!");
    }
}
