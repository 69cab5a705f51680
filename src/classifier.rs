//! Outcome classification against ground-truth labels.

use crate::types::outcome::OutcomeKind;

/// Classify a scored transaction.
///
/// A transaction is flagged when `probability > threshold`; a probability equal to the
/// threshold is not flagged, and neither is NaN. The threshold is not validated here.
/// Returns the outcome kind and whether it is worth displaying.
pub fn classify(probability: f64, threshold: f64, is_actual_fraud: bool) -> (OutcomeKind, bool) {
    let flagged = probability > threshold;

    let kind = match (is_actual_fraud, flagged) {
        (true, true) => OutcomeKind::TruePositive,
        (true, false) => OutcomeKind::FalseNegative,
        (false, true) => OutcomeKind::FalsePositive,
        (false, false) => OutcomeKind::TrueNegative,
    };

    (kind, kind.is_interesting())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decision_table() {
        assert_eq!(classify(0.9, 0.5, true), (OutcomeKind::TruePositive, true));
        assert_eq!(classify(0.1, 0.5, true), (OutcomeKind::FalseNegative, true));
        assert_eq!(classify(0.9, 0.5, false), (OutcomeKind::FalsePositive, true));
        assert_eq!(classify(0.1, 0.5, false), (OutcomeKind::TrueNegative, false));
    }

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(classify(0.063, 0.063, true).0, OutcomeKind::FalseNegative);
        assert_eq!(classify(0.063, 0.063, false).0, OutcomeKind::TrueNegative);
    }

    #[test]
    fn test_nan_probability_is_not_flagged() {
        assert_eq!(classify(f64::NAN, 0.5, true).0, OutcomeKind::FalseNegative);
    }

    proptest! {
        #[test]
        fn classification_is_total_and_consistent(
            p in any::<f64>(),
            t in any::<f64>(),
            fraud in any::<bool>(),
        ) {
            let (kind, interesting) = classify(p, t, fraud);
            prop_assert_eq!(kind.is_flagged(), p > t);
            prop_assert_eq!(interesting, kind != OutcomeKind::TrueNegative);
            prop_assert_eq!(
                matches!(kind, OutcomeKind::TruePositive | OutcomeKind::FalseNegative),
                fraud
            );
            prop_assert_eq!(classify(p, t, fraud), (kind, interesting));
        }

        #[test]
        fn probability_at_threshold_is_never_flagged(t in 0.0f64..1.0, fraud in any::<bool>()) {
            let (kind, _) = classify(t, t, fraud);
            prop_assert!(!kind.is_flagged());
        }
    }
}
