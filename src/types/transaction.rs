//! Transaction records fed to the batch runner

use serde::{Deserialize, Serialize};

/// One row of model input features. Missing values are carried as NaN.
pub type FeatureVector = Vec<f32>;

/// An immutable input row: model features, the raw amount and an optional ground-truth label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Feature values in schema order
    pub features: FeatureVector,

    /// Raw transaction amount (non-negative)
    pub amount: f64,

    /// Ground-truth fraud label, when the dataset carries one
    #[serde(default)]
    pub is_fraud: Option<bool>,
}

impl TransactionRecord {
    /// Create a record without a ground-truth label
    pub fn new(features: FeatureVector, amount: f64) -> Self {
        Self {
            features,
            amount,
            is_fraud: None,
        }
    }

    /// Attach a ground-truth label
    pub fn with_label(mut self, is_fraud: bool) -> Self {
        self.is_fraud = Some(is_fraud);
        self
    }

    /// Label used for classification; unlabelled rows count as legitimate.
    pub fn is_actual_fraud(&self) -> bool {
        self.is_fraud.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlabelled_record_is_not_fraud() {
        let record = TransactionRecord::new(vec![1.0, 2.0], 42.0);
        assert!(!record.is_actual_fraud());
        assert!(record.with_label(true).is_actual_fraud());
    }

    #[test]
    fn test_missing_label_deserializes_as_none() {
        let record: TransactionRecord =
            serde_json::from_str(r#"{"features":[0.5],"amount":10.0}"#).unwrap();
        assert_eq!(record.is_fraud, None);
        assert_eq!(record.features, vec![0.5]);
    }
}
