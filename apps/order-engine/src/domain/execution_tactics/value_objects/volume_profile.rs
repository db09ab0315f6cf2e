//! Intraday volume profile for VWAP allocation.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::execution_tactics::errors::TacticError;

/// Allowed deviation of the weight sum from 1.0.
const WEIGHT_TOLERANCE: Decimal = dec!(0.000001);

/// One named time bucket and its share of daily volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeBucket {
    /// Bucket label, e.g. `09:00-10:00`.
    pub label: String,
    /// Share of volume (0..=1).
    pub weight: Decimal,
}

impl VolumeBucket {
    /// Create a bucket.
    #[must_use]
    pub fn new(label: impl Into<String>, weight: Decimal) -> Self {
        Self {
            label: label.into(),
            weight,
        }
    }
}

/// Ordered sequence of volume buckets whose weights sum to 1.0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolumeProfile {
    buckets: Vec<VolumeBucket>,
}

impl Default for VolumeProfile {
    /// Hourly buckets 09:00-18:00, heavier at open and close.
    fn default() -> Self {
        let weights = [
            ("09:00-10:00", dec!(0.15)),
            ("10:00-11:00", dec!(0.12)),
            ("11:00-12:00", dec!(0.08)),
            ("12:00-13:00", dec!(0.06)),
            ("13:00-14:00", dec!(0.08)),
            ("14:00-15:00", dec!(0.10)),
            ("15:00-16:00", dec!(0.12)),
            ("16:00-17:00", dec!(0.15)),
            ("17:00-18:00", dec!(0.14)),
        ];
        Self {
            buckets: weights
                .into_iter()
                .map(|(label, weight)| VolumeBucket::new(label, weight))
                .collect(),
        }
    }
}

impl VolumeProfile {
    /// Build and validate a profile.
    ///
    /// # Errors
    ///
    /// Returns error if the profile is empty, a weight is negative, or the
    /// weights do not sum to 1.0.
    pub fn new(buckets: Vec<VolumeBucket>) -> Result<Self, TacticError> {
        let profile = Self { buckets };
        profile.validate()?;
        Ok(profile)
    }

    /// Validate the profile.
    ///
    /// # Errors
    ///
    /// See [`VolumeProfile::new`].
    pub fn validate(&self) -> Result<(), TacticError> {
        if self.buckets.is_empty() {
            return Err(TacticError::InvalidConfiguration {
                message: "volume profile must have at least one bucket".to_string(),
            });
        }
        if let Some(bucket) = self.buckets.iter().find(|b| b.weight < Decimal::ZERO) {
            return Err(TacticError::InvalidConfiguration {
                message: format!("bucket {} has negative weight {}", bucket.label, bucket.weight),
            });
        }
        let sum = self.total_weight();
        if (sum - Decimal::ONE).abs() > WEIGHT_TOLERANCE {
            return Err(TacticError::InvalidConfiguration {
                message: format!("volume profile weights sum to {sum}, expected 1.0"),
            });
        }
        Ok(())
    }

    /// Buckets in execution order.
    #[must_use]
    pub fn buckets(&self) -> &[VolumeBucket] {
        &self.buckets
    }

    /// Number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if there are no buckets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sum of weights.
    #[must_use]
    pub fn total_weight(&self) -> Decimal {
        self.buckets.iter().map(|b| b.weight).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_valid() {
        let profile = VolumeProfile::default();
        assert_eq!(profile.len(), 9);
        assert_eq!(profile.total_weight(), Decimal::ONE);
        assert!(profile.validate().is_ok());
        assert_eq!(profile.buckets()[0].label, "09:00-10:00");
    }

    #[test]
    fn weights_must_sum_to_one() {
        let err = VolumeProfile::new(vec![
            VolumeBucket::new("a", dec!(0.5)),
            VolumeBucket::new("b", dec!(0.4)),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("sum to 0.9"));
    }

    #[test]
    fn empty_and_negative_rejected() {
        assert!(VolumeProfile::new(Vec::new()).is_err());
        assert!(
            VolumeProfile::new(vec![
                VolumeBucket::new("a", dec!(1.5)),
                VolumeBucket::new("b", dec!(-0.5)),
            ])
            .is_err()
        );
    }

    #[test]
    fn profile_deserializes_from_list() {
        let json = r#"[{"label":"am","weight":"0.6"},{"label":"pm","weight":"0.4"}]"#;
        let profile: VolumeProfile = serde_json::from_str(json).unwrap();
        assert!(profile.validate().is_ok());
        assert_eq!(profile.len(), 2);
    }
}
