//! WeightVector - Per-user importance of each scoring criterion

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Weight assigned to every criterion at registration
pub const REGISTRATION_WEIGHT: f64 = 1.0;

/// Relative importance of {distance, age, food, hobby, music} for one user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeightVector {
    pub distance: f64,
    pub age: f64,
    pub food: f64,
    pub hobby: f64,
    pub music: f64,
}

/// Weight shares summing to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedWeights {
    pub distance: f64,
    pub age: f64,
    pub food: f64,
    pub hobby: f64,
    pub music: f64,
}

impl WeightVector {
    /// Create a validated weight vector
    pub fn new(
        distance: f64,
        age: f64,
        food: f64,
        hobby: f64,
        music: f64,
    ) -> Result<Self, DomainError> {
        let weights = Self {
            distance,
            age,
            food,
            hobby,
            music,
        };
        weights.validate()?;
        Ok(weights)
    }

    /// All weights must be finite and non-negative
    pub fn validate(&self) -> Result<(), DomainError> {
        for (name, value) in self.named() {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::InvalidWeights(format!(
                    "{} weight must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn sum(&self) -> f64 {
        self.distance + self.age + self.food + self.hobby + self.music
    }

    /// Divide each weight by the total.
    ///
    /// A zero vector carries no preference at all, so every criterion gets
    /// an equal share of 0.2.
    pub fn normalized(&self) -> Result<NormalizedWeights, DomainError> {
        self.validate()?;
        let sum = self.sum();
        if sum <= 0.0 {
            return Ok(NormalizedWeights::uniform());
        }
        Ok(NormalizedWeights {
            distance: self.distance / sum,
            age: self.age / sum,
            food: self.food / sum,
            hobby: self.hobby / sum,
            music: self.music / sum,
        })
    }

    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("distance", self.distance),
            ("age", self.age),
            ("food", self.food),
            ("hobby", self.hobby),
            ("music", self.music),
        ]
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self {
            distance: REGISTRATION_WEIGHT,
            age: REGISTRATION_WEIGHT,
            food: REGISTRATION_WEIGHT,
            hobby: REGISTRATION_WEIGHT,
            music: REGISTRATION_WEIGHT,
        }
    }
}

impl NormalizedWeights {
    pub fn uniform() -> Self {
        Self {
            distance: 0.2,
            age: 0.2,
            food: 0.2,
            hobby: 0.2,
            music: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative_weight() {
        let result = WeightVector::new(1.0, -0.5, 1.0, 1.0, 1.0);
        assert!(matches!(result, Err(DomainError::InvalidWeights(_))));
    }

    #[test]
    fn test_rejects_nan_weight() {
        assert!(WeightVector::new(1.0, 1.0, f64::NAN, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_normalized_sums_to_one() {
        let weights = WeightVector::new(2.0, 1.0, 1.0, 0.0, 0.0).unwrap();
        let shares = weights.normalized().unwrap();
        assert!((shares.distance - 0.5).abs() < 1e-12);
        assert!((shares.age - 0.25).abs() < 1e-12);
        assert_eq!(shares.hobby, 0.0);
        let total = shares.distance + shares.age + shares.food + shares.hobby + shares.music;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_becomes_uniform() {
        let weights = WeightVector::new(0.0, 0.0, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(weights.normalized().unwrap(), NormalizedWeights::uniform());
    }

    #[test]
    fn test_default_matches_registration() {
        let weights = WeightVector::default();
        assert_eq!(weights.sum(), 5.0 * REGISTRATION_WEIGHT);
    }
}
