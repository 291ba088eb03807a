//! UserPair - Canonical unordered pair of two distinct users

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Unordered pair stored with the smaller id first, so {A,B} and {B,A}
/// have one representation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserPair {
    low: Uuid,
    high: Uuid,
}

impl UserPair {
    pub fn new(a: Uuid, b: Uuid) -> Result<Self, DomainError> {
        if a == b {
            return Err(DomainError::invalid_input(format!(
                "user {} cannot be paired with itself",
                a
            )));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    pub fn low(&self) -> Uuid {
        self.low
    }

    pub fn high(&self) -> Uuid {
        self.high
    }

    pub fn contains(&self, user: Uuid) -> bool {
        self.low == user || self.high == user
    }

    /// The member that is not `user`
    pub fn other(&self, user: Uuid) -> Option<Uuid> {
        if user == self.low {
            Some(self.high)
        } else if user == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

impl std::fmt::Display for UserPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}, {}}}", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(UserPair::new(a, b).unwrap(), UserPair::new(b, a).unwrap());

        let pair = UserPair::new(a, b).unwrap();
        assert!(pair.low() < pair.high());
        assert_eq!(pair.other(a), Some(b));
        assert_eq!(pair.other(Uuid::new_v4()), None);
    }

    #[test]
    fn test_rejects_self_pair() {
        let a = Uuid::new_v4();
        assert!(matches!(
            UserPair::new(a, a),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
