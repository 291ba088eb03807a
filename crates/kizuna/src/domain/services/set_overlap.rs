//! SetOverlap - Jaccard similarity of preference sets

use crate::domain::PreferenceSet;

/// |A ∩ B| / |A ∪ B|.
///
/// Two empty sets carry no signal and score 0, not 1.
pub fn jaccard(a: &PreferenceSet, b: &PreferenceSet) -> f64 {
    let union = a.union_len(b);
    if union == 0 {
        return 0.0;
    }
    a.intersection_len(b) as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(codes: &[&str]) -> PreferenceSet {
        codes.iter().copied().collect()
    }

    #[test]
    fn test_both_empty_is_zero() {
        assert_eq!(jaccard(&set(&[]), &set(&[])), 0.0);
    }

    #[test]
    fn test_one_empty_is_zero() {
        assert_eq!(jaccard(&set(&["A1"]), &set(&[])), 0.0);
    }

    #[test]
    fn test_identical_is_one() {
        assert_eq!(jaccard(&set(&["A1", "B2"]), &set(&["B2", "A1"])), 1.0);
    }

    #[test]
    fn test_partial_overlap() {
        let score = jaccard(&set(&["A1", "B1", "C1"]), &set(&["B1", "C1", "D1"]));
        assert!((score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_superset_never_decreases() {
        let viewer = set(&["A1", "B1", "C1", "D1"]);
        let small = set(&["A1", "E1"]);
        let larger = set(&["A1", "B1", "E1"]);
        assert!(jaccard(&viewer, &larger) >= jaccard(&viewer, &small));
    }
}
