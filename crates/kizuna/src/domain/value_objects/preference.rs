//! Preferences - Categorical preference codes (food, hobby, music)
//!
//! Codes are short identifiers such as `A1` or `C2`. Profiles store each
//! category as a comma-separated code list; the catalog maps every known code
//! to a human-readable description.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Preference category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceCategory {
    Food,
    Hobby,
    Music,
}

impl PreferenceCategory {
    pub const ALL: [PreferenceCategory; 3] = [Self::Food, Self::Hobby, Self::Music];

    /// Built-in code catalog for this category
    pub fn catalog(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Food => FOOD_CATALOG,
            Self::Hobby => HOBBY_CATALOG,
            Self::Music => MUSIC_CATALOG,
        }
    }

    /// Description for a code, if the code belongs to this category
    pub fn describe(&self, code: &str) -> Option<&'static str> {
        self.catalog()
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, description)| *description)
    }

    pub fn is_known_code(&self, code: &str) -> bool {
        self.describe(code).is_some()
    }
}

impl std::fmt::Display for PreferenceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreferenceCategory::Food => write!(f, "food"),
            PreferenceCategory::Hobby => write!(f, "hobby"),
            PreferenceCategory::Music => write!(f, "music"),
        }
    }
}

impl std::str::FromStr for PreferenceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "food" => Ok(PreferenceCategory::Food),
            "hobby" | "hobbies" => Ok(PreferenceCategory::Hobby),
            "music" => Ok(PreferenceCategory::Music),
            _ => Err(format!("Unknown preference category: {}", s)),
        }
    }
}

const FOOD_CATALOG: &[(&str, &str)] = &[
    ("A1", "Carnivore Diet"),
    ("A2", "Vegetarian"),
    ("A3", "Vegan"),
    ("B1", "Keto Diet"),
    ("B2", "Paleo Diet"),
    ("C1", "Mediterranean Diet"),
    ("C2", "Low Carb"),
    ("D1", "High Protein"),
    ("E1", "Balanced Diet"),
    ("F1", "Gluten-Free"),
    ("G1", "Lactose-Free"),
];

const HOBBY_CATALOG: &[(&str, &str)] = &[
    ("A1", "Reading"),
    ("A2", "Writing"),
    ("B1", "Painting"),
    ("B2", "Photography"),
    ("C1", "Gaming"),
    ("C2", "Gardening"),
    ("D1", "Cooking"),
    ("D2", "Baking"),
    ("E1", "Traveling"),
    ("F1", "Fishing"),
    ("G1", "Hiking"),
];

const MUSIC_CATALOG: &[(&str, &str)] = &[
    ("A1", "Rock"),
    ("A2", "Pop"),
    ("B1", "Classical"),
    ("B2", "Jazz"),
    ("C1", "Hip-Hop"),
    ("C2", "Country"),
    ("D1", "Electronic"),
    ("D2", "Reggae"),
    ("E1", "Blues"),
    ("F1", "Folk"),
    ("G1", "Metal"),
];

/// Unordered set of preference codes within one category
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PreferenceSet(BTreeSet<String>);

impl PreferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored comma-separated code list.
    ///
    /// Whitespace around codes is ignored, empty items are dropped and
    /// repeated codes collapse into one.
    pub fn from_csv(raw: &str) -> Self {
        raw.split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn intersection_len(&self, other: &PreferenceSet) -> usize {
        self.0.intersection(&other.0).count()
    }

    pub fn union_len(&self, other: &PreferenceSet) -> usize {
        self.len() + other.len() - self.intersection_len(other)
    }

    /// Codes that are not part of the category catalog
    pub fn unknown_codes(&self, category: PreferenceCategory) -> Vec<&str> {
        self.iter()
            .filter(|code| !category.is_known_code(code))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for PreferenceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_csv_trims_and_dedups() {
        let set = PreferenceSet::from_csv(" A1,B2,,A1 , C1");
        assert_eq!(set.len(), 3);
        assert!(set.contains("A1"));
        assert!(set.contains("C1"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["A1", "B2", "C1"]);
    }

    #[test]
    fn test_from_csv_empty() {
        assert!(PreferenceSet::from_csv("").is_empty());
        assert!(PreferenceSet::from_csv(" , ").is_empty());
    }

    #[test]
    fn test_overlap_counts() {
        let a: PreferenceSet = ["A1", "B1", "C1"].into_iter().collect();
        let b: PreferenceSet = ["B1", "C1", "D1", "E1"].into_iter().collect();
        assert_eq!(a.intersection_len(&b), 2);
        assert_eq!(a.union_len(&b), 5);
    }

    #[test]
    fn test_catalog_lookup() {
        assert_eq!(PreferenceCategory::Food.describe("A3"), Some("Vegan"));
        assert_eq!(PreferenceCategory::Music.describe("G1"), Some("Metal"));
        assert!(!PreferenceCategory::Hobby.is_known_code("A3"));

        let set: PreferenceSet = ["A1", "Z9"].into_iter().collect();
        assert_eq!(set.unknown_codes(PreferenceCategory::Hobby), vec!["Z9"]);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(
            "Hobbies".parse::<PreferenceCategory>(),
            Ok(PreferenceCategory::Hobby)
        );
        assert!("movies".parse::<PreferenceCategory>().is_err());
    }

    #[test]
    fn test_serializes_as_list() {
        let set: PreferenceSet = ["B2", "A1"].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["A1","B2"]"#);
    }
}
