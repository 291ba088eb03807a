//! Profile - Scoring-relevant view of a user
//!
//! Profiles are owned by the profile-management collaborator. The engine
//! only reads them, so this is a read model assembled from stored records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{errors::DomainError, GeoPoint, PreferenceCategory, PreferenceSet};

/// Complete profile of a user, ready for scoring
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub user_id: Uuid,
    pub location: GeoPoint,
    pub birthdate: NaiveDate,
    pub food: PreferenceSet,
    pub hobbies: PreferenceSet,
    pub music: PreferenceSet,
}

impl Profile {
    pub fn preferences(&self, category: PreferenceCategory) -> &PreferenceSet {
        match category {
            PreferenceCategory::Food => &self.food,
            PreferenceCategory::Hobby => &self.hobbies,
            PreferenceCategory::Music => &self.music,
        }
    }

    /// Stored codes that no category catalog knows about
    pub fn unknown_codes(&self) -> Vec<(PreferenceCategory, &str)> {
        PreferenceCategory::ALL
            .into_iter()
            .flat_map(|category| {
                self.preferences(category)
                    .unknown_codes(category)
                    .into_iter()
                    .map(move |code| (category, code))
            })
            .collect()
    }
}

/// Raw profile fields as stored by the collaborator layer
#[derive(Debug, Clone, Default)]
pub struct ProfileRecord {
    pub user_id: Uuid,
    /// (latitude, longitude) captured at registration
    pub register_location: Option<(f64, f64)>,
    /// (latitude, longitude) reported by the browser, overrides registration
    pub browser_location: Option<(f64, f64)>,
    pub birthdate: Option<NaiveDate>,
    pub food: Option<String>,
    pub hobbies: Option<String>,
    pub music: Option<String>,
}

impl ProfileRecord {
    /// Assemble a scoring profile.
    ///
    /// Returns `Ok(None)` when the record lacks a location or birthdate.
    /// Stored coordinates outside the valid range are an error.
    pub fn into_profile(self) -> Result<Option<Profile>, DomainError> {
        let Some((latitude, longitude)) = self.browser_location.or(self.register_location) else {
            return Ok(None);
        };
        let Some(birthdate) = self.birthdate else {
            return Ok(None);
        };

        let parse = |raw: Option<String>| {
            raw.as_deref()
                .map(PreferenceSet::from_csv)
                .unwrap_or_default()
        };

        Ok(Some(Profile {
            user_id: self.user_id,
            location: GeoPoint::new(latitude, longitude)?,
            birthdate,
            food: parse(self.food),
            hobbies: parse(self.hobbies),
            music: parse(self.music),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProfileRecord {
        ProfileRecord {
            user_id: Uuid::new_v4(),
            register_location: Some((59.43, 24.75)),
            browser_location: None,
            birthdate: NaiveDate::from_ymd_opt(1995, 4, 12),
            food: Some("A1,B2".to_string()),
            hobbies: None,
            music: Some("".to_string()),
        }
    }

    #[test]
    fn test_into_profile_uses_register_location() {
        let profile = record().into_profile().unwrap().unwrap();
        assert_eq!(profile.location.latitude(), 59.43);
        assert_eq!(profile.food.len(), 2);
        assert!(profile.hobbies.is_empty());
        assert!(profile.music.is_empty());
    }

    #[test]
    fn test_browser_location_overrides_register() {
        let mut rec = record();
        rec.browser_location = Some((58.38, 26.72));
        let profile = rec.into_profile().unwrap().unwrap();
        assert_eq!(profile.location.latitude(), 58.38);
        assert_eq!(profile.location.longitude(), 26.72);
    }

    #[test]
    fn test_incomplete_record_yields_none() {
        let mut rec = record();
        rec.birthdate = None;
        assert!(rec.into_profile().unwrap().is_none());

        let mut rec = record();
        rec.register_location = None;
        assert!(rec.into_profile().unwrap().is_none());
    }

    #[test]
    fn test_unknown_codes_per_category() {
        let mut rec = record();
        rec.food = Some("A1,ZZ".to_string());
        rec.music = Some("Q9".to_string());
        let profile = rec.into_profile().unwrap().unwrap();

        assert_eq!(
            profile.unknown_codes(),
            vec![
                (PreferenceCategory::Food, "ZZ"),
                (PreferenceCategory::Music, "Q9")
            ]
        );
    }

    #[test]
    fn test_invalid_coordinates_error() {
        let mut rec = record();
        rec.register_location = Some((123.0, 0.0));
        assert!(matches!(
            rec.into_profile(),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
