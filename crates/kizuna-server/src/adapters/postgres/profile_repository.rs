//! PostgreSQL implementation of ProfileRepository
//!
//! Reads the collaborator-owned tables: `user_info` (birthdate),
//! `user_data` (PostGIS locations), `profile_info` (preference codes)
//! and `weights`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use kizuna::domain::REGISTRATION_WEIGHT;
use kizuna::{DomainError, Profile, ProfileRecord, ProfileRepository, WeightVector};

/// Profile columns shared by every profile query
const PROFILE_SELECT: &str = r#"
    SELECT ui.user_uuid AS user_id,
           ui.birthdate,
           ST_Y(ud.register_location::geometry) AS register_latitude,
           ST_X(ud.register_location::geometry) AS register_longitude,
           ST_Y(ud.browser_location::geometry) AS browser_latitude,
           ST_X(ud.browser_location::geometry) AS browser_longitude,
           pi.food_myvariabledata AS food,
           pi.hobbies_myvariabledata AS hobbies,
           pi.music_myvariabledata AS music
    FROM user_info ui
    JOIN user_data ud ON ud.user_uuid = ui.user_uuid
    LEFT JOIN profile_info pi ON pi.user_uuid = ui.user_uuid
    WHERE ui.birthdate IS NOT NULL
      AND COALESCE(ud.browser_location, ud.register_location) IS NOT NULL
"#;

/// PostgreSQL implementation of ProfileRepository
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: Uuid,
    birthdate: Option<chrono::NaiveDate>,
    register_latitude: Option<f64>,
    register_longitude: Option<f64>,
    browser_latitude: Option<f64>,
    browser_longitude: Option<f64>,
    food: Option<String>,
    hobbies: Option<String>,
    music: Option<String>,
}

impl From<ProfileRow> for ProfileRecord {
    fn from(row: ProfileRow) -> Self {
        Self {
            user_id: row.user_id,
            register_location: row.register_latitude.zip(row.register_longitude),
            browser_location: row.browser_latitude.zip(row.browser_longitude),
            birthdate: row.birthdate,
            food: row.food,
            hobbies: row.hobbies,
            music: row.music,
        }
    }
}

#[derive(sqlx::FromRow)]
struct WeightsRow {
    weigh_distance: Option<f64>,
    weigh_age: Option<f64>,
    weigh_food: Option<f64>,
    weigh_hobbies: Option<f64>,
    weigh_music: Option<f64>,
}

impl TryFrom<WeightsRow> for WeightVector {
    type Error = DomainError;

    fn try_from(row: WeightsRow) -> Result<Self, Self::Error> {
        let or_default = |value: Option<f64>| value.unwrap_or(REGISTRATION_WEIGHT);
        WeightVector::new(
            or_default(row.weigh_distance),
            or_default(row.weigh_age),
            or_default(row.weigh_food),
            or_default(row.weigh_hobbies),
            or_default(row.weigh_music),
        )
    }
}

fn assemble(row: ProfileRow) -> Result<Option<Profile>, DomainError> {
    let profile = ProfileRecord::from(row).into_profile()?;
    if let Some(profile) = &profile {
        for (category, code) in profile.unknown_codes() {
            tracing::debug!(
                "❓ {} has unknown {} code {:?}, scored as stored",
                profile.user_id,
                category,
                code
            );
        }
    }
    Ok(profile)
}

fn into_profiles(rows: Vec<ProfileRow>) -> Result<Vec<Profile>, DomainError> {
    let mut profiles = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(profile) = assemble(row)? {
            profiles.push(profile);
        }
    }
    Ok(profiles)
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, DomainError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "{} AND ui.user_uuid = $1",
            PROFILE_SELECT
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        match row {
            Some(row) => assemble(row),
            None => Ok(None),
        }
    }

    async fn find_weights(&self, user_id: Uuid) -> Result<Option<WeightVector>, DomainError> {
        let row = sqlx::query_as::<_, WeightsRow>(
            r#"
            SELECT weigh_distance::float8 AS weigh_distance,
                   weigh_age::float8 AS weigh_age,
                   weigh_food::float8 AS weigh_food,
                   weigh_hobbies::float8 AS weigh_hobbies,
                   weigh_music::float8 AS weigh_music
            FROM weights
            WHERE user_uuid = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.map(WeightVector::try_from).transpose()
    }

    async fn find_candidates(&self, viewer_id: Uuid) -> Result<Vec<Profile>, DomainError> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "{} AND ui.birthdate <= CURRENT_DATE AND ui.user_uuid <> $1 ORDER BY ui.user_uuid",
            PROFILE_SELECT
        ))
        .bind(viewer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        into_profiles(rows)
    }

    async fn list_profile_ids(&self) -> Result<Vec<Uuid>, DomainError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT ui.user_uuid
            FROM user_info ui
            JOIN user_data ud ON ud.user_uuid = ui.user_uuid
            WHERE ui.birthdate IS NOT NULL
              AND ui.birthdate <= CURRENT_DATE
              AND COALESCE(ud.browser_location, ud.register_location) IS NOT NULL
            ORDER BY ui.user_uuid
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))
    }
}
