use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::warn;

use crate::bot::gamification::Level;
use crate::database::StoreError;
use crate::utils::datetime::{format_date, format_timestamp, parse_date, parse_timestamp};

/// Everything the bot remembers about one chat participant.
///
/// The level is not stored here: it is always derived from
/// `completed_missions` through [`UserRecord::level`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub city: String,
    pub last_check: Option<DateTime<Utc>>,
    pub weekly_aqi: Vec<f64>,
    pub completed_missions: u32,
    pub alerts_enabled: bool,
    pub last_mission_date: Option<NaiveDate>,
    pub current_mission: String,
}

/// Raw `users` table row.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub user_id: i64,
    pub city: String,
    pub last_check: String,
    pub weekly_aqi: String,
    pub completed_missions: i64,
    pub level: String,
    pub alerts_enabled: bool,
    pub last_mission: String,
    pub current_mission: String,
}

impl UserRecord {
    /// Defaults for a participant seen for the first time.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            city: String::new(),
            last_check: None,
            weekly_aqi: Vec::new(),
            completed_missions: 0,
            alerts_enabled: true,
            last_mission_date: None,
            current_mission: String::new(),
        }
    }

    pub fn level(&self) -> Level {
        Level::for_missions(self.completed_missions)
    }

    pub fn has_city(&self) -> bool {
        !self.city.is_empty()
    }

    pub fn has_active_mission(&self) -> bool {
        !self.current_mission.is_empty()
    }

    /// Arithmetic mean over every retained AQI sample, 0 when there are none.
    pub fn average_aqi(&self) -> f64 {
        if self.weekly_aqi.is_empty() {
            return 0.0;
        }
        self.weekly_aqi.iter().sum::<f64>() / self.weekly_aqi.len() as f64
    }

    pub fn record_completion(&mut self) {
        self.completed_missions = self.completed_missions.saturating_add(1);
    }

    pub fn to_row(&self) -> Result<UserRow, StoreError> {
        Ok(UserRow {
            user_id: self.id,
            city: self.city.clone(),
            last_check: self.last_check.as_ref().map(format_timestamp).unwrap_or_default(),
            weekly_aqi: serde_json::to_string(&self.weekly_aqi)?,
            completed_missions: i64::from(self.completed_missions),
            level: self.level().label().to_string(),
            alerts_enabled: self.alerts_enabled,
            last_mission: self.last_mission_date.as_ref().map(format_date).unwrap_or_default(),
            current_mission: self.current_mission.clone(),
        })
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Option<Self>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT user_id, city, last_check, weekly_aqi, completed_missions, level, alerts_enabled, last_mission, current_mission FROM users WHERE user_id = ?"
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Self::from))
    }

    pub async fn find_all(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT user_id, city, last_check, weekly_aqi, completed_missions, level, alerts_enabled, last_mission, current_mission FROM users ORDER BY user_id"
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Self::from).collect())
    }

    /// Writes the whole record, replacing any existing row with the same id.
    pub async fn save(&self, pool: &sqlx::SqlitePool) -> Result<(), StoreError> {
        let row = self.to_row()?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO users
                (user_id, city, last_check, weekly_aqi, completed_missions, level, alerts_enabled, last_mission, current_mission)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.user_id)
        .bind(&row.city)
        .bind(&row.last_check)
        .bind(&row.weekly_aqi)
        .bind(row.completed_missions)
        .bind(&row.level)
        .bind(row.alerts_enabled)
        .bind(&row.last_mission)
        .bind(&row.current_mission)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn count(pool: &sqlx::SqlitePool) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

impl From<UserRow> for UserRecord {
    // The stored level column is ignored; it is recomputed on every write.
    fn from(row: UserRow) -> Self {
        let weekly_aqi = if row.weekly_aqi.trim().is_empty() || row.weekly_aqi.trim() == "null" {
            Vec::new()
        } else {
            serde_json::from_str(&row.weekly_aqi).unwrap_or_else(|e| {
                warn!("Discarding unreadable AQI history for user {}: {}", row.user_id, e);
                Vec::new()
            })
        };

        Self {
            id: row.user_id,
            city: row.city,
            last_check: parse_timestamp(&row.last_check),
            weekly_aqi,
            completed_missions: u32::try_from(row.completed_missions).unwrap_or(0),
            alerts_enabled: row.alerts_enabled,
            last_mission_date: parse_date(&row.last_mission),
            current_mission: row.current_mission,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = UserRecord::new(7);
        assert_eq!(user.level(), Level::Observer);
        assert!(user.alerts_enabled);
        assert!(!user.has_city());
        assert!(!user.has_active_mission());
        assert!(user.weekly_aqi.is_empty());
    }

    #[test]
    fn test_average_aqi() {
        let mut user = UserRecord::new(1);
        assert_eq!(user.average_aqi(), 0.0);
        user.weekly_aqi = vec![50.0, 100.0];
        assert_eq!(user.average_aqi(), 75.0);
    }

    #[test]
    fn test_row_conversion_recomputes_level() {
        let row = UserRow {
            user_id: 3,
            city: "kyiv".to_string(),
            last_check: "2024-05-01T10:00:00Z".to_string(),
            weekly_aqi: "[10, 20.5]".to_string(),
            completed_missions: 6,
            level: "something stale".to_string(),
            alerts_enabled: false,
            last_mission: "2024-05-01".to_string(),
            current_mission: String::new(),
        };

        let user = UserRecord::from(row);
        assert_eq!(user.level(), Level::Defender);
        assert_eq!(user.weekly_aqi, vec![10.0, 20.5]);
        assert!(user.last_check.is_some());
        assert_eq!(user.last_mission_date, parse_date("2024-05-01"));

        let row = user.to_row().unwrap();
        assert_eq!(row.level, Level::Defender.label());
        assert_eq!(row.last_check, "2024-05-01T10:00:00Z");
    }

    #[test]
    fn test_corrupt_aqi_history_is_dropped() {
        let row = UserRow {
            user_id: 4,
            city: String::new(),
            last_check: String::new(),
            weekly_aqi: "not json".to_string(),
            completed_missions: -2,
            level: String::new(),
            alerts_enabled: true,
            last_mission: String::new(),
            current_mission: String::new(),
        };

        let user = UserRecord::from(row);
        assert!(user.weekly_aqi.is_empty());
        assert_eq!(user.completed_missions, 0);
        assert_eq!(user.last_check, None);
    }
}
