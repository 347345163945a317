use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::database::models::UserRecord;
use crate::database::StoreError;
use crate::utils::datetime::{parse_date, parse_timestamp};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct LegacyUser {
    #[serde(rename = "ID")]
    id: Option<i64>,
    city: String,
    last_check: Option<String>,
    #[serde(rename = "WeeklyAQI")]
    weekly_aqi: Option<Vec<f64>>,
    completed_missions: i64,
    alerts_enabled: bool,
    last_mission: String,
    current_mission: String,
}

impl LegacyUser {
    fn into_record(self, key: i64) -> UserRecord {
        UserRecord {
            id: self.id.filter(|id| *id != 0).unwrap_or(key),
            city: self.city,
            last_check: self.last_check.as_deref().and_then(parse_timestamp),
            weekly_aqi: self.weekly_aqi.unwrap_or_default(),
            completed_missions: u32::try_from(self.completed_missions).unwrap_or(0),
            alerts_enabled: self.alerts_enabled,
            last_mission_date: parse_date(&self.last_mission),
            current_mission: self.current_mission,
        }
    }
}

/// Parses a legacy dump: one JSON object mapping user id to a record.
pub fn parse_legacy_users(json: &str) -> Result<Vec<UserRecord>, StoreError> {
    let raw: HashMap<i64, LegacyUser> = serde_json::from_str(json)?;
    let mut users: Vec<UserRecord> = raw
        .into_iter()
        .map(|(key, user)| user.into_record(key))
        .collect();
    users.sort_by_key(|user| user.id);
    Ok(users)
}

/// Loads the legacy dump at `path`.
///
/// The import is best effort: a missing, unreadable or corrupt file yields no
/// users and a warning instead of stopping startup.
pub async fn load_legacy_users(path: &Path) -> Vec<UserRecord> {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No legacy import file at {}", path.display());
            return Vec::new();
        }
        Err(e) => {
            warn!("Skipping unreadable legacy import {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    match parse_legacy_users(&json) {
        Ok(users) => {
            info!("Read {} users from legacy import {}", users.len(), path.display());
            users
        }
        Err(e) => {
            warn!("Skipping corrupt legacy import {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_dump() {
        let json = r#"{
            "42": {
                "ID": 42,
                "City": "kyiv",
                "LastCheck": "2024-02-01T08:30:00Z",
                "WeeklyAQI": [40, 60],
                "CompletedMissions": 7,
                "Level": "Захисник",
                "AlertsEnabled": true,
                "LastMission": "2024-02-01",
                "CurrentMission": ""
            },
            "7": {
                "City": "",
                "WeeklyAQI": null,
                "AlertsEnabled": false
            }
        }"#;

        let users = parse_legacy_users(json).unwrap();
        assert_eq!(users.len(), 2);

        assert_eq!(users[0].id, 7);
        assert!(users[0].weekly_aqi.is_empty());
        assert!(!users[0].alerts_enabled);
        assert_eq!(users[0].last_check, None);

        assert_eq!(users[1].id, 42);
        assert_eq!(users[1].city, "kyiv");
        assert_eq!(users[1].weekly_aqi, vec![40.0, 60.0]);
        assert_eq!(users[1].completed_missions, 7);
        assert!(users[1].last_mission_date.is_some());
    }

    #[test]
    fn test_parse_legacy_dump_rejects_non_object() {
        assert!(parse_legacy_users("[1, 2, 3]").is_err());
    }

    #[tokio::test]
    async fn test_missing_file_yields_no_users() {
        let dir = tempfile::tempdir().unwrap();
        let users = load_legacy_users(&dir.path().join("absent.json")).await;
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_yields_no_users() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_data.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        assert!(load_legacy_users(&path).await.is_empty());
    }
}
