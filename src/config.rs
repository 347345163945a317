use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/ecobot.db";
const DEFAULT_LEGACY_DATA_FILE: &str = "user_data.json";
const DEFAULT_ALERT_SCHEDULE: &str = "0 0 */3 * * *";

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub openweather_api_key: String,
    pub database_url: String,
    pub legacy_data_file: PathBuf,
    pub http_port: u16,
    pub weather_country_code: String,
    pub weather_timeout: Duration,
    pub alert_schedule: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = required("TELEGRAM_BOT_TOKEN")?;
        let api_key = required("OPENWEATHER_API_KEY")?;

        let database_url = database_url_from_env();
        let legacy_data_file = optional("LEGACY_DATA_FILE")
            .unwrap_or_else(|| DEFAULT_LEGACY_DATA_FILE.to_string());

        let http_port = optional("HTTP_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let timeout_secs: u64 = optional("WEATHER_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map_err(|_| anyhow!("Invalid WEATHER_TIMEOUT_SECS"))?;
        if timeout_secs == 0 {
            return Err(anyhow!("WEATHER_TIMEOUT_SECS must be greater than zero"));
        }

        Ok(Config {
            telegram_bot_token: token,
            openweather_api_key: api_key,
            database_url,
            legacy_data_file: PathBuf::from(legacy_data_file),
            http_port,
            weather_country_code: optional("WEATHER_COUNTRY_CODE")
                .unwrap_or_else(|| "UA".to_string()),
            weather_timeout: Duration::from_secs(timeout_secs),
            alert_schedule: optional("ALERT_SCHEDULE")
                .unwrap_or_else(|| DEFAULT_ALERT_SCHEDULE.to_string()),
        })
    }
}

/// Database location alone, for tools that do not talk to Telegram.
pub fn database_url_from_env() -> String {
    optional("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

fn required(name: &str) -> Result<String> {
    optional(name).ok_or_else(|| anyhow!("{} must be set", name))
}

// Blank values are treated the same as missing ones.
fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
