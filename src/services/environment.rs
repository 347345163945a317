use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::utils::logging::log_environment_degraded;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const UNKNOWN_CONDITION: &str = "невідомо";

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentReading {
    pub temperature: f64,
    pub condition: String,
    pub aqi: u32,
}

impl EnvironmentReading {
    /// Zero-valued reading used when the provider cannot be reached.
    pub fn placeholder() -> Self {
        Self {
            temperature: 0.0,
            condition: UNKNOWN_CONDITION.to_string(),
            aqi: 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("city not found: {0}")]
    CityNotFound(String),

    #[error("failed to parse provider response: {0}")]
    Parse(String),
}

#[async_trait]
pub trait EnvironmentClient: Send + Sync {
    async fn fetch(&self, city: &str) -> Result<EnvironmentReading, EnvironmentError>;
}

/// Fetches a reading, degrading to [`EnvironmentReading::placeholder`] on error.
pub async fn fetch_or_placeholder(client: &dyn EnvironmentClient, city: &str) -> EnvironmentReading {
    match client.fetch(city).await {
        Ok(reading) => reading,
        Err(e) => {
            log_environment_degraded(city, &e.to_string());
            EnvironmentReading::placeholder()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WeatherResponse {
    coord: Option<Coordinates>,
    main: Option<MainBlock>,
    weather: Vec<WeatherDescription>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Coordinates {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MainBlock {
    temp: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WeatherDescription {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AirPollutionResponse {
    list: Vec<AirPollutionSample>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AirPollutionSample {
    components: Components,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Components {
    pm2_5: Option<f64>,
}

pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: String,
    country_code: String,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(
        api_key: impl Into<String>,
        country_code: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EnvironmentError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            country_code: country_code.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Points the client at another host, e.g. a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn current_weather(&self, city: &str) -> Result<WeatherResponse, EnvironmentError> {
        let location = if self.country_code.is_empty() {
            city.to_string()
        } else {
            format!("{},{}", city, self.country_code)
        };
        debug!("Fetching weather for {}", location);

        let response = self
            .client
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[
                ("q", location.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", "uk"),
            ])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(EnvironmentError::CityNotFound(city.to_string()));
        }
        if !response.status().is_success() {
            return Err(EnvironmentError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| EnvironmentError::Parse(e.to_string()))
    }

    async fn air_pollution(&self, coord: Coordinates) -> Result<AirPollutionResponse, EnvironmentError> {
        let response = self
            .client
            .get(format!("{}/data/2.5/air_pollution", self.base_url))
            .query(&[
                ("lat", coord.lat.to_string()),
                ("lon", coord.lon.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EnvironmentError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| EnvironmentError::Parse(e.to_string()))
    }
}

#[async_trait]
impl EnvironmentClient for OpenWeatherClient {
    async fn fetch(&self, city: &str) -> Result<EnvironmentReading, EnvironmentError> {
        let weather = self.current_weather(city).await?;

        let air = match weather.coord {
            Some(coord) => match self.air_pollution(coord).await {
                Ok(air) => Some(air),
                Err(e) => {
                    warn!("Air pollution lookup for '{}' failed: {}", city, e);
                    None
                }
            },
            None => None,
        };

        Ok(build_reading(weather, air))
    }
}

fn build_reading(weather: WeatherResponse, air: Option<AirPollutionResponse>) -> EnvironmentReading {
    let condition = weather
        .weather
        .into_iter()
        .map(|w| w.description)
        .find(|d| !d.is_empty())
        .unwrap_or_else(|| UNKNOWN_CONDITION.to_string());

    let aqi = air
        .and_then(|air| air.list.into_iter().next())
        .and_then(|sample| sample.components.pm2_5)
        .map(aqi_from_pm25)
        .unwrap_or(0);

    EnvironmentReading {
        temperature: weather.main.map(|m| m.temp).unwrap_or(0.0),
        condition,
        aqi,
    }
}

// (concentration low, concentration high, index low, index high)
const PM25_BREAKPOINTS: [(f64, f64, f64, f64); 7] = [
    (0.0, 12.0, 0.0, 50.0),
    (12.1, 35.4, 51.0, 100.0),
    (35.5, 55.4, 101.0, 150.0),
    (55.5, 150.4, 151.0, 200.0),
    (150.5, 250.4, 201.0, 300.0),
    (250.5, 350.4, 301.0, 400.0),
    (350.5, 500.4, 401.0, 500.0),
];

/// US-EPA air quality index for a PM2.5 concentration in µg/m³, capped at 500.
pub fn aqi_from_pm25(concentration: f64) -> u32 {
    if !concentration.is_finite() || concentration <= 0.0 {
        return 0;
    }
    let c = (concentration * 10.0).floor() / 10.0;

    for (c_low, c_high, i_low, i_high) in PM25_BREAKPOINTS {
        if c <= c_high {
            let c = c.max(c_low);
            let index = (i_high - i_low) / (c_high - c_low) * (c - c_low) + i_low;
            return index.round() as u32;
        }
    }
    500
}
