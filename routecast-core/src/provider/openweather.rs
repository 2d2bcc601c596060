use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::model::{GeoPoint, WeatherReport};

use super::{WeatherProvider, truncate_body};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const TILE_BASE_URL: &str = "https://tile.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    language: Option<String>,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            language: None,
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Language for condition descriptions, e.g. "tr".
    pub fn with_language(mut self, language: String) -> Self {
        self.language = Some(language);
        self
    }

    async fn fetch_current(&self, point: GeoPoint) -> Result<WeatherReport> {
        let url = format!("{}/data/2.5/weather", self.base_url.trim_end_matches('/'));
        let lat = point.latitude.to_string();
        let lon = point.longitude.to_string();

        let mut request = self.http.get(url).query(&[
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("units", "metric"),
            ("appid", self.api_key.as_str()),
        ]);
        if let Some(language) = &self.language {
            request = request.query(&[("lang", language.as_str())]);
        }

        let res = request
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        parse_current(&body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    /// Condition group, e.g. "Rain".
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: Option<i64>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

fn parse_current(body: &str) -> Result<WeatherReport> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).context("Failed to parse OpenWeather current JSON")?;

    let condition = parsed
        .weather
        .first()
        .map(|w| w.main.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(WeatherReport {
        condition,
        temperature_c: parsed.main.temp,
        wind_speed_ms: parsed.wind.speed,
        wind_direction_deg: parsed.wind.deg,
        observed_at: parsed.dt.and_then(unix_to_utc),
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self))]
    async fn fetch_weather(&self, point: GeoPoint) -> Result<WeatherReport> {
        let report = self.fetch_current(point).await?;
        debug!(condition = %report.condition, temp = report.temperature_c, "fetched weather");
        Ok(report)
    }
}

/// Live precipitation tile layer drawn on top of the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadarOverlay {
    api_key: String,
}

impl RadarOverlay {
    pub const LAYER: &'static str = "precipitation_new";
    pub const OPACITY: f32 = 0.6;

    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }

    /// `None` when the overlay is switched off.
    pub fn from_preference(show_radar: bool, api_key: Option<&str>) -> Option<Self> {
        match api_key {
            Some(key) if show_radar && !key.trim().is_empty() => Some(Self::new(key.to_owned())),
            _ => None,
        }
    }

    /// Slippy-map URL template with `{z}`, `{x}` and `{y}` placeholders.
    pub fn url_template(&self) -> String {
        format!(
            "{TILE_BASE_URL}/map/{}/{{z}}/{{x}}/{{y}}.png?appid={}",
            Self::LAYER,
            self.api_key
        )
    }

    pub fn tile_url(&self, zoom: u8, x: u32, y: u32) -> String {
        format!(
            "{TILE_BASE_URL}/map/{}/{zoom}/{x}/{y}.png?appid={}",
            Self::LAYER,
            self.api_key
        )
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}
