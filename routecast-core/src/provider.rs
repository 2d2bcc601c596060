use crate::{
    Config,
    model::{GeoPoint, Polyline, RouteOptions, WeatherReport},
    provider::{mapbox::MapboxProvider, openweather::OpenWeatherProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};

pub mod mapbox;
pub mod openweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Mapbox,
    OpenWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Mapbox => "mapbox",
            ProviderId::OpenWeather => "openweather",
        }
    }

    /// What the provider is used for, for prompts and hints.
    pub fn purpose(&self) -> &'static str {
        match self {
            ProviderId::Mapbox => "geocoding and driving directions",
            ProviderId::OpenWeather => "weather and precipitation radar",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Mapbox, ProviderId::OpenWeather]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "mapbox" => Ok(ProviderId::Mapbox),
            "openweather" => Ok(ProviderId::OpenWeather),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: mapbox, openweather."
            )),
        }
    }
}

/// Resolves a place name to a single best-match point.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// `Ok(None)` means the place is unknown; `Err` is a transport failure.
    async fn geocode(&self, place: &str) -> anyhow::Result<Option<GeoPoint>>;
}

/// Computes a driving route between two points.
#[async_trait]
pub trait RouteProvider: Send + Sync + Debug {
    /// `Ok(None)` means no route exists between the points.
    async fn route(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        options: &RouteOptions,
    ) -> anyhow::Result<Option<Polyline>>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_weather(&self, point: GeoPoint) -> anyhow::Result<WeatherReport>;
}

#[async_trait]
impl<T: Geocoder + ?Sized> Geocoder for Arc<T> {
    async fn geocode(&self, place: &str) -> anyhow::Result<Option<GeoPoint>> {
        (**self).geocode(place).await
    }
}

#[async_trait]
impl<T: RouteProvider + ?Sized> RouteProvider for Arc<T> {
    async fn route(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        options: &RouteOptions,
    ) -> anyhow::Result<Option<Polyline>> {
        (**self).route(start, end, options).await
    }
}

#[async_trait]
impl<T: WeatherProvider + ?Sized> WeatherProvider for Arc<T> {
    async fn fetch_weather(&self, point: GeoPoint) -> anyhow::Result<WeatherReport> {
        (**self).fetch_weather(point).await
    }
}

/// The remote collaborators a search talks to.
#[derive(Debug)]
pub struct Providers {
    pub geocoder: Box<dyn Geocoder>,
    pub router: Box<dyn RouteProvider>,
    pub weather: Box<dyn WeatherProvider>,
}

impl Providers {
    /// Construct every provider from config, failing on the first missing key.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mapbox_key = required_api_key(ProviderId::Mapbox, config)?;
        let openweather_key = required_api_key(ProviderId::OpenWeather, config)?;

        let mut weather = OpenWeatherProvider::new(openweather_key.to_owned());
        if let Some(language) = &config.preferences.language {
            weather = weather.with_language(language.clone());
        }

        // One client serves both geocoding and directions.
        let mapbox = Arc::new(MapboxProvider::new(mapbox_key.to_owned()));

        Ok(Self {
            geocoder: Box::new(Arc::clone(&mapbox)),
            router: Box::new(mapbox),
            weather: Box::new(weather),
        })
    }
}

fn required_api_key(id: ProviderId, config: &Config) -> anyhow::Result<&str> {
    config
        .provider_api_key(id)
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No API key configured for provider '{id}' ({}).\n\
                 Hint: run `routecast configure {id}` and enter your API key.",
                id.purpose()
            )
        })
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
