//! Core library for the `routecast` CLI.
//!
//! This crate defines:
//! - Great-circle distance and route sampling at fixed intervals
//! - Weather condition styling and per-point weather enrichment
//! - Abstractions over geocoding, routing and weather providers
//! - Configuration, errors and the search session
//!
//! It is used by `routecast-cli`, but can also be reused by other front ends.

pub mod classify;
pub mod config;
pub mod enrich;
pub mod error;
pub mod geo;
pub mod model;
pub mod provider;
pub mod sampler;
pub mod session;

#[cfg(test)]
mod testing;

pub use classify::WeatherClassifier;
pub use config::{Config, Preferences, ProviderConfig, SamplingConfig};
pub use enrich::WeatherEnricher;
pub use error::SearchError;
pub use geo::distance_km;
pub use model::{
    GeoPoint, MapRegion, Polyline, RouteOptions, WeatherMarker, WeatherObservation, WeatherReport,
    WeatherStyle,
};
pub use provider::openweather::RadarOverlay;
pub use provider::{Geocoder, ProviderId, Providers, RouteProvider, WeatherProvider};
pub use sampler::{RouteSampler, SamplingOptions};
pub use session::{RouteAnalysis, RoutePlanner, SearchRequest, SearchSession, SearchTicket};
