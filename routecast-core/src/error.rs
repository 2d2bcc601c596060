//! Error types for route weather searches.

use thiserror::Error;

use crate::model::GeoPoint;

#[derive(Error, Debug)]
pub enum SearchError {
    /// Missing or malformed user input; raised before any network call.
    #[error("Invalid input: {message}")]
    InputValidation { message: String },

    /// A place name could not be resolved to coordinates.
    #[error("Could not find a location for '{place}'")]
    GeocodingFailure { place: String },

    /// The routing provider found no route between the resolved points.
    #[error("No route found between {start} and {end}")]
    RoutingFailure { start: GeoPoint, end: GeoPoint },

    /// A route needs at least a start and an end.
    #[error("A route needs at least 2 points, got {points}")]
    InvalidPolyline { points: usize },

    /// Network, HTTP status or payload failure talking to a provider.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Weather lookup failed for one sample point. Never aborts a search.
    #[error("Weather fetch failed at {point}: {message}")]
    WeatherFetch { point: GeoPoint, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl SearchError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::InputValidation {
            message: message.into(),
        }
    }

    pub fn geocoding<S: Into<String>>(place: S) -> Self {
        Self::GeocodingFailure {
            place: place.into(),
        }
    }

    /// Flattens an `anyhow` chain into a transport error.
    pub fn transport(err: &anyhow::Error) -> Self {
        Self::Transport {
            message: format!("{err:#}"),
        }
    }

    pub fn config(err: &anyhow::Error) -> Self {
        Self::Config {
            message: format!("{err:#}"),
        }
    }

    /// Whether the search as a whole stops on this error.
    pub fn aborts_search(&self) -> bool {
        !matches!(self, SearchError::WeatherFetch { .. })
    }

    /// Text suitable for a user-facing notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SearchError::InputValidation { message } => message.clone(),
            SearchError::GeocodingFailure { place } => format!("City not found: {place}"),
            SearchError::RoutingFailure { .. } | SearchError::InvalidPolyline { .. } => {
                "No route found.".to_string()
            }
            SearchError::Transport { .. } => {
                "Connection problem. Please check your network.".to_string()
            }
            SearchError::WeatherFetch { .. } => {
                "Weather is unavailable for part of the route.".to_string()
            }
            SearchError::Config { message } => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_creation() {
        let err = SearchError::validation("missing origin");
        assert!(matches!(err, SearchError::InputValidation { .. }));

        let err = SearchError::geocoding("Atlantis");
        assert!(matches!(err, SearchError::GeocodingFailure { .. }));
    }

    #[test]
    fn user_messages() {
        let err = SearchError::geocoding("Atlantis");
        assert!(err.user_message().contains("Atlantis"));

        let err = SearchError::transport(&anyhow::anyhow!("dns error"));
        assert!(err.user_message().contains("Connection problem"));
        assert!(err.to_string().contains("dns error"));
    }

    #[test]
    fn transport_keeps_context_chain() {
        let err = anyhow::anyhow!("connection reset").context("Failed to send request to Mapbox");
        let msg = SearchError::transport(&err).to_string();
        assert!(msg.contains("Failed to send request to Mapbox"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn only_weather_failures_are_soft() {
        let soft = SearchError::WeatherFetch {
            point: GeoPoint::new(0.0, 0.0),
            message: "timeout".into(),
        };
        assert!(!soft.aborts_search());
        assert!(SearchError::validation("x").aborts_search());
    }
}
