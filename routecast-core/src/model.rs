use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::geo;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Like [`GeoPoint::new`], but rejects coordinates outside the valid ranges.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, SearchError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(SearchError::validation(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(SearchError::validation(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        Ok(Self::new(latitude, longitude))
    }

    /// Routing and geocoding payloads carry positions as `[lon, lat]`.
    pub const fn from_lon_lat(pair: [f64; 2]) -> Self {
        Self::new(pair[1], pair[0])
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        geo::distance_km(*self, *other)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// An ordered route from start to end with at least two points.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<GeoPoint>,
}

impl Polyline {
    pub fn new(points: Vec<GeoPoint>) -> Result<Self, SearchError> {
        if points.len() < 2 {
            return Err(SearchError::InvalidPolyline {
                points: points.len(),
            });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn start(&self) -> GeoPoint {
        self.points[0]
    }

    pub fn end(&self) -> GeoPoint {
        self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Never true for a constructed polyline.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total traveled distance along the polyline.
    pub fn length_km(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| geo::distance_km(pair[0], pair[1]))
            .sum()
    }
}

impl TryFrom<Vec<GeoPoint>> for Polyline {
    type Error = SearchError;

    fn try_from(points: Vec<GeoPoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOptions {
    pub avoid_tolls: bool,
}

/// Raw weather payload as a provider reports it for one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Condition category, e.g. "Clear", "Rain".
    pub condition: String,
    pub temperature_c: f64,
    pub wind_speed_ms: f64,
    pub wind_direction_deg: f64,
    pub observed_at: Option<DateTime<Utc>>,
}

/// Display-ready weather values derived from a [`WeatherReport`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub temperature_c: i32,
    pub wind_speed_kmh: i32,
    /// Direction the wind comes from, in [0, 360).
    pub wind_direction_deg: f64,
}

impl From<&WeatherReport> for WeatherObservation {
    fn from(report: &WeatherReport) -> Self {
        Self {
            temperature_c: round_half_up(report.temperature_c),
            wind_speed_kmh: round_half_up(report.wind_speed_ms * 3.6),
            wind_direction_deg: report.wind_direction_deg.rem_euclid(360.0),
        }
    }
}

// Halves round toward positive infinity: 2.5 -> 3, -2.5 -> -2.
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Icon identifier and hex color for a weather condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherStyle {
    pub icon_id: &'static str,
    pub color: &'static str,
}

/// A sample point annotated with weather data and its display style.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherMarker {
    #[serde(flatten)]
    pub point: GeoPoint,
    pub condition: String,
    #[serde(flatten)]
    pub observation: WeatherObservation,
    #[serde(flatten)]
    pub style: WeatherStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
}

/// Map viewport framing a pair of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub center: GeoPoint,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    const PADDING: f64 = 1.5;

    pub fn spanning(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            center: GeoPoint::new(
                (a.latitude + b.latitude) / 2.0,
                (a.longitude + b.longitude) / 2.0,
            ),
            latitude_delta: (a.latitude - b.latitude).abs() * Self::PADDING,
            longitude_delta: (a.longitude - b.longitude).abs() * Self::PADDING,
        }
    }
}

impl Default for MapRegion {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(39.0, 35.0),
            latitude_delta: 10.0,
            longitude_delta: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(temperature_c: f64, wind_speed_ms: f64, wind_direction_deg: f64) -> WeatherReport {
        WeatherReport {
            condition: "Clear".into(),
            temperature_c,
            wind_speed_ms,
            wind_direction_deg,
            observed_at: None,
        }
    }

    #[test]
    fn try_new_rejects_out_of_range() {
        assert!(GeoPoint::try_new(91.0, 0.0).is_err());
        assert!(GeoPoint::try_new(0.0, -180.5).is_err());
        assert!(GeoPoint::try_new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn from_lon_lat_swaps_order() {
        let p = GeoPoint::from_lon_lat([28.97, 41.01]);
        assert_eq!(p, GeoPoint::new(41.01, 28.97));
    }

    #[test]
    fn polyline_requires_two_points() {
        let err = Polyline::new(vec![GeoPoint::new(0.0, 0.0)]).unwrap_err();
        assert!(matches!(err, SearchError::InvalidPolyline { points: 1 }));

        let line = Polyline::new(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0)])
            .expect("two points is a valid polyline");
        assert_eq!(line.start(), GeoPoint::new(0.0, 0.0));
        assert_eq!(line.end(), GeoPoint::new(0.0, 1.0));
        assert!((line.length_km() - 111.19).abs() < 0.5);
    }

    #[test]
    fn observation_converts_and_rounds() {
        let obs = WeatherObservation::from(&report(21.5, 5.0, 370.0));
        assert_eq!(obs.temperature_c, 22);
        assert_eq!(obs.wind_speed_kmh, 18);
        assert!((obs.wind_direction_deg - 10.0).abs() < 1e-9);
    }

    #[test]
    fn negative_halves_round_up() {
        let obs = WeatherObservation::from(&report(-2.5, 0.0, -90.0));
        assert_eq!(obs.temperature_c, -2);
        assert!((obs.wind_direction_deg - 270.0).abs() < 1e-9);
    }

    #[test]
    fn region_spans_both_points() {
        let region = MapRegion::spanning(GeoPoint::new(10.0, 10.0), GeoPoint::new(12.0, 14.0));
        assert_eq!(region.center, GeoPoint::new(11.0, 12.0));
        assert!((region.latitude_delta - 3.0).abs() < 1e-9);
        assert!((region.longitude_delta - 6.0).abs() < 1e-9);
    }

    #[test]
    fn marker_serializes_flat() {
        let marker = WeatherMarker {
            point: GeoPoint::new(1.0, 2.0),
            condition: "Rain".into(),
            observation: WeatherObservation {
                temperature_c: 12,
                wind_speed_kmh: 30,
                wind_direction_deg: 180.0,
            },
            style: WeatherStyle {
                icon_id: "weather-rainy",
                color: "#29B6F6",
            },
            observed_at: None,
        };

        let json = serde_json::to_value(&marker).expect("marker serializes");
        assert_eq!(json["latitude"], 1.0);
        assert_eq!(json["temperature_c"], 12);
        assert_eq!(json["icon_id"], "weather-rainy");
        assert!(json.get("observed_at").is_none());
    }
}
