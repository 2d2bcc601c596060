use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::model::{GeoPoint, Polyline, RouteOptions};

use super::{Geocoder, RouteProvider, truncate_body};

const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";

/// Geocoding and driving directions backed by the Mapbox APIs.
#[derive(Debug, Clone)]
pub struct MapboxProvider {
    access_token: String,
    base_url: String,
    http: Client,
}

impl MapboxProvider {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn geocoding_url(&self, place: &str) -> Result<Url> {
        let file = format!("{place}.json");
        self.endpoint(&["geocoding", "v5", "mapbox.places", file.as_str()])
    }

    fn directions_url(&self, start: GeoPoint, end: GeoPoint) -> Result<Url> {
        let waypoints = format!(
            "{},{};{},{}",
            start.longitude, start.latitude, end.longitude, end.latitude
        );
        self.endpoint(&["directions", "v5", "mapbox", "driving", waypoints.as_str()])
    }

    /// Base URL plus percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid Mapbox base URL: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|()| anyhow!("Mapbox base URL cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_body(&self, request: reqwest::RequestBuilder, what: &str) -> Result<String> {
        let res = request
            .send()
            .await
            .with_context(|| format!("Failed to send request to Mapbox ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read Mapbox {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Mapbox {what} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct MbFeature {
    /// `[lon, lat]`
    center: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct MbGeocodingResponse {
    features: Vec<MbFeature>,
}

#[derive(Debug, Deserialize)]
struct MbGeometry {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct MbRoute {
    geometry: MbGeometry,
}

#[derive(Debug, Deserialize)]
struct MbDirectionsResponse {
    #[serde(default)]
    routes: Vec<MbRoute>,
}

fn parse_geocoding(body: &str) -> Result<Option<GeoPoint>> {
    let parsed: MbGeocodingResponse =
        serde_json::from_str(body).context("Failed to parse Mapbox geocoding JSON")?;

    Ok(parsed
        .features
        .first()
        .map(|feature| GeoPoint::from_lon_lat(feature.center)))
}

fn parse_directions(body: &str) -> Result<Option<Polyline>> {
    let parsed: MbDirectionsResponse =
        serde_json::from_str(body).context("Failed to parse Mapbox directions JSON")?;

    let Some(route) = parsed.routes.into_iter().next() else {
        return Ok(None);
    };

    let points = route
        .geometry
        .coordinates
        .into_iter()
        .map(GeoPoint::from_lon_lat)
        .collect();

    // A degenerate geometry is as good as no route at all.
    Ok(Polyline::new(points).ok())
}

#[async_trait]
impl Geocoder for MapboxProvider {
    #[instrument(skip(self))]
    async fn geocode(&self, place: &str) -> Result<Option<GeoPoint>> {
        let url = self.geocoding_url(place)?;
        let request = self.http.get(url).query(&[
            ("access_token", self.access_token.as_str()),
            ("limit", "1"),
        ]);

        let body = self.get_body(request, "geocoding").await?;
        let point = parse_geocoding(&body)?;
        debug!(?point, "geocoded");
        Ok(point)
    }
}

#[async_trait]
impl RouteProvider for MapboxProvider {
    #[instrument(skip(self))]
    async fn route(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        options: &RouteOptions,
    ) -> Result<Option<Polyline>> {
        let url = self.directions_url(start, end)?;
        let mut request = self.http.get(url).query(&[
            ("geometries", "geojson"),
            ("access_token", self.access_token.as_str()),
        ]);
        if options.avoid_tolls {
            request = request.query(&[("exclude", "toll")]);
        }

        let body = self.get_body(request, "directions").await?;
        let route = parse_directions(&body)?;
        debug!(points = ?route.as_ref().map(Polyline::len), "fetched route");
        Ok(route)
    }
}
