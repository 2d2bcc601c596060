//! Search pipeline: place names in, weather markers along the route out.
//!
//! [`RoutePlanner`] runs one search end to end. [`SearchSession`] holds the
//! state a front end renders (region, markers, loading flag) and only accepts
//! the outcome of the most recently started search, so a slow superseded
//! search can never overwrite a newer one.

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::Config;
use crate::classify::WeatherClassifier;
use crate::enrich::WeatherEnricher;
use crate::error::SearchError;
use crate::model::{GeoPoint, MapRegion, Polyline, RouteOptions, WeatherMarker};
use crate::provider::Providers;
use crate::sampler::RouteSampler;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    pub options: RouteOptions,
}

impl SearchRequest {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            options: RouteOptions::default(),
        }
    }

    pub fn avoid_tolls(mut self, avoid_tolls: bool) -> Self {
        self.options.avoid_tolls = avoid_tolls;
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.origin.trim().is_empty() || self.destination.trim().is_empty() {
            return Err(SearchError::validation(
                "Please enter both an origin and a destination.",
            ));
        }
        Ok(())
    }
}

/// Everything a completed search produced.
#[derive(Debug, Clone, Serialize)]
pub struct RouteAnalysis {
    pub origin: String,
    pub destination: String,
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub region: MapRegion,
    pub route: Polyline,
    pub route_km: f64,
    pub samples: Vec<GeoPoint>,
    pub markers: Vec<WeatherMarker>,
}

#[derive(Debug)]
pub struct RoutePlanner {
    providers: Providers,
    sampler: RouteSampler,
    enricher: WeatherEnricher,
    classifier: WeatherClassifier,
}

impl RoutePlanner {
    pub fn new(providers: Providers) -> Self {
        Self {
            providers,
            sampler: RouteSampler::default(),
            enricher: WeatherEnricher::default(),
            classifier: WeatherClassifier,
        }
    }

    /// Providers and sampling settings from the user's config.
    pub fn from_config(config: &Config) -> Result<Self, SearchError> {
        let providers = Providers::from_config(config).map_err(|e| SearchError::config(&e))?;
        let sampler = RouteSampler::new(config.sampling.options())?;

        Ok(Self::new(providers)
            .with_sampler(sampler)
            .with_enricher(WeatherEnricher::with_concurrency(
                config.sampling.weather_concurrency,
            )))
    }

    pub fn with_sampler(mut self, sampler: RouteSampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_enricher(mut self, enricher: WeatherEnricher) -> Self {
        self.enricher = enricher;
        self
    }

    #[instrument(skip(self, request), fields(origin = %request.origin, destination = %request.destination))]
    pub async fn plan(&self, request: &SearchRequest) -> Result<RouteAnalysis, SearchError> {
        request.validate()?;
        let origin = request.origin.trim();
        let destination = request.destination.trim();

        // The lookups are independent, so run them side by side.
        let (start, end) = tokio::join!(
            self.providers.geocoder.geocode(origin),
            self.providers.geocoder.geocode(destination),
        );
        let start = start
            .map_err(|e| SearchError::transport(&e))?
            .ok_or_else(|| SearchError::geocoding(origin))?;
        let end = end
            .map_err(|e| SearchError::transport(&e))?
            .ok_or_else(|| SearchError::geocoding(destination))?;
        info!(%start, %end, "resolved endpoints");

        let route = self
            .providers
            .router
            .route(start, end, &request.options)
            .await
            .map_err(|e| SearchError::transport(&e))?
            .ok_or(SearchError::RoutingFailure { start, end })?;
        let route_km = route.length_km();
        info!(points = route.len(), route_km, "fetched route");

        let samples = self.sampler.sample(&route);
        let markers = self
            .enricher
            .enrich(&samples, self.providers.weather.as_ref(), &self.classifier)
            .await;
        info!(samples = samples.len(), markers = markers.len(), "search complete");

        Ok(RouteAnalysis {
            origin: origin.to_string(),
            destination: destination.to_string(),
            start,
            end,
            region: MapRegion::spanning(start, end),
            route,
            route_km,
            samples,
            markers,
        })
    }

    /// Runs a search against `session`, start to finish.
    pub async fn run(&self, session: &mut SearchSession, request: &SearchRequest) {
        let ticket = session.begin(request);
        let outcome = self.plan(request).await;
        session.finish(ticket, outcome);
    }
}

/// Identifies one started search within a [`SearchSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// State shown by a front end between and during searches.
#[derive(Debug, Default)]
pub struct SearchSession {
    generation: u64,
    loading: bool,
    request: Option<SearchRequest>,
    region: MapRegion,
    analysis: Option<RouteAnalysis>,
    error: Option<SearchError>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a search, superseding any search still in flight.
    pub fn begin(&mut self, request: &SearchRequest) -> SearchTicket {
        self.generation += 1;
        self.loading = true;
        self.request = Some(request.clone());
        self.analysis = None;
        self.error = None;
        debug!(generation = self.generation, "search started");
        SearchTicket(self.generation)
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Records the outcome of a search. Returns `false`, leaving the session
    /// untouched, when `ticket` has been superseded by a later `begin`.
    pub fn finish(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<RouteAnalysis, SearchError>,
    ) -> bool {
        if !self.is_current(ticket) {
            debug!(
                stale = ticket.0,
                current = self.generation,
                "discarding superseded search result"
            );
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(analysis) => {
                self.region = analysis.region;
                self.analysis = Some(analysis);
            }
            Err(err) => {
                self.analysis = None;
                self.error = Some(err);
            }
        }
        true
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn request(&self) -> Option<&SearchRequest> {
        self.request.as_ref()
    }

    pub fn region(&self) -> MapRegion {
        self.region
    }

    pub fn analysis(&self) -> Option<&RouteAnalysis> {
        self.analysis.as_ref()
    }

    pub fn markers(&self) -> &[WeatherMarker] {
        self.analysis
            .as_ref()
            .map(|a| a.markers.as_slice())
            .unwrap_or_default()
    }

    pub fn error(&self) -> Option<&SearchError> {
        self.error.as_ref()
    }
}
