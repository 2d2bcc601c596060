//! In-memory providers for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;

use crate::model::{GeoPoint, Polyline, RouteOptions, WeatherReport};
use crate::provider::{Geocoder, RouteProvider, WeatherProvider};

#[derive(Debug)]
pub struct FakeWeather {
    condition: String,
    failing: Vec<GeoPoint>,
    reverse_delays: bool,
    calls: Mutex<Vec<GeoPoint>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for FakeWeather {
    fn default() -> Self {
        Self {
            condition: "Clear".into(),
            failing: Vec::new(),
            reverse_delays: false,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl FakeWeather {
    pub fn with_condition(mut self, condition: &str) -> Self {
        self.condition = condition.into();
        self
    }

    pub fn failing_at(mut self, point: GeoPoint) -> Self {
        self.failing.push(point);
        self
    }

    /// Points further west take longer to answer.
    pub fn with_reverse_delays(mut self) -> Self {
        self.reverse_delays = true;
        self
    }

    pub fn calls(&self) -> Vec<GeoPoint> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn fetch_weather(&self, point: GeoPoint) -> anyhow::Result<WeatherReport> {
        self.calls.lock().unwrap().push(point);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.reverse_delays {
            let yields = 32usize.saturating_sub(point.longitude.max(0.0) as usize);
            for _ in 0..yields {
                tokio::task::yield_now().await;
            }
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&point) {
            return Err(anyhow!("weather service timed out"));
        }

        Ok(WeatherReport {
            condition: self.condition.clone(),
            temperature_c: 10.4,
            wind_speed_ms: 2.5,
            wind_direction_deg: 90.0,
            observed_at: None,
        })
    }
}

#[derive(Debug, Default)]
pub struct FakeGeocoder {
    places: HashMap<String, GeoPoint>,
    offline: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn with_place(mut self, name: &str, point: GeoPoint) -> Self {
        self.places.insert(name.to_string(), point);
        self
    }

    /// Every lookup fails as if the network were down.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, place: &str) -> anyhow::Result<Option<GeoPoint>> {
        self.calls.lock().unwrap().push(place.to_string());
        if self.offline {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.places.get(place).copied())
    }
}

/// Routes along a straight line split into evenly spaced vertices.
#[derive(Debug)]
pub struct FakeRouter {
    steps: usize,
    no_route: bool,
    seen_options: Mutex<Vec<RouteOptions>>,
}

impl Default for FakeRouter {
    fn default() -> Self {
        Self {
            steps: 200,
            no_route: false,
            seen_options: Mutex::new(Vec::new()),
        }
    }
}

impl FakeRouter {
    pub fn without_route(mut self) -> Self {
        self.no_route = true;
        self
    }

    pub fn seen_options(&self) -> Vec<RouteOptions> {
        self.seen_options.lock().unwrap().clone()
    }
}

#[async_trait]
impl RouteProvider for FakeRouter {
    async fn route(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        options: &RouteOptions,
    ) -> anyhow::Result<Option<Polyline>> {
        self.seen_options.lock().unwrap().push(*options);
        if self.no_route {
            return Ok(None);
        }

        let points = (0..=self.steps)
            .map(|i| {
                let t = i as f64 / self.steps as f64;
                GeoPoint::new(
                    start.latitude + (end.latitude - start.latitude) * t,
                    start.longitude + (end.longitude - start.longitude) * t,
                )
            })
            .collect();
        Ok(Some(Polyline::new(points)?))
    }
}
