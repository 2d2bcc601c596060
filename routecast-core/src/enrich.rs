//! Attaches weather to sampled route points.

use futures::{StreamExt, stream};
use tracing::{debug, warn};

use crate::classify::WeatherClassifier;
use crate::error::SearchError;
use crate::model::{GeoPoint, WeatherMarker, WeatherObservation, WeatherReport};
use crate::provider::WeatherProvider;

#[derive(Debug, Clone, Copy)]
pub struct WeatherEnricher {
    concurrency: usize,
}

impl Default for WeatherEnricher {
    fn default() -> Self {
        Self::sequential()
    }
}

impl WeatherEnricher {
    /// One lookup at a time, each awaited before the next is issued.
    pub const fn sequential() -> Self {
        Self { concurrency: 1 }
    }

    /// Up to `concurrency` lookups in flight. Markers still come back in
    /// input order.
    pub fn with_concurrency(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetches weather for every point and returns one marker per successful
    /// lookup, in the order of `points`. Failed lookups are dropped.
    pub async fn enrich(
        &self,
        points: &[GeoPoint],
        provider: &dyn WeatherProvider,
        classifier: &WeatherClassifier,
    ) -> Vec<WeatherMarker> {
        let results = if self.concurrency == 1 {
            let mut results = Vec::with_capacity(points.len());
            for &point in points {
                results.push((point, provider.fetch_weather(point).await));
            }
            results
        } else {
            stream::iter(points.iter().copied())
                .map(|point| async move { (point, provider.fetch_weather(point).await) })
                .buffered(self.concurrency)
                .collect::<Vec<_>>()
                .await
        };

        let markers: Vec<WeatherMarker> = results
            .into_iter()
            .filter_map(|(point, result)| match result {
                Ok(report) => Some(build_marker(point, report, classifier)),
                Err(err) => {
                    let err = SearchError::WeatherFetch {
                        point,
                        message: format!("{err:#}"),
                    };
                    warn!(error = %err, "dropping sample point");
                    None
                }
            })
            .collect();

        debug!(
            requested = points.len(),
            markers = markers.len(),
            "enriched sample points"
        );
        markers
    }
}

fn build_marker(point: GeoPoint, report: WeatherReport, classifier: &WeatherClassifier) -> WeatherMarker {
    WeatherMarker {
        point,
        observation: WeatherObservation::from(&report),
        style: classifier.classify(&report.condition),
        observed_at: report.observed_at,
        condition: report.condition,
    }
}
