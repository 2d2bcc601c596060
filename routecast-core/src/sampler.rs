//! Picks the route points that get a weather marker.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SearchError;
use crate::geo::distance_km;
use crate::model::{GeoPoint, Polyline};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingOptions {
    /// Traveled distance between interior samples.
    pub interval_km: f64,
    /// Interior samples closer than this to the route end are skipped.
    pub end_exclusion_km: f64,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            interval_km: 60.0,
            end_exclusion_km: 20.0,
        }
    }
}

impl SamplingOptions {
    pub fn validate(&self) -> Result<(), SearchError> {
        if !self.interval_km.is_finite() || self.interval_km <= 0.0 {
            return Err(SearchError::validation(format!(
                "sampling interval must be a positive distance, got {} km",
                self.interval_km
            )));
        }
        if !self.end_exclusion_km.is_finite() || self.end_exclusion_km < 0.0 {
            return Err(SearchError::validation(format!(
                "end exclusion must be a non-negative distance, got {} km",
                self.end_exclusion_km
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RouteSampler {
    options: SamplingOptions,
}

impl RouteSampler {
    pub fn new(options: SamplingOptions) -> Result<Self, SearchError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> SamplingOptions {
        self.options
    }

    /// Returns the start, every vertex where the traveled distance first
    /// reaches the next interval mark (unless it lies within the end
    /// exclusion zone), and the end, in traversal order.
    ///
    /// A segment crosses at most one mark: the schedule advances by a single
    /// interval per crossing even if the segment is longer than that.
    pub fn sample(&self, route: &Polyline) -> Vec<GeoPoint> {
        let SamplingOptions {
            interval_km,
            end_exclusion_km,
        } = self.options;
        let end = route.end();

        let mut samples = vec![route.start()];
        let mut accumulated = 0.0;
        let mut next_target = interval_km;

        for pair in route.points().windows(2) {
            let (from, to) = (pair[0], pair[1]);
            accumulated += distance_km(from, to);

            if accumulated >= next_target {
                let to_end = distance_km(to, end);
                if to_end > end_exclusion_km {
                    samples.push(to);
                } else {
                    debug!(at_km = accumulated, to_end_km = to_end, "skipping sample near route end");
                }
                next_target += interval_km;
            }
        }

        samples.push(end);

        debug!(
            route_points = route.len(),
            route_km = accumulated,
            samples = samples.len(),
            "sampled route"
        );
        samples
    }
}
