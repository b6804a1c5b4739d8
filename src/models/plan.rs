use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CostDetails, Location, Poi, TripRequest};

/// Everything produced by planning one trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPlan {
    pub request: TripRequest,
    pub start: Location,
    pub end: Location,
    /// Route geometry as `(lat, lon)`; empty when routing failed
    pub waypoints: Vec<(f64, f64)>,
    /// Driving time in seconds; `None` when routing failed
    pub route_duration_seconds: Option<f64>,
    /// Driving distance in meters; `None` when routing failed
    pub route_distance_meters: Option<f64>,
    pub pois: Vec<Poi>,
    pub costs: CostDetails,
    pub events: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl TripPlan {
    /// Whether a driving route was found
    #[must_use]
    pub fn has_route(&self) -> bool {
        !self.waypoints.is_empty()
    }

    /// Straight-line distance between start and end in kilometers
    #[must_use]
    pub fn straight_line_km(&self) -> f64 {
        self.start.distance_km(&self.end)
    }
}
