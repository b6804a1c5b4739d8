use serde::{Deserialize, Serialize};

/// Driving route between two points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteData {
    /// Route geometry as `(lat, lon)` pairs
    pub coordinates: Vec<(f64, f64)>,
    /// Estimated driving time in seconds
    pub duration_seconds: f64,
    /// Driving distance in meters
    pub distance_meters: f64,
}

impl RouteData {
    /// Driving time rendered as `"{h}h {m}m"`
    #[must_use]
    pub fn format_duration(&self) -> String {
        format_travel_time(self.duration_seconds)
    }
}

/// Render a duration in seconds as whole hours and minutes, e.g. `"3h 7m"`
#[must_use]
pub fn format_travel_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    format!("{hours}h {minutes}m")
}
