//! Trip cost estimation
//!
//! Flight and accommodation prices are not looked up anywhere yet; a manual
//! estimate from the user is used when given, otherwise the cost is zero.

use tracing::debug;

use crate::models::TripRequest;

pub const METERS_TO_MILES: f64 = 0.000_621_371;

/// Fuel cost of driving `distance_meters` at `mpg` with fuel at `price_per_gallon`.
///
/// Returns 0 when either the distance or the fuel economy is missing or zero.
#[must_use]
pub fn fuel_cost(distance_meters: Option<f64>, mpg: Option<f64>, price_per_gallon: f64) -> f64 {
    let (Some(distance), Some(mpg)) = (distance_meters, mpg) else {
        return 0.0;
    };
    if distance <= 0.0 || mpg <= 0.0 {
        return 0.0;
    }
    let miles = distance * METERS_TO_MILES;
    let gallons = miles / mpg;
    gallons * price_per_gallon
}

#[must_use]
pub fn flight_cost(trip: &TripRequest) -> f64 {
    trip.flight_cost.unwrap_or_else(|| {
        debug!(
            "No flight estimate for {} -> {}, using 0",
            trip.start_location, trip.end_location
        );
        0.0
    })
}

#[must_use]
pub fn accommodation_cost(trip: &TripRequest) -> f64 {
    trip.accommodation_cost.unwrap_or_else(|| {
        debug!(
            "No accommodation estimate for stay in {}, using 0",
            trip.end_location
        );
        0.0
    })
}
