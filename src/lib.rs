//! `TripPlanner` - road trip and flight planning on OpenStreetMap services
//!
//! This library resolves trip endpoints with Nominatim, routes them with
//! OSRM, looks for points of interest along the way with Overpass, estimates
//! costs and renders the result as a text itinerary and a Leaflet map.

pub mod cache;
pub mod config;
pub mod error;
pub mod itinerary;
pub mod logging;
pub mod map;
pub mod models;
pub mod planner;
pub mod services;

// Re-export core types for public API
pub use config::TripPlannerConfig;
pub use error::TripPlannerError;
pub use itinerary::Itinerary;
pub use models::{CostDetails, Location, Poi, RouteData, TripPlan, TripRequest, TripType};
pub use planner::{PlannerSession, TripPlanner};
pub use services::{Geocoder, PoiSearch, RouteProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripPlannerError>;
