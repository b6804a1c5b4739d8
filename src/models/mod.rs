//! Data models for the TripPlanner application
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and metadata
//! - Trip: The user's trip request as collected from the command line
//! - Route: Driving route geometry and summary
//! - Poi: Points of interest found along a route
//! - Costs: Estimated trip costs
//! - Plan: The aggregate result of planning a trip

pub mod costs;
pub mod location;
pub mod plan;
pub mod poi;
pub mod route;
pub mod trip;

// Re-export all public types for convenient access
pub use costs::CostDetails;
pub use location::Location;
pub use plan::TripPlan;
pub use poi::Poi;
pub use route::RouteData;
pub use trip::{TripRequest, TripType};
