//! Wrappers around the OpenStreetMap web services the planner talks to.
//!
//! Each external service sits behind a small trait so the orchestrator in
//! [`crate::planner`] can be driven by any implementation:
//! - [`Geocoder`]: address lookup and autocomplete (Nominatim)
//! - [`RouteProvider`]: driving routes and distances (OSRM)
//! - [`PoiSearch`]: tagged features near a route (Overpass)
//!
//! Cost and event estimation need no network and live in [`costs`] and
//! [`events`].

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::TripPlannerError;
use crate::config::ServicesConfig;
use crate::models::{Location, Poi, RouteData};

pub mod costs;
pub mod events;
pub mod nominatim;
pub mod osrm;
pub mod overpass;
#[cfg(test)]
mod test_server;

pub use nominatim::NominatimClient;
pub use osrm::OsrmClient;
pub use overpass::OverpassClient;

pub trait Geocoder {
    /// Resolve an address to its best matching location
    async fn geocode(&self, address: &str) -> Result<Location>;
    /// Up to five display names matching a partial address
    async fn search_address(&self, query: &str) -> Result<Vec<String>>;
}

pub trait RouteProvider {
    /// Full driving route between two points
    async fn route(&self, start: &Location, end: &Location) -> Result<RouteData>;
    /// Driving distance in meters without geometry; `None` when no route exists
    async fn driving_distance(&self, start: &Location, end: &Location) -> Result<Option<f64>>;
}

pub trait PoiSearch {
    /// Features tagged with `category` near the route. Failures yield an empty list.
    async fn search(&self, category: &str, route: &[(f64, f64)]) -> Vec<Poi>;
}

/// Shared HTTP client with timeout, user agent and retries on transient failures
pub fn build_http_client(config: &ServicesConfig) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds.into()))
        .user_agent(config.user_agent.clone())
        .build()
        .with_context(|| "Failed to create HTTP client")?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// GET `url` and decode the JSON body, turning HTTP errors into API errors
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &ClientWithMiddleware,
    url: &str,
) -> Result<T> {
    debug!("GET {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request to {url} failed"))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TripPlannerError::api(format!("{url} returned {status}: {body}")).into());
    }

    response
        .json()
        .await
        .with_context(|| format!("Failed to parse response from {url}"))
}
