//! OSRM driving routes

use anyhow::{Result, anyhow};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::{RouteProvider, fetch_json};
use crate::cache;
use crate::models::{Location, RouteData};

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// meters
    distance: f64,
    /// seconds
    duration: f64,
    geometry: Option<OsrmGeometry>,
}

/// GeoJSON line string, coordinates in `[lon, lat]` order
#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl From<OsrmRoute> for RouteData {
    fn from(route: OsrmRoute) -> Self {
        let coordinates = route
            .geometry
            .map(|geometry| {
                geometry
                    .coordinates
                    .into_iter()
                    .map(|[lon, lat]| (lat, lon))
                    .collect()
            })
            .unwrap_or_default();
        RouteData {
            coordinates,
            duration_seconds: route.duration,
            distance_meters: route.distance,
        }
    }
}

fn first_route(response: OsrmResponse) -> Result<RouteData> {
    response
        .routes
        .into_iter()
        .next()
        .map(RouteData::from)
        .ok_or_else(|| anyhow!("No route found"))
}

pub struct OsrmClient {
    client: ClientWithMiddleware,
    base_url: String,
    cache_ttl_hours: u32,
}

impl OsrmClient {
    pub fn new(client: ClientWithMiddleware, base_url: impl Into<String>, cache_ttl_hours: u32) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache_ttl_hours,
        }
    }

    fn route_url(&self, start: &Location, end: &Location, overview: &str) -> String {
        let mut url = format!(
            "{}/route/v1/driving/{},{};{},{}?overview={}",
            self.base_url, start.longitude, start.latitude, end.longitude, end.latitude, overview
        );
        if overview != "false" {
            url.push_str("&geometries=geojson");
        }
        url
    }
}

impl RouteProvider for OsrmClient {
    #[instrument(skip(self, start, end), fields(from = %start.format_coordinates(), to = %end.format_coordinates()))]
    async fn route(&self, start: &Location, end: &Location) -> Result<RouteData> {
        let key = format!("route:{}-{}", start.cache_key(), end.cache_key());
        match cache::get::<RouteData>(&key).await {
            Ok(Some(cached)) => {
                debug!("Route cache hit");
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => warn!("Route cache lookup failed: {:#}", e),
        }

        let response: OsrmResponse =
            fetch_json(&self.client, &self.route_url(start, end, "full")).await?;
        let route = first_route(response)?;

        info!(
            "Route found: {:.1} km, {} ({} points)",
            route.distance_meters / 1000.0,
            route.format_duration(),
            route.coordinates.len()
        );

        let ttl = cache::jittered_ttl(self.cache_ttl_hours);
        if let Err(e) = cache::put(&key, route.clone(), ttl).await {
            warn!("Failed to cache route: {:#}", e);
        }
        Ok(route)
    }

    #[instrument(skip(self, start, end))]
    async fn driving_distance(&self, start: &Location, end: &Location) -> Result<Option<f64>> {
        let response: OsrmResponse =
            fetch_json(&self.client, &self.route_url(start, end, "false")).await?;
        Ok(response.routes.first().map(|route| route.distance))
    }
}
