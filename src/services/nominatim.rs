//! Nominatim geocoding and address autocomplete

use anyhow::{Context, Result};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{Geocoder, fetch_json};
use crate::models::Location;
use crate::{TripPlannerError, cache};

const AUTOCOMPLETE_LIMIT: u32 = 5;

/// One search hit. Nominatim reports coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
    /// Only present with `addressdetails=1`
    #[serde(default)]
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    country: Option<String>,
}

impl TryFrom<NominatimPlace> for Location {
    type Error = anyhow::Error;

    fn try_from(place: NominatimPlace) -> Result<Self> {
        let latitude: f64 = place
            .lat
            .trim()
            .parse()
            .with_context(|| format!("Invalid latitude '{}'", place.lat))?;
        let longitude: f64 = place
            .lon
            .trim()
            .parse()
            .with_context(|| format!("Invalid longitude '{}'", place.lon))?;
        let mut location = Location::new(latitude, longitude, place.display_name);
        location.country = place.address.and_then(|address| address.country);
        Ok(location)
    }
}

/// Best hit for `address`, or a geocoding error when there is none
fn first_location(places: Vec<NominatimPlace>, address: &str) -> Result<Location> {
    let place = places
        .into_iter()
        .next()
        .ok_or_else(|| TripPlannerError::geocoding(address))?;
    Location::try_from(place)
}

/// Decode a search response. Anything other than a JSON array is treated as no hits.
fn parse_places(body: Value) -> Result<Vec<NominatimPlace>> {
    if !body.is_array() {
        warn!("Unexpected Nominatim response shape, treating as empty");
        return Ok(Vec::new());
    }
    serde_json::from_value(body).with_context(|| "Failed to decode Nominatim places")
}

pub struct NominatimClient {
    client: ClientWithMiddleware,
    base_url: String,
    cache_ttl_hours: u32,
}

impl NominatimClient {
    pub fn new(client: ClientWithMiddleware, base_url: impl Into<String>, cache_ttl_hours: u32) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache_ttl_hours,
        }
    }

    fn search_url(&self, query: &str, limit: u32) -> String {
        format!(
            "{}/search?q={}&format=json&limit={}&addressdetails=1",
            self.base_url,
            urlencoding::encode(query),
            limit
        )
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<NominatimPlace>> {
        let body: Value = fetch_json(&self.client, &self.search_url(query, limit)).await?;
        parse_places(body)
    }
}

impl Geocoder for NominatimClient {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Location> {
        let key = format!("geocode:{}", address.trim().to_lowercase());
        match cache::get::<Location>(&key).await {
            Ok(Some(cached)) => {
                debug!("Geocode cache hit for '{}'", address);
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => warn!("Geocode cache lookup failed: {:#}", e),
        }

        let location = first_location(self.search(address, 1).await?, address)?;

        info!(
            "Geocoded '{}' to ({})",
            address,
            location.format_coordinates()
        );

        let ttl = cache::jittered_ttl(self.cache_ttl_hours);
        if let Err(e) = cache::put(&key, location.clone(), ttl).await {
            warn!("Failed to cache geocode result: {:#}", e);
        }
        Ok(location)
    }

    #[instrument(skip(self))]
    async fn search_address(&self, query: &str) -> Result<Vec<String>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let places = self.search(query, AUTOCOMPLETE_LIMIT).await?;
        debug!("Found {} suggestions for '{}'", places.len(), query);
        Ok(places.into_iter().map(|place| place.display_name).collect())
    }
}
