//! Trip planning orchestration
//!
//! [`TripPlanner::plan`] chains the external lookups in a fixed order:
//! geocode start and end, fetch the driving route, search points of interest
//! for the traveller's interests, estimate costs and suggest events.
//!
//! Geocoding failures abort the plan. A failed route lookup does not: the
//! plan continues with no waypoints and no travel time, POI search is skipped
//! for lack of a route, and fuel cost falls back to a bare distance query.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::config::TripPlannerConfig;
use crate::models::poi::dedupe_pois;
use crate::models::{CostDetails, Location, Poi, RouteData, TripPlan, TripRequest, TripType};
use crate::services::{
    Geocoder, NominatimClient, OsrmClient, OverpassClient, PoiSearch, RouteProvider,
    build_http_client, costs, events,
};

/// Autocomplete only kicks in once the user typed this many characters
pub const MIN_AUTOCOMPLETE_CHARS: usize = 3;

/// Interest keyword (lowercase, no spaces or hyphens) to OSM tag value.
/// Checked in order; a matched keyword is consumed, so `minigolf` must precede `golf`.
const INTEREST_CATEGORIES: &[(&str, &str)] = &[
    ("minigolf", "miniature_golf"),
    ("bowling", "bowling_alley"),
    ("climbing", "climbing"),
    ("golf", "golf_course"),
];

/// OSM categories to search for, every recognised interest once
#[must_use]
pub fn poi_categories(interests: &[String]) -> Vec<&'static str> {
    let mut categories = Vec::new();
    for interest in interests {
        let mut remaining: String = interest
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        for (keyword, category) in INTEREST_CATEGORIES {
            if !remaining.contains(keyword) {
                continue;
            }
            remaining = remaining.replace(keyword, "|");
            if !categories.contains(category) {
                categories.push(*category);
            }
        }
    }
    categories
}

pub struct TripPlanner<G, R, P> {
    geocoder: G,
    router: R,
    poi_search: P,
    fuel_price_per_gallon: f64,
}

impl TripPlanner<NominatimClient, OsrmClient, OverpassClient> {
    /// Planner backed by the configured OpenStreetMap services
    pub fn from_config(config: &TripPlannerConfig) -> Result<Self> {
        let client = build_http_client(&config.services)?;
        let ttl = config.cache.ttl_hours;
        Ok(Self::new(
            NominatimClient::new(client.clone(), &config.services.nominatim_url, ttl),
            OsrmClient::new(client.clone(), &config.services.osrm_url, ttl),
            OverpassClient::new(client, &config.services.overpass_url, config.poi.clone()),
            config.costs.fuel_price_per_gallon,
        ))
    }
}

impl<G: Geocoder, R: RouteProvider, P: PoiSearch> TripPlanner<G, R, P> {
    pub fn new(geocoder: G, router: R, poi_search: P, fuel_price_per_gallon: f64) -> Self {
        Self {
            geocoder,
            router,
            poi_search,
            fuel_price_per_gallon,
        }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn poi_search(&self) -> &P {
        &self.poi_search
    }

    /// Address suggestions for a partially typed location.
    /// The length check counts the raw input, whitespace included.
    pub async fn suggest(&self, query: &str) -> Result<Vec<String>> {
        if query.chars().count() < MIN_AUTOCOMPLETE_CHARS {
            return Ok(Vec::new());
        }
        self.geocoder.search_address(query).await
    }

    #[instrument(skip(self, request), fields(from = %request.start_location, to = %request.end_location))]
    pub async fn plan(&self, request: TripRequest) -> Result<TripPlan> {
        request.validate()?;

        let start = self
            .geocoder
            .geocode(&request.start_location)
            .await
            .with_context(|| format!("Failed to resolve start '{}'", request.start_location))?;
        let end = self
            .geocoder
            .geocode(&request.end_location)
            .await
            .with_context(|| format!("Failed to resolve destination '{}'", request.end_location))?;

        let route = self.fetch_route(&start, &end).await;
        let waypoints = route
            .as_ref()
            .map(|route| route.coordinates.clone())
            .unwrap_or_default();

        let pois = self.find_pois(&request.interests, &waypoints).await;
        let costs = self.estimate_costs(&request, &start, &end, route.as_ref()).await?;
        let events = events::suggest_events(&request);

        info!(
            "Planned trip with {} waypoints, {} POIs and {} suggestions",
            waypoints.len(),
            pois.len(),
            events.len()
        );

        Ok(TripPlan {
            request,
            start,
            end,
            waypoints,
            route_duration_seconds: route.as_ref().map(|r| r.duration_seconds),
            route_distance_meters: route.as_ref().map(|r| r.distance_meters),
            pois,
            costs,
            events,
            generated_at: Utc::now(),
        })
    }

    async fn fetch_route(&self, start: &Location, end: &Location) -> Option<RouteData> {
        match self.router.route(start, end).await {
            Ok(route) => Some(route),
            Err(e) => {
                warn!("Error fetching route: {:#}", e);
                None
            }
        }
    }

    async fn find_pois(&self, interests: &[String], waypoints: &[(f64, f64)]) -> Vec<Poi> {
        let categories = poi_categories(interests);
        if categories.is_empty() {
            return Vec::new();
        }
        if waypoints.is_empty() {
            debug!("No route to search along, skipping POI search");
            return Vec::new();
        }

        let mut found = Vec::new();
        for category in categories {
            found.extend(self.poi_search.search(category, waypoints).await);
        }
        dedupe_pois(found)
    }

    async fn estimate_costs(
        &self,
        request: &TripRequest,
        start: &Location,
        end: &Location,
        route: Option<&RouteData>,
    ) -> Result<CostDetails> {
        let accommodation_cost = Some(costs::accommodation_cost(request));

        match request.trip_type {
            TripType::Road => {
                let distance = match (route, request.vehicle_mpg) {
                    (_, None) => None,
                    (Some(route), Some(_)) => Some(route.distance_meters),
                    (None, Some(_)) => self
                        .router
                        .driving_distance(start, end)
                        .await
                        .with_context(|| "Failed to fetch driving distance for fuel estimate")?,
                };
                let fuel_cost =
                    costs::fuel_cost(distance, request.vehicle_mpg, self.fuel_price_per_gallon);
                Ok(CostDetails {
                    fuel_cost: Some(fuel_cost),
                    accommodation_cost,
                    ..CostDetails::default()
                })
            }
            TripType::Flight => Ok(CostDetails {
                flight_cost: Some(costs::flight_cost(request)),
                accommodation_cost,
                ..CostDetails::default()
            }),
        }
    }
}

/// Holds the trip currently on display.
///
/// Starts out in the form state with no plan. A successful [`submit`](Self::submit)
/// moves it to the planned state; a failed one leaves it in the form state with no
/// partial results. [`reset`](Self::reset) returns to the form.
#[derive(Debug, Default)]
pub struct PlannerSession {
    plan: Option<Box<TripPlan>>,
}

impl PlannerSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submit<G: Geocoder, R: RouteProvider, P: PoiSearch>(
        &mut self,
        planner: &TripPlanner<G, R, P>,
        request: TripRequest,
    ) -> Result<&TripPlan> {
        self.plan = None;
        let plan = planner.plan(request).await?;
        let plan = self.plan.insert(Box::new(plan));
        Ok(&**plan)
    }

    /// Discard the current plan and go back to the form
    pub fn reset(&mut self) {
        self.plan = None;
    }

    #[must_use]
    pub fn plan(&self) -> Option<&TripPlan> {
        self.plan.as_deref()
    }

    #[must_use]
    pub fn is_planned(&self) -> bool {
        self.plan.is_some()
    }
}
