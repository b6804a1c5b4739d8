use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::location::haversine_km;

/// A point of interest found near the route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub name: String,
    /// `(lat, lon)`
    pub coordinates: (f64, f64),
}

impl Poi {
    #[must_use]
    pub fn new(name: impl Into<String>, coordinates: (f64, f64)) -> Self {
        Self {
            name: name.into(),
            coordinates,
        }
    }

    /// Identity used for deduplication: name plus coordinates at 5 decimals (~1 m)
    #[must_use]
    pub fn dedupe_key(&self) -> String {
        format!(
            "{}:{:.5},{:.5}",
            self.name, self.coordinates.0, self.coordinates.1
        )
    }

    /// Distance to the closest route point in kilometers, `None` for an empty route
    #[must_use]
    pub fn distance_to_route_km(&self, route: &[(f64, f64)]) -> Option<f64> {
        route
            .iter()
            .map(|point| haversine_km(self.coordinates, *point))
            .min_by(f64::total_cmp)
    }
}

/// Drop repeated POIs, keeping the first occurrence and the original order
#[must_use]
pub fn dedupe_pois(pois: Vec<Poi>) -> Vec<Poi> {
    let mut seen = HashSet::new();
    pois.into_iter()
        .filter(|poi| seen.insert(poi.dedupe_key()))
        .collect()
}
