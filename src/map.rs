//! Interactive route map as a standalone Leaflet page

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::models::TripPlan;

pub const MAP_FILE_NAME: &str = "trip_map.html";

const TEMPLATE: &str = include_str!("map_template.html");
const DATA_PLACEHOLDER: &str = "__TRIP_DATA__";
const DEFAULT_ZOOM: u8 = 6;

#[derive(Debug, Serialize)]
struct MapMarker<'a> {
    name: &'a str,
    coords: [f64; 2],
}

#[derive(Debug, Serialize)]
struct MapData<'a> {
    title: String,
    center: [f64; 2],
    zoom: u8,
    start: Option<[f64; 2]>,
    end: Option<[f64; 2]>,
    /// Start, route geometry and end; empty unless the route has more than one point
    path: Vec<[f64; 2]>,
    pois: Vec<MapMarker<'a>>,
}

impl<'a> MapData<'a> {
    fn from_plan(plan: &'a TripPlan) -> Self {
        let start = [plan.start.latitude, plan.start.longitude];
        let end = [plan.end.latitude, plan.end.longitude];

        let path = if plan.waypoints.len() > 1 {
            std::iter::once(start)
                .chain(plan.waypoints.iter().map(|&(lat, lon)| [lat, lon]))
                .chain(std::iter::once(end))
                .collect()
        } else {
            Vec::new()
        };

        Self {
            title: format!(
                "{} to {}",
                plan.request.start_location, plan.request.end_location
            ),
            center: start,
            zoom: DEFAULT_ZOOM,
            start: Some(start),
            end: Some(end),
            path,
            pois: plan
                .pois
                .iter()
                .map(|poi| MapMarker {
                    name: &poi.name,
                    coords: [poi.coordinates.0, poi.coordinates.1],
                })
                .collect(),
        }
    }
}

/// Render the map page for `plan`
pub fn render_html(plan: &TripPlan) -> Result<String> {
    let data = serde_json::to_string(&MapData::from_plan(plan))
        .with_context(|| "Failed to serialize map data")?
        // keep place names from closing the inline script
        .replace("</", "<\\/");
    Ok(TEMPLATE.replace(DATA_PLACEHOLDER, &data))
}

/// Write the map page into `directory` and return its path
pub fn write_map(plan: &TripPlan, directory: &Path) -> Result<PathBuf> {
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create output directory {}", directory.display()))?;
    let path = directory.join(MAP_FILE_NAME);
    fs::write(&path, render_html(plan)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Map written to {}", path.display());
    Ok(path)
}
