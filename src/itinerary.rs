//! Human readable trip summary and itinerary export

use std::fmt::{self, Display};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use tracing::info;

use crate::models::route::format_travel_time;
use crate::models::{TripPlan, TripType};
use crate::services::costs::METERS_TO_MILES;

pub const TEXT_FILE_NAME: &str = "itinerary.txt";
pub const JSON_FILE_NAME: &str = "itinerary.json";
pub const PDF_FILE_NAME: &str = "itinerary.pdf";

// A4 portrait
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const HEADING_SIZE: f32 = 18.0;
const HEADING_LINE_MM: f32 = 10.0;
const BODY_SIZE: f32 = 11.0;
const BODY_LINE_MM: f32 = 6.0;

/// `"1 day"`, `"3 days"`
#[must_use]
pub fn trip_duration_label(days: i64) -> String {
    format!("{days} day{}", if days > 1 { "s" } else { "" })
}

fn date_and_time(date: &str, time: Option<&str>) -> String {
    match time.map(str::trim).filter(|t| !t.is_empty()) {
        Some(time) => format!("{date} {time}"),
        None => date.to_string(),
    }
}

fn money(value: f64) -> String {
    format!("${value:.2}")
}

/// Text rendering of a [`TripPlan`], used both on the terminal and in `itinerary.txt`
pub struct Itinerary<'a> {
    plan: &'a TripPlan,
}

impl<'a> Itinerary<'a> {
    #[must_use]
    pub fn new(plan: &'a TripPlan) -> Self {
        Self { plan }
    }

    fn write_list(f: &mut fmt::Formatter<'_>, title: &str, items: &[String]) -> fmt::Result {
        if items.is_empty() {
            return Ok(());
        }
        writeln!(f)?;
        writeln!(f, "{title}")?;
        for item in items {
            writeln!(f, "  - {item}")?;
        }
        Ok(())
    }
}

impl Display for Itinerary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.plan;
        let trip = &plan.request;

        writeln!(f, "Trip Itinerary")?;
        writeln!(f, "==============")?;

        if let Some(seconds) = plan.route_duration_seconds {
            writeln!(f, "Travel Time: {}", format_travel_time(seconds))?;
        }
        if let Some(meters) = plan.route_distance_meters {
            writeln!(
                f,
                "Driving Distance: {:.1} mi ({:.1} km)",
                meters * METERS_TO_MILES,
                meters / 1000.0
            )?;
        }
        if !plan.has_route() && trip.trip_type == TripType::Road {
            writeln!(
                f,
                "No driving route found ({:.0} km straight line).",
                plan.straight_line_km()
            )?;
        }
        let days = trip.trip_days();
        if let Some(days) = days {
            writeln!(f, "Trip Duration: {}", trip_duration_label(days))?;
        }

        writeln!(f)?;
        writeln!(f, "From: {}", trip.start_location)?;
        writeln!(f, "To: {}", trip.end_location)?;
        writeln!(
            f,
            "Departure: {}",
            date_and_time(&trip.departure_date, trip.departure_time.as_deref())
        )?;
        if let Some(return_date) = &trip.return_date {
            writeln!(
                f,
                "Return: {}",
                date_and_time(return_date, trip.return_time.as_deref())
            )?;
        }
        writeln!(f, "Passengers: {}", trip.passengers)?;
        match trip.trip_type {
            TripType::Road => {
                let round = if trip.round_trip { " (round trip)" } else { "" };
                writeln!(f, "Trip Type: Road trip{round}")?;
                if let Some(mpg) = trip.vehicle_mpg {
                    match &trip.fuel_type {
                        Some(fuel) => writeln!(f, "Vehicle: {mpg} mpg, {fuel}")?,
                        None => writeln!(f, "Vehicle: {mpg} mpg")?,
                    }
                }
            }
            TripType::Flight => {
                let round = if trip.round_trip { " (round trip)" } else { "" };
                writeln!(f, "Trip Type: Flight{round}")?;
            }
        }

        if trip.trip_type == TripType::Road && days.is_some_and(|d| d > 1) {
            writeln!(f)?;
            writeln!(f, "Lodging Stops")?;
            writeln!(f, "  Consider booking hotels or campgrounds along your route.")?;
        }

        writeln!(f)?;
        writeln!(f, "Cost Summary")?;
        let lines = plan.costs.lines();
        for (label, value) in &lines {
            writeln!(f, "  {label}: {}", money(*value))?;
        }
        if lines.len() > 1 {
            writeln!(f, "  Total: {}", money(plan.costs.total()))?;
        }
        if let Some(budget) = trip.budget {
            writeln!(f)?;
            writeln!(f, "Budget: {}", money(budget))?;
            let remaining = plan.costs.budget_remaining(budget);
            if remaining >= 0.0 {
                writeln!(f, "  Remaining: {}", money(remaining))?;
            } else {
                writeln!(f, "  Over budget by {}", money(-remaining))?;
            }
        }

        Self::write_list(f, "Interests", &trip.interests)?;
        Self::write_list(f, "Dietary Restrictions", &trip.dietary_restrictions)?;

        let attractions: Vec<String> = plan
            .pois
            .iter()
            .map(|poi| match poi.distance_to_route_km(&plan.waypoints) {
                Some(km) => format!("{} ({km:.1} km from route)", poi.name),
                None => poi.name.clone(),
            })
            .collect();
        Self::write_list(f, "Attractions Along the Route", &attractions)?;
        Self::write_list(f, "Suggested Events & Attractions", &plan.events)?;

        Ok(())
    }
}

fn pdf_error(e: printpdf::Error) -> anyhow::Error {
    anyhow!("Failed to render itinerary PDF: {e:?}")
}

/// Render the itinerary text onto A4 pages, one PDF line per text line.
///
/// The title is set in bold; the underline rule of the text rendering is dropped.
pub fn render_pdf(plan: &TripPlan) -> Result<Vec<u8>> {
    let text = Itinerary::new(plan).to_string();
    let (doc, page, layer) = PdfDocument::new(
        "Trip Itinerary",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Itinerary",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;

    let mut layer = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
    let mut lines = text.lines().filter(|line| !line.starts_with('='));

    if let Some(title) = lines.next() {
        layer.use_text(title, HEADING_SIZE, Mm(MARGIN_MM), Mm(y), &bold);
        y -= HEADING_LINE_MM;
    }
    for line in lines {
        if y < MARGIN_MM {
            let (page, next) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Itinerary");
            layer = doc.get_page(page).get_layer(next);
            y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        if !line.trim().is_empty() {
            layer.use_text(line, BODY_SIZE, Mm(MARGIN_MM), Mm(y), &regular);
        }
        y -= BODY_LINE_MM;
    }

    doc.save_to_bytes().map_err(pdf_error)
}

/// Paths written by [`export`]
#[derive(Debug)]
pub struct ExportedFiles {
    pub pdf: PathBuf,
    pub text: PathBuf,
    pub json: PathBuf,
}

/// Write the itinerary as PDF, text and JSON into `directory`
pub fn export(plan: &TripPlan, directory: &Path) -> Result<ExportedFiles> {
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create output directory {}", directory.display()))?;

    let pdf = directory.join(PDF_FILE_NAME);
    fs::write(&pdf, render_pdf(plan)?)
        .with_context(|| format!("Failed to write {}", pdf.display()))?;

    let text = directory.join(TEXT_FILE_NAME);
    fs::write(&text, Itinerary::new(plan).to_string())
        .with_context(|| format!("Failed to write {}", text.display()))?;

    let json = directory.join(JSON_FILE_NAME);
    let body = serde_json::to_string_pretty(plan).with_context(|| "Failed to serialize plan")?;
    fs::write(&json, body).with_context(|| format!("Failed to write {}", json.display()))?;

    info!("Itinerary written to {}", pdf.display());
    Ok(ExportedFiles { pdf, text, json })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CostDetails, Location, Poi, TripRequest};
    use chrono::Utc;

    fn road_plan() -> TripPlan {
        TripPlan {
            request: TripRequest {
                start_location: "Chicago, IL".to_string(),
                end_location: "St. Louis, MO".to_string(),
                round_trip: true,
                departure_date: "2025-07-04".to_string(),
                departure_time: Some("08:30".to_string()),
                return_date: Some("2025-07-06".to_string()),
                passengers: 2,
                vehicle_mpg: Some(25.0),
                budget: Some(100.0),
                interests: vec!["mini golf".to_string()],
                ..TripRequest::default()
            },
            start: Location::new(41.8756, -87.6244, "Chicago".to_string()),
            end: Location::new(38.627, -90.1994, "St. Louis".to_string()),
            waypoints: vec![(41.8756, -87.6244), (40.0, -89.0), (38.627, -90.1994)],
            route_duration_seconds: Some(17_020.0),
            route_distance_meters: Some(478_512.0),
            pois: vec![Poi::new("Par-King", (40.0, -89.0))],
            costs: CostDetails {
                fuel_cost: Some(46.79),
                accommodation_cost: Some(0.0),
                ..CostDetails::default()
            },
            events: vec!["Summer Music Festival".to_string()],
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_trip_duration_label() {
        assert_eq!(trip_duration_label(1), "1 day");
        assert_eq!(trip_duration_label(3), "3 days");
    }

    #[test]
    fn test_road_trip_summary() {
        let text = Itinerary::new(&road_plan()).to_string();
        assert!(text.contains("Travel Time: 4h 43m"));
        assert!(text.contains("Trip Duration: 3 days"));
        assert!(text.contains("Departure: 2025-07-04 08:30\n"));
        assert!(text.contains("Return: 2025-07-06\n"));
        assert!(text.contains("Passengers: 2"));
        assert!(text.contains("Lodging Stops"));
        assert!(text.contains("  Fuel: $46.79"));
        assert!(text.contains("  Accommodation: $0.00"));
        assert!(text.contains("  Remaining: $53.21"));
        assert!(text.contains("  - Par-King (0.0 km from route)"));
        assert!(text.contains("  - Summer Music Festival"));
        assert!(!text.contains("Flight:"));
        assert!(!text.contains("Dietary Restrictions"));
    }

    #[test]
    fn test_failed_route_omits_travel_time() {
        let mut plan = road_plan();
        plan.waypoints.clear();
        plan.route_duration_seconds = None;
        plan.route_distance_meters = None;
        plan.request.return_date = None;

        let text = Itinerary::new(&plan).to_string();
        assert!(!text.contains("Travel Time"));
        assert!(text.contains("No driving route found"));
        assert!(!text.contains("Trip Duration"));
        assert!(!text.contains("Lodging Stops"));
        assert!(text.contains("  - Par-King\n"));
    }

    #[test]
    fn test_over_budget_flight() {
        let mut plan = road_plan();
        plan.request.trip_type = crate::models::TripType::Flight;
        plan.costs = CostDetails {
            flight_cost: Some(320.0),
            accommodation_cost: Some(150.0),
            ..CostDetails::default()
        };
        plan.request.budget = Some(400.0);

        let text = Itinerary::new(&plan).to_string();
        assert!(text.contains("Trip Type: Flight (round trip)"));
        assert!(text.contains("  Total: $470.00"));
        assert!(text.contains("  Over budget by $70.00"));
        assert!(!text.contains("Lodging Stops"));
    }

    #[test]
    fn test_export_writes_pdf_text_and_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let files = export(&road_plan(), &dir.path().join("out")).unwrap();

        assert_eq!(files.pdf.file_name().unwrap(), "itinerary.pdf");
        let pdf = fs::read(&files.pdf).unwrap();
        assert!(pdf.starts_with(b"%PDF"));

        let text = fs::read_to_string(&files.text).unwrap();
        assert!(text.starts_with("Trip Itinerary"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&files.json).unwrap()).unwrap();
        assert_eq!(json["request"]["trip_type"], "road");
        assert_eq!(json["pois"][0]["name"], "Par-King");
    }

    #[test]
    fn test_long_itinerary_paginates() {
        let mut plan = road_plan();
        plan.pois = (0..120)
            .map(|i| Poi::new(format!("Course {i}"), (40.0, -89.0)))
            .collect();

        let short = render_pdf(&road_plan()).unwrap();
        let long = render_pdf(&plan).unwrap();
        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > short.len());
    }
}
