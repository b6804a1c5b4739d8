//! The trip request collected from the user

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::TripPlannerError;

/// How the traveller gets from start to end
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TripType {
    #[default]
    Road,
    Flight,
}

/// Everything the user told us about the trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub start_location: String,
    pub end_location: String,
    pub trip_type: TripType,
    pub round_trip: bool,
    /// ISO date, `YYYY-MM-DD`
    pub departure_date: String,
    pub departure_time: Option<String>,
    /// ISO date, `YYYY-MM-DD`
    pub return_date: Option<String>,
    pub return_time: Option<String>,
    pub passengers: u32,
    /// Vehicle fuel economy in miles per gallon
    pub vehicle_mpg: Option<f64>,
    pub fuel_type: Option<String>,
    /// Manual flight estimate in USD
    pub flight_cost: Option<f64>,
    /// Manual accommodation estimate in USD
    pub accommodation_cost: Option<f64>,
    /// Total budget in USD
    pub budget: Option<f64>,
    pub interests: Vec<String>,
    pub dietary_restrictions: Vec<String>,
}

impl Default for TripRequest {
    fn default() -> Self {
        Self {
            start_location: String::new(),
            end_location: String::new(),
            trip_type: TripType::Road,
            round_trip: false,
            departure_date: String::new(),
            departure_time: None,
            return_date: None,
            return_time: None,
            passengers: 1,
            vehicle_mpg: None,
            fuel_type: None,
            flight_cost: None,
            accommodation_cost: None,
            budget: None,
            interests: Vec::new(),
            dietary_restrictions: Vec::new(),
        }
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

impl TripRequest {
    /// Split a comma separated list, trimming entries and dropping blanks
    #[must_use]
    pub fn parse_list(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    /// Parsed departure date, if well formed
    #[must_use]
    pub fn departure(&self) -> Option<NaiveDate> {
        parse_date(&self.departure_date)
    }

    /// Parsed return date, if present and well formed
    #[must_use]
    pub fn return_day(&self) -> Option<NaiveDate> {
        self.return_date.as_deref().and_then(parse_date)
    }

    /// Inclusive number of calendar days between departure and return.
    ///
    /// `None` for one-way trips or when either date does not parse.
    #[must_use]
    pub fn trip_days(&self) -> Option<i64> {
        let departure = self.departure()?;
        let ret = self.return_day()?;
        Some((ret - departure).num_days() + 1)
    }

    /// Check the request before any network call is made
    pub fn validate(&self) -> crate::Result<()> {
        if self.start_location.trim().is_empty() {
            return Err(TripPlannerError::validation("Start location cannot be empty"));
        }
        if self.end_location.trim().is_empty() {
            return Err(TripPlannerError::validation("End location cannot be empty"));
        }
        if self.departure_date.trim().is_empty() {
            return Err(TripPlannerError::validation("Departure date is required"));
        }
        let Some(departure) = self.departure() else {
            return Err(TripPlannerError::validation(format!(
                "Departure date '{}' must use the YYYY-MM-DD format",
                self.departure_date
            )));
        };
        if let Some(raw) = &self.return_date {
            let Some(ret) = parse_date(raw) else {
                return Err(TripPlannerError::validation(format!(
                    "Return date '{raw}' must use the YYYY-MM-DD format"
                )));
            };
            if ret < departure {
                return Err(TripPlannerError::validation(
                    "Return date cannot be before the departure date",
                ));
            }
        }
        if self.passengers < 1 {
            return Err(TripPlannerError::validation("Passengers must be at least 1"));
        }
        if let Some(mpg) = self.vehicle_mpg {
            if !(mpg.is_finite() && mpg > 0.0) {
                return Err(TripPlannerError::validation(
                    "Vehicle MPG must be a positive number",
                ));
            }
        }
        for (label, value) in [
            ("Flight cost", self.flight_cost),
            ("Accommodation cost", self.accommodation_cost),
            ("Budget", self.budget),
        ] {
            if let Some(amount) = value {
                if !(amount.is_finite() && amount >= 0.0) {
                    return Err(TripPlannerError::validation(format!(
                        "{label} cannot be negative"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn valid_request() -> TripRequest {
        TripRequest {
            start_location: "Chicago, IL".to_string(),
            end_location: "St. Louis, MO".to_string(),
            departure_date: "2025-07-04".to_string(),
            ..TripRequest::default()
        }
    }

    #[test]
    fn test_parse_list_trims_and_drops_blanks() {
        assert_eq!(
            TripRequest::parse_list(" mini golf, museums ,, "),
            vec!["mini golf".to_string(), "museums".to_string()]
        );
        assert!(TripRequest::parse_list("").is_empty());
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[rstest]
    #[case::same_day("2025-07-04", Some(1))]
    #[case::weekend("2025-07-06", Some(3))]
    #[case::across_month("2025-08-01", Some(29))]
    #[case::garbage("next friday", None)]
    fn test_trip_days(#[case] return_date: &str, #[case] expected: Option<i64>) {
        let request = TripRequest {
            return_date: Some(return_date.to_string()),
            ..valid_request()
        };
        assert_eq!(request.trip_days(), expected);
    }

    #[test]
    fn test_trip_days_one_way() {
        assert_eq!(valid_request().trip_days(), None);
    }

    #[rstest]
    #[case::empty_start(TripRequest { start_location: "  ".into(), ..valid_request() }, "Start location")]
    #[case::empty_end(TripRequest { end_location: String::new(), ..valid_request() }, "End location")]
    #[case::missing_date(TripRequest { departure_date: String::new(), ..valid_request() }, "Departure date is required")]
    #[case::bad_date(TripRequest { departure_date: "07/04/2025".into(), ..valid_request() }, "YYYY-MM-DD")]
    #[case::return_before(TripRequest { return_date: Some("2025-07-01".into()), ..valid_request() }, "before the departure")]
    #[case::no_passengers(TripRequest { passengers: 0, ..valid_request() }, "Passengers")]
    #[case::zero_mpg(TripRequest { vehicle_mpg: Some(0.0), ..valid_request() }, "MPG")]
    #[case::negative_budget(TripRequest { budget: Some(-1.0), ..valid_request() }, "Budget")]
    fn test_invalid_requests(#[case] request: TripRequest, #[case] expected: &str) {
        let err = request.validate().unwrap_err();
        assert!(matches!(err, TripPlannerError::Validation { .. }));
        assert!(err.to_string().contains(expected), "got: {err}");
    }
}
