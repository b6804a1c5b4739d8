//! Seasonal event and attraction suggestions

use chrono::Datelike;

use crate::models::TripRequest;

/// Suggestions keyed on the departure month, with generic fallbacks
#[must_use]
pub fn suggest_events(trip: &TripRequest) -> Vec<String> {
    let Some(departure) = trip.departure() else {
        return vec![
            "Visit Main Square".to_string(),
            "Check out local walking tour".to_string(),
        ];
    };

    let mut suggestions = Vec::new();
    match departure.month() {
        6..=8 => suggestions.push("Summer Music Festival".to_string()),
        12 | 1 => suggestions.push("Holiday Market".to_string()),
        _ => {}
    }
    suggestions.push("Visit the Local Museum".to_string());
    suggestions.push("Try the Best-rated Cafe".to_string());
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn departing(date: &str) -> TripRequest {
        TripRequest {
            departure_date: date.to_string(),
            ..TripRequest::default()
        }
    }

    #[rstest]
    #[case::early_summer("2025-06-01", Some("Summer Music Festival"))]
    #[case::late_summer("2025-08-31", Some("Summer Music Festival"))]
    #[case::december("2025-12-20", Some("Holiday Market"))]
    #[case::january("2026-01-03", Some("Holiday Market"))]
    #[case::spring("2025-04-10", None)]
    #[case::september("2025-09-01", None)]
    fn test_seasonal_suggestions(#[case] date: &str, #[case] seasonal: Option<&str>) {
        let events = suggest_events(&departing(date));
        let mut expected: Vec<&str> = seasonal.into_iter().collect();
        expected.extend(["Visit the Local Museum", "Try the Best-rated Cafe"]);
        assert_eq!(events, expected);
    }

    #[test]
    fn test_unparseable_date_falls_back() {
        let events = suggest_events(&departing("sometime soon"));
        assert_eq!(events, vec!["Visit Main Square", "Check out local walking tour"]);
    }
}
