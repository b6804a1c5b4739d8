//! Overpass search for tagged features along a route

use std::collections::HashMap;

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{error, info, instrument};

use super::PoiSearch;
use crate::TripPlannerError;
use crate::config::PoiConfig;
use crate::models::Poi;
use crate::models::poi::dedupe_pois;

/// OSM keys a category value is matched against
const TAG_KEYS: [&str; 2] = ["leisure", "sport"];
const ELEMENT_TYPES: [&str; 3] = ["node", "way", "relation"];

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    lat: Option<f64>,
    lon: Option<f64>,
    /// Present for ways and relations with `out center`
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

impl OverpassElement {
    fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon, &self.center) {
            (Some(lat), Some(lon), _) => Some((lat, lon)),
            (_, _, Some(center)) => Some((center.lat, center.lon)),
            _ => None,
        }
    }

    fn into_poi(self, category: &str) -> Option<Poi> {
        let coordinates = self.coordinates()?;
        let name = self
            .tags
            .get("name")
            .filter(|name| !name.is_empty())
            .cloned()
            .unwrap_or_else(|| category.to_string());
        Some(Poi::new(name, coordinates))
    }
}

/// Evenly spaced route points used as search centers
#[must_use]
pub fn sample_route(route: &[(f64, f64)], max_samples: usize) -> Vec<(f64, f64)> {
    if route.is_empty() || max_samples == 0 {
        return Vec::new();
    }
    let step = (route.len() / max_samples).max(1);
    route
        .iter()
        .step_by(step)
        .take(max_samples)
        .copied()
        .collect()
}

/// Overpass QL union of `around` searches for `category` at every sample
#[must_use]
pub fn build_query(
    category: &str,
    samples: &[(f64, f64)],
    radius_m: u32,
    timeout_seconds: u32,
) -> String {
    let clauses: Vec<String> = samples
        .iter()
        .flat_map(|(lat, lon)| {
            TAG_KEYS.iter().flat_map(move |key| {
                ELEMENT_TYPES.iter().map(move |element| {
                    format!(r#"{element}["{key}"="{category}"](around:{radius_m},{lat},{lon});"#)
                })
            })
        })
        .collect();

    format!(
        "[out:json][timeout:{timeout_seconds}];\n(\n  {}\n);\nout center;",
        clauses.join("\n  ")
    )
}

fn parse_elements(response: OverpassResponse, category: &str) -> Vec<Poi> {
    let pois = response
        .elements
        .into_iter()
        .filter_map(|element| element.into_poi(category))
        .collect();
    dedupe_pois(pois)
}

pub struct OverpassClient {
    client: ClientWithMiddleware,
    endpoint: String,
    config: PoiConfig,
}

impl OverpassClient {
    pub fn new(client: ClientWithMiddleware, endpoint: impl Into<String>, config: PoiConfig) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            config,
        }
    }

    async fn query(&self, query: &str) -> Result<OverpassResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(format!("data={}", urlencoding::encode(query)))
            .send()
            .await
            .with_context(|| "Overpass request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(TripPlannerError::api(format!("Overpass returned {status}")).into());
        }

        response
            .json()
            .await
            .with_context(|| "Failed to parse Overpass response")
    }
}

impl PoiSearch for OverpassClient {
    #[instrument(skip(self, route), fields(route_points = route.len()))]
    async fn search(&self, category: &str, route: &[(f64, f64)]) -> Vec<Poi> {
        let samples = sample_route(route, self.config.max_samples);
        if samples.is_empty() {
            return Vec::new();
        }

        let query = build_query(
            category,
            &samples,
            self.config.search_radius_m,
            self.config.overpass_timeout_seconds,
        );

        match self.query(&query).await {
            Ok(response) => {
                info!(
                    "POI search fetched {} elements for category {}",
                    response.elements.len(),
                    category
                );
                parse_elements(response, category)
            }
            Err(e) => {
                error!("POI search error for category {}: {:#}", category, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_server;
    use rstest::rstest;
    use serde_json::json;

    fn client_for(endpoint: String) -> OverpassClient {
        OverpassClient::new(
            reqwest_middleware::ClientBuilder::new(reqwest::Client::new()).build(),
            endpoint,
            PoiConfig::default(),
        )
    }

    fn route_of(len: usize) -> Vec<(f64, f64)> {
        (0..len).map(|i| (i as f64, -(i as f64))).collect()
    }

    #[rstest]
    #[case::empty(0, vec![])]
    #[case::shorter_than_samples(3, vec![0, 1, 2])]
    #[case::exact(5, vec![0, 1, 2, 3, 4])]
    #[case::even_spacing(12, vec![0, 2, 4, 6, 8])]
    #[case::long(103, vec![0, 20, 40, 60, 80])]
    fn test_sample_route(#[case] len: usize, #[case] expected_indices: Vec<usize>) {
        let route = route_of(len);
        let expected: Vec<(f64, f64)> = expected_indices.iter().map(|&i| route[i]).collect();
        assert_eq!(sample_route(&route, 5), expected);
    }

    #[test]
    fn test_build_query_covers_every_tag_and_element_type() {
        let query = build_query("miniature_golf", &[(41.5, -87.25)], 5000, 25);
        assert!(query.starts_with("[out:json][timeout:25];"));
        assert!(query.trim_end().ends_with("out center;"));
        assert!(query.contains(r#"node["leisure"="miniature_golf"](around:5000,41.5,-87.25);"#));
        assert!(query.contains(r#"relation["sport"="miniature_golf"](around:5000,41.5,-87.25);"#));
        assert_eq!(query.matches("(around:").count(), 6);
    }

    #[test]
    fn test_parse_elements_uses_center_and_falls_back_to_category() {
        let response: OverpassResponse = serde_json::from_value(json!({
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 41.1, "lon": -87.1, "tags": {"name": "Par-King", "leisure": "miniature_golf"}},
                {"type": "way", "id": 2, "center": {"lat": 41.2, "lon": -87.2}, "tags": {"leisure": "miniature_golf"}},
                {"type": "node", "id": 3, "lat": 41.1, "lon": -87.1, "tags": {"name": "Par-King"}},
                {"type": "relation", "id": 4, "tags": {"name": "No geometry"}}
            ]
        }))
        .unwrap();

        let pois = parse_elements(response, "miniature_golf");
        assert_eq!(
            pois,
            vec![
                Poi::new("Par-King", (41.1, -87.1)),
                Poi::new("miniature_golf", (41.2, -87.2)),
            ]
        );
    }

    #[tokio::test]
    async fn test_search_with_empty_route_returns_nothing() {
        let client = OverpassClient::new(
            reqwest_middleware::ClientBuilder::new(reqwest::Client::new()).build(),
            "http://127.0.0.1:9/api/interpreter",
            PoiConfig::default(),
        );
        assert!(client.search("miniature_golf", &[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_degrades_to_empty() {
        // Nothing listens on the discard port, so the request fails fast.
        let client = OverpassClient::new(
            reqwest_middleware::ClientBuilder::new(reqwest::Client::new()).build(),
            "http://127.0.0.1:9/api/interpreter",
            PoiConfig::default(),
        );
        let pois = client.search("miniature_golf", &route_of(10)).await;
        assert!(pois.is_empty());
    }

    #[tokio::test]
    async fn test_search_posts_form_encoded_query() {
        let body = json!({
            "elements": [
                {"type": "node", "id": 7, "lat": 41.3, "lon": -87.6, "tags": {"name": "Putt Putt"}}
            ]
        })
        .to_string();
        let (base_url, server) = test_server::respond_once("200 OK", &body).await;
        let client = client_for(format!("{base_url}/api/interpreter"));

        let pois = client.search("miniature_golf", &[(41.5, -87.25)]).await;
        let request = server.await.unwrap();

        assert_eq!(pois, vec![Poi::new("Putt Putt", (41.3, -87.6))]);
        assert!(request.starts_with("POST /api/interpreter HTTP/1.1"));
        assert!(
            request
                .to_lowercase()
                .contains("content-type: application/x-www-form-urlencoded")
        );
        let query = build_query("miniature_golf", &[(41.5, -87.25)], 5000, 25);
        let expected_body = format!("data={}", urlencoding::encode(&query));
        assert!(request.ends_with(&expected_body));
    }

    #[tokio::test]
    async fn test_search_error_status_degrades_to_empty() {
        let (base_url, server) =
            test_server::respond_once("503 Service Unavailable", r#"{"remark":"busy"}"#).await;
        let client = client_for(format!("{base_url}/api/interpreter"));

        let pois = client.search("miniature_golf", &route_of(10)).await;
        server.await.unwrap();
        assert!(pois.is_empty());
    }

    #[tokio::test]
    async fn test_query_error_status_is_api_error() {
        let (base_url, server) = test_server::respond_once("429 Too Many Requests", "{}").await;
        let client = client_for(format!("{base_url}/api/interpreter"));

        let err = client.query("[out:json];node(1);out;").await.unwrap_err();
        server.await.unwrap();
        assert!(matches!(
            err.downcast_ref::<TripPlannerError>(),
            Some(TripPlannerError::Api { .. })
        ));
    }
}
