//! Nursery lookup via the OpenStreetMap Overpass API.
//!
//! Queries Overpass for garden centres and plant nurseries around a point,
//! and maps the raw OSM elements into the API's nursery shape. If Overpass
//! is unreachable, errors, or returns nothing, a small synthetic fallback
//! list is returned instead so the endpoint always has something to show.

use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

use crate::api::models::nurseries::NurseryResponse;
use crate::config::NurseriesConfig;

/// Client for the Overpass interpreter endpoint.
#[derive(Debug, Clone)]
pub struct NurseryClient {
    http: Client,
    config: NurseriesConfig,
}

/// Raw Overpass response envelope
#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    lat: f64,
    lon: f64,
    #[serde(default)]
    tags: HashMap<String, String>,
}

impl NurseryClient {
    pub fn new(config: NurseriesConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Find nurseries and garden centres near a point.
    ///
    /// Never fails: Overpass errors and empty result sets both degrade to
    /// [`fallback_nurseries`].
    pub async fn find_nearby(&self, lat: f64, lon: f64) -> Vec<NurseryResponse> {
        match self.query_overpass(lat, lon).await {
            Ok(nurseries) if !nurseries.is_empty() => nurseries,
            Ok(_) => {
                warn!(lat, lon, "Overpass returned no nurseries, using fallback results");
                fallback_nurseries(lat, lon)
            }
            Err(e) => {
                warn!(lat, lon, error = %e, "Overpass query failed, using fallback results");
                fallback_nurseries(lat, lon)
            }
        }
    }

    async fn query_overpass(&self, lat: f64, lon: f64) -> Result<Vec<NurseryResponse>, reqwest::Error> {
        let radius = self.config.radius_meters;
        let query = format!(
            "[out:json];(node[\"shop\"=\"garden_centre\"](around:{radius},{lat},{lon});node[\"amenity\"=\"nursery\"](around:{radius},{lat},{lon}););out;"
        );

        let response = self
            .http
            .post(self.config.overpass_url.clone())
            .body(query)
            .send()
            .await?
            .error_for_status()?
            .json::<OverpassResponse>()
            .await?;

        Ok(response.elements.into_iter().map(NurseryResponse::from).collect())
    }
}

impl From<OverpassElement> for NurseryResponse {
    fn from(element: OverpassElement) -> Self {
        Self {
            name: element
                .tags
                .get("name")
                .cloned()
                .unwrap_or_else(|| "Unnamed Nursery".to_string()),
            latitude: element.lat,
            longitude: element.lon,
            address: element
                .tags
                .get("addr:street")
                .cloned()
                .unwrap_or_else(|| "No address available".to_string()),
        }
    }
}

/// Synthetic results near the query point, used when Overpass has nothing.
pub fn fallback_nurseries(lat: f64, lon: f64) -> Vec<NurseryResponse> {
    vec![
        NurseryResponse {
            name: "Nursery Near You 1".to_string(),
            latitude: lat + 0.001,
            longitude: lon + 0.001,
            address: "Nearby street".to_string(),
        },
        NurseryResponse {
            name: "Nursery Near You 2".to_string(),
            latitude: lat - 0.001,
            longitude: lon - 0.001,
            address: "Nearby street".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server_url: &str) -> NurseriesConfig {
        NurseriesConfig {
            overpass_url: Url::parse(server_url).unwrap(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_maps_overpass_elements() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("garden_centre"))
            .and(body_string_contains("around:1000,51.5,-0.12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "elements": [
                    {
                        "lat": 51.501,
                        "lon": -0.121,
                        "tags": {"name": "Green Thumb", "addr:street": "High Street"}
                    },
                    {"lat": 51.502, "lon": -0.122}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = NurseryClient::new(test_config(&server.uri())).unwrap();
        let nurseries = client.find_nearby(51.5, -0.12).await;

        assert_eq!(nurseries.len(), 2);
        assert_eq!(nurseries[0].name, "Green Thumb");
        assert_eq!(nurseries[0].address, "High Street");
        assert_eq!(nurseries[1].name, "Unnamed Nursery");
        assert_eq!(nurseries[1].address, "No address available");
    }

    #[tokio::test]
    async fn test_empty_results_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"elements": []})))
            .mount(&server)
            .await;

        let client = NurseryClient::new(test_config(&server.uri())).unwrap();
        let nurseries = client.find_nearby(40.0, -74.0).await;

        assert_eq!(nurseries.len(), 2);
        assert_eq!(nurseries[0].name, "Nursery Near You 1");
        assert_eq!(nurseries[0].latitude, 40.001);
        assert_eq!(nurseries[1].longitude, -74.001);
        assert_eq!(nurseries[1].address, "Nearby street");
    }

    #[tokio::test]
    async fn test_server_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = NurseryClient::new(test_config(&server.uri())).unwrap();
        let nurseries = client.find_nearby(40.0, -74.0).await;

        assert_eq!(nurseries.len(), 2);
        assert!(nurseries.iter().all(|n| n.address == "Nearby street"));
    }
}
