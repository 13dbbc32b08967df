use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::place::{LatLng, RawGeocodeResult, RawSearchSelection};

use super::{GeolocationError, PlaceSearch, ProviderError, ReverseGeocoder};

const API_BASE: &str = "https://maps.googleapis.com/maps/api";

/// Google Maps web services: Geocoding and Places text search.
#[derive(Clone)]
pub struct GoogleMaps {
    api_key: String,
    base_url: String,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<RawGeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<RawSearchSelection>,
    error_message: Option<String>,
}

impl GoogleMaps {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, API_BASE)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::Agent::new_with_defaults(),
        }
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{path}", self.base_url);
        log::trace!("GET {url} {params:?}");

        let mut request = self.agent.get(url.as_str());
        for (key, value) in params {
            request = request.query(*key, *value);
        }
        request
            .query("key", &self.api_key)
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => ProviderError::Status(format!("HTTP {code}")),
                other => ProviderError::Http(other.to_string()),
            })?
            .body_mut()
            .read_json::<T>()
            .map_err(|e| ProviderError::Malformed(e.to_string()))
    }
}

impl ReverseGeocoder for GoogleMaps {
    fn reverse(&self, at: LatLng) -> Result<RawGeocodeResult, GeolocationError> {
        let latlng = at.to_string();
        let response: GeocodeResponse =
            self.get_json("geocode/json", &[("latlng", latlng.as_str())])?;
        first_geocode_result(response)
    }
}

impl PlaceSearch for GoogleMaps {
    fn search(&self, query: &str) -> Result<Vec<RawSearchSelection>, ProviderError> {
        let response: TextSearchResponse =
            self.get_json("place/textsearch/json", &[("query", query)])?;
        search_candidates(response)
    }
}

fn status_error(status: String, message: Option<String>) -> ProviderError {
    match message {
        Some(message) => ProviderError::Status(format!("{status} ({message})")),
        None => ProviderError::Status(status),
    }
}

fn first_geocode_result(response: GeocodeResponse) -> Result<RawGeocodeResult, GeolocationError> {
    match response.status.as_str() {
        "OK" => response
            .results
            .into_iter()
            .next()
            .ok_or(GeolocationError::NoResult),
        "ZERO_RESULTS" => Err(GeolocationError::NoResult),
        _ => Err(status_error(response.status, response.error_message).into()),
    }
}

fn search_candidates(
    response: TextSearchResponse,
) -> Result<Vec<RawSearchSelection>, ProviderError> {
    match response.status.as_str() {
        "OK" => Ok(response.results),
        "ZERO_RESULTS" => Ok(Vec::new()),
        _ => Err(status_error(response.status, response.error_message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place::normalize;
    use crate::submit::tests::one_shot_server;

    const GEOCODE_OK: &str = r#"{
        "results": [
            {
                "formatted_address": "1 Main St, Brooklyn, NY 11201, USA",
                "geometry": {
                    "location": {"lat": 40.7033, "lng": -73.9903},
                    "location_type": "ROOFTOP",
                    "viewport": {
                        "northeast": {"lat": 40.7046, "lng": -73.9889},
                        "southwest": {"lat": 40.7019, "lng": -73.9916}
                    }
                },
                "place_id": "ChIJ1Main",
                "types": ["street_address"]
            },
            {
                "formatted_address": "Brooklyn, NY, USA",
                "geometry": {"location": {"lat": 40.6782, "lng": -73.9442}},
                "place_id": "ChIJBrooklyn"
            }
        ],
        "status": "OK"
    }"#;

    const SEARCH_OK: &str = r#"{
        "html_attributions": [],
        "results": [
            {
                "formatted_address": "New York, NY, USA",
                "geometry": {
                    "location": {"lat": 40.7825547, "lng": -73.9655834},
                    "viewport": {
                        "northeast": {"lat": 40.8005, "lng": -73.9497},
                        "southwest": {"lat": 40.7644, "lng": -73.9816}
                    }
                },
                "name": "Central Park",
                "place_id": "ChIJ4zGFAZpYwokRGUGph3Mf37k",
                "types": ["park", "tourist_attraction"]
            }
        ],
        "status": "OK"
    }"#;

    #[test]
    fn test_first_geocode_result_is_used() {
        let response: GeocodeResponse = serde_json::from_str(GEOCODE_OK).unwrap();
        let raw = first_geocode_result(response).unwrap();
        let record = normalize(raw).unwrap();
        assert_eq!(record.formatted_address, "1 Main St, Brooklyn, NY 11201, USA");
        assert_eq!(record.location, LatLng::new(40.7033, -73.9903));
        // Reverse-geocoded places never carry a viewport.
        assert!(record.viewport_bounds.is_none());
    }

    #[test]
    fn test_geocode_zero_results() {
        let response: GeocodeResponse =
            serde_json::from_str(r#"{"results": [], "status": "ZERO_RESULTS"}"#).unwrap();
        assert_eq!(
            first_geocode_result(response).unwrap_err(),
            GeolocationError::NoResult
        );
    }

    #[test]
    fn test_geocode_denied_includes_message() {
        let response: GeocodeResponse = serde_json::from_str(
            r#"{"error_message": "The provided API key is invalid.", "results": [], "status": "REQUEST_DENIED"}"#,
        )
        .unwrap();
        let err = first_geocode_result(response).unwrap_err();
        assert_eq!(
            err,
            GeolocationError::ReverseGeocode(ProviderError::Status(
                "REQUEST_DENIED (The provided API key is invalid.)".to_string()
            ))
        );
    }

    #[test]
    fn test_search_candidates() {
        let response: TextSearchResponse = serde_json::from_str(SEARCH_OK).unwrap();
        let candidates = search_candidates(response).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name.as_deref(), Some("Central Park"));
        assert_eq!(candidates[0].types, vec!["park", "tourist_attraction"]);
        assert!(normalize(candidates[0].clone()).unwrap().viewport_bounds.is_some());
    }

    #[test]
    fn test_search_zero_results_is_empty() {
        let response: TextSearchResponse =
            serde_json::from_str(r#"{"results": [], "status": "ZERO_RESULTS"}"#).unwrap();
        assert!(search_candidates(response).unwrap().is_empty());
    }

    #[test]
    fn test_search_over_query_limit() {
        let response: TextSearchResponse =
            serde_json::from_str(r#"{"status": "OVER_QUERY_LIMIT"}"#).unwrap();
        assert_eq!(
            search_candidates(response).unwrap_err(),
            ProviderError::Status("OVER_QUERY_LIMIT".to_string())
        );
    }

    #[test]
    fn test_search_over_http() {
        let (base, _requests) = one_shot_server("200 OK", SEARCH_OK);
        let google = GoogleMaps::with_base_url("test-key", &base);
        let candidates = google.search("central park").unwrap();
        assert_eq!(candidates[0].place_id.as_deref(), Some("ChIJ4zGFAZpYwokRGUGph3Mf37k"));
    }

    #[test]
    fn test_reverse_over_http() {
        let (base, _requests) = one_shot_server("200 OK", GEOCODE_OK);
        let google = GoogleMaps::with_base_url("test-key", &base);
        let raw = google.reverse(LatLng::new(40.7033, -73.9903)).unwrap();
        assert_eq!(
            raw.formatted_address.as_deref(),
            Some("1 Main St, Brooklyn, NY 11201, USA")
        );
    }

    #[test]
    fn test_http_status_is_provider_error() {
        let (base, _requests) = one_shot_server("500 Internal Server Error", "{}");
        let google = GoogleMaps::with_base_url("test-key", &base);
        assert_eq!(
            google.search("anything").unwrap_err(),
            ProviderError::Status("HTTP 500".to_string())
        );
    }
}
