use serde::{Deserialize, Serialize};
use std::fmt;

use crate::place::{Bounds, LatLng, PlaceRecord};

/// Default backend when neither config nor environment name one.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// A navigable route through (part of) the submitted waypoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteLink(String);

impl RouteLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend responded with HTTP {0}")]
    Status(u16),

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),
}

/// Anything that can turn an ordered waypoint snapshot into route links.
pub trait RouteBackend {
    /// Short human-readable description, used in logs.
    fn describe(&self) -> String;

    fn generate(&self, snapshot: &[PlaceRecord]) -> Result<Vec<RouteLink>, SubmissionError>;
}

/// Send a snapshot to `backend`.
///
/// An empty snapshot is sent as-is and zero links is a success. The caller's
/// waypoint list is only ever read.
pub fn submit(
    backend: &dyn RouteBackend,
    snapshot: &[PlaceRecord],
) -> Result<Vec<RouteLink>, SubmissionError> {
    log::info!(
        "Submitting {} waypoint(s) to {}",
        snapshot.len(),
        backend.describe()
    );
    match backend.generate(snapshot) {
        Ok(links) => {
            log::info!("Backend returned {} route link(s)", links.len());
            Ok(links)
        }
        Err(e) => {
            log::error!("Error sending data to backend: {e}");
            Err(e)
        }
    }
}

/// One element of the request body, in the shape the route service expects.
#[derive(Debug, Serialize)]
pub struct WirePlace<'a> {
    pub formatted_address: &'a str,
    pub geometry: WireGeometry,
    pub place_id: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct WireGeometry {
    pub location: LatLng,
    pub viewport: Bounds,
}

impl<'a> From<&'a PlaceRecord> for WirePlace<'a> {
    fn from(place: &'a PlaceRecord) -> Self {
        // The service rejects places without a viewport or id, so those get a
        // zero-area box at the location and an empty id.
        WirePlace {
            formatted_address: &place.formatted_address,
            geometry: WireGeometry {
                location: place.location,
                viewport: place
                    .viewport_bounds
                    .unwrap_or_else(|| Bounds::point(place.location)),
            },
            place_id: place.place_id.as_deref().unwrap_or(""),
            name: &place.display_name,
        }
    }
}

pub fn to_wire(snapshot: &[PlaceRecord]) -> Vec<WirePlace<'_>> {
    snapshot.iter().map(WirePlace::from).collect()
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    google_maps_urls: Vec<String>,
}

/// Route service reached over HTTP at `<base>/places`.
pub struct HttpBackend {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: format!("{}/places", base_url.trim_end_matches('/')),
            agent: ureq::Agent::new_with_defaults(),
        }
    }
}

impl RouteBackend for HttpBackend {
    fn describe(&self) -> String {
        self.endpoint.clone()
    }

    fn generate(&self, snapshot: &[PlaceRecord]) -> Result<Vec<RouteLink>, SubmissionError> {
        let body = to_wire(snapshot);
        let response = self
            .agent
            .post(self.endpoint.as_str())
            .send_json(&body)
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => SubmissionError::Status(code),
                other => SubmissionError::Network(other.to_string()),
            })?
            .body_mut()
            .read_json::<PlacesResponse>()
            .map_err(|e| SubmissionError::MalformedResponse(e.to_string()))?;

        Ok(response
            .google_maps_urls
            .into_iter()
            .map(RouteLink::new)
            .collect())
    }
}
