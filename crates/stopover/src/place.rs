use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display name given to the device position when the geocoder supplies none.
pub const CURRENT_LOCATION_NAME: &str = "Current Location";

/// A WGS84 coordinate pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components finite and inside the latitude/longitude ranges.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Parses `LAT,LNG`, e.g. `40.7,-74.0`.
impl FromStr for LatLng {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("Expected LAT,LNG but got '{s}'"))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("Invalid latitude: '{}'", lat.trim()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| format!("Invalid longitude: '{}'", lng.trim()))?;
        let at = LatLng::new(lat, lng);
        if !at.is_valid() {
            return Err(format!("Coordinates out of range: {at}"));
        }
        Ok(at)
    }
}

/// Axis-aligned viewport in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Zero-area bounds around a single point.
    pub fn point(at: LatLng) -> Self {
        Self {
            south: at.lat,
            west: at.lng,
            north: at.lat,
            east: at.lng,
        }
    }

    /// Longitudinal span, accounting for boxes that cross the antimeridian.
    pub fn lng_span(&self) -> f64 {
        if self.east >= self.west {
            self.east - self.west
        } else {
            self.east + 360.0 - self.west
        }
    }

    pub fn center(&self) -> LatLng {
        let mut lng = self.west + self.lng_span() / 2.0;
        if lng > 180.0 {
            lng -= 360.0;
        }
        LatLng::new((self.south + self.north) / 2.0, lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    CurrentLocation,
    SearchResult,
}

/// Canonical, validated waypoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceRecord {
    pub formatted_address: String,
    pub location: LatLng,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport_bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    pub display_name: String,
    pub source_kind: SourceKind,
}

/// Viewport as delivered by a collaborator.
///
/// The JavaScript map API serializes bounds as edges, the web services as
/// corner points. Both are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawViewport {
    Edges {
        south: f64,
        west: f64,
        north: f64,
        east: f64,
    },
    Corners {
        northeast: LatLng,
        southwest: LatLng,
    },
}

impl From<RawViewport> for Bounds {
    fn from(raw: RawViewport) -> Self {
        match raw {
            RawViewport::Edges {
                south,
                west,
                north,
                east,
            } => Bounds {
                south,
                west,
                north,
                east,
            },
            RawViewport::Corners {
                northeast,
                southwest,
            } => Bounds {
                south: southwest.lat,
                west: southwest.lng,
                north: northeast.lat,
                east: northeast.lng,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGeometry {
    pub location: Option<LatLng>,
    pub viewport: Option<RawViewport>,
}

/// A reverse-geocoding hit for the device position.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGeocodeResult {
    pub formatted_address: Option<String>,
    pub geometry: Option<RawGeometry>,
    pub name: Option<String>,
}

/// A place picked from search results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchSelection {
    pub formatted_address: Option<String>,
    pub geometry: Option<RawGeometry>,
    pub place_id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl RawSearchSelection {
    /// Short label for pick lists: name plus the address when they differ.
    pub fn label(&self) -> String {
        let name = non_empty(self.name.as_deref());
        let address = non_empty(self.formatted_address.as_deref());
        match (name, address) {
            (Some(name), Some(address)) if name != address => format!("{name} ({address})"),
            (Some(name), _) => name.to_string(),
            (None, Some(address)) => address.to_string(),
            (None, None) => "(unnamed place)".to_string(),
        }
    }
}

impl fmt::Display for RawSearchSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Input accepted by [`normalize`].
#[derive(Debug, Clone)]
pub enum RawPlace {
    Geocode(RawGeocodeResult),
    Search(RawSearchSelection),
}

impl From<RawGeocodeResult> for RawPlace {
    fn from(raw: RawGeocodeResult) -> Self {
        RawPlace::Geocode(raw)
    }
}

impl From<RawSearchSelection> for RawPlace {
    fn from(raw: RawSearchSelection) -> Self {
        RawPlace::Search(raw)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("No details available for input: '{input}'")]
    MissingGeometry { input: String },

    #[error("Place has no formatted address")]
    MissingAddress,

    #[error("Location ({lat}, {lng}) is out of range")]
    InvalidLocation { lat: f64, lng: f64 },
}

/// Turn a collaborator result into a [`PlaceRecord`].
///
/// Pure: nothing is mutated, and a failure means the input must not reach
/// the waypoint list.
pub fn normalize(input: impl Into<RawPlace>) -> Result<PlaceRecord, ValidationError> {
    match input.into() {
        RawPlace::Geocode(raw) => from_geocode(raw),
        RawPlace::Search(raw) => from_search(raw),
    }
}

fn from_geocode(raw: RawGeocodeResult) -> Result<PlaceRecord, ValidationError> {
    let formatted_address = non_empty(raw.formatted_address.as_deref())
        .ok_or(ValidationError::MissingAddress)?
        .to_string();
    let location = checked_location(raw.geometry.as_ref(), || formatted_address.clone())?;
    let display_name = non_empty(raw.name.as_deref())
        .unwrap_or(CURRENT_LOCATION_NAME)
        .to_string();

    Ok(PlaceRecord {
        formatted_address,
        location,
        viewport_bounds: None,
        place_id: None,
        display_name,
        source_kind: SourceKind::CurrentLocation,
    })
}

fn from_search(raw: RawSearchSelection) -> Result<PlaceRecord, ValidationError> {
    // Geometry is checked first so the user sees what they typed in the alert.
    let location = checked_location(raw.geometry.as_ref(), || {
        non_empty(raw.name.as_deref())
            .or(non_empty(raw.formatted_address.as_deref()))
            .unwrap_or_default()
            .to_string()
    })?;

    let name = non_empty(raw.name.as_deref());
    let formatted_address = non_empty(raw.formatted_address.as_deref())
        .or(name)
        .ok_or(ValidationError::MissingAddress)?
        .to_string();
    let display_name = name.unwrap_or(&formatted_address).to_string();
    let viewport_bounds = raw
        .geometry
        .as_ref()
        .and_then(|g| g.viewport)
        .map(Bounds::from);

    Ok(PlaceRecord {
        formatted_address,
        location,
        viewport_bounds,
        place_id: raw.place_id.filter(|id| !id.is_empty()),
        display_name,
        source_kind: SourceKind::SearchResult,
    })
}

fn checked_location(
    geometry: Option<&RawGeometry>,
    input: impl FnOnce() -> String,
) -> Result<LatLng, ValidationError> {
    let location = geometry
        .and_then(|g| g.location)
        .ok_or_else(|| ValidationError::MissingGeometry { input: input() })?;
    if !location.is_valid() {
        return Err(ValidationError::InvalidLocation {
            lat: location.lat,
            lng: location.lng,
        });
    }
    Ok(location)
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
