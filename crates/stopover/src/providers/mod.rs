//! External collaborators: where positions, addresses and search candidates
//! come from.

pub mod geolocation;
pub mod google;
pub mod selections;

use crate::place::{LatLng, RawGeocodeResult, RawSearchSelection};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Http(String),

    #[error("Service returned {0}")]
    Status(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Current position unavailable: {0}")]
    Unavailable(String),

    #[error("Geocoder failed: {0}")]
    ReverseGeocode(#[from] ProviderError),

    #[error("Geocoder returned no result")]
    NoResult,
}

pub trait GeolocationProvider {
    fn current_position(&self) -> Result<LatLng, GeolocationError>;
}

pub trait ReverseGeocoder {
    fn reverse(&self, at: LatLng) -> Result<RawGeocodeResult, GeolocationError>;
}

pub trait PlaceSearch {
    /// Candidates for `query`, best match first. No match is an empty list.
    fn search(&self, query: &str) -> Result<Vec<RawSearchSelection>, ProviderError>;
}

/// Position the device, then look up what is there.
pub fn resolve_current_location(
    position: &dyn GeolocationProvider,
    geocoder: &dyn ReverseGeocoder,
) -> Result<RawGeocodeResult, GeolocationError> {
    let at = position.current_position()?;
    log::debug!("Device position: {at}");
    geocoder.reverse(at)
}
