use crate::place::{LatLng, RawGeocodeResult, RawGeometry};

use super::{GeolocationError, GeolocationProvider, ReverseGeocoder};

/// A position given up front, from `--at` or the `home` config entry.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub LatLng);

impl GeolocationProvider for FixedPosition {
    fn current_position(&self) -> Result<LatLng, GeolocationError> {
        Ok(self.0)
    }
}

/// No position source is configured.
#[derive(Debug, Clone)]
pub struct NoPosition {
    reason: String,
}

impl NoPosition {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl GeolocationProvider for NoPosition {
    fn current_position(&self) -> Result<LatLng, GeolocationError> {
        Err(GeolocationError::Unavailable(self.reason.clone()))
    }
}

/// Reverse geocoder that labels a position with its own coordinates.
///
/// Stands in for a real geocoder when working offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateLabel;

impl ReverseGeocoder for CoordinateLabel {
    fn reverse(&self, at: LatLng) -> Result<RawGeocodeResult, GeolocationError> {
        Ok(RawGeocodeResult {
            formatted_address: Some(format!("{:.5}, {:.5}", at.lat, at.lng)),
            geometry: Some(RawGeometry {
                location: Some(at),
                viewport: None,
            }),
            name: None,
        })
    }
}
