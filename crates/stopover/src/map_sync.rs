use std::fmt;

use crate::place::{Bounds, LatLng, PlaceRecord};

/// Zoom used when a place has no viewport of its own (street level).
pub const STREET_ZOOM: u8 = 17;

/// Zoom of the map before anything has been accepted.
pub const INITIAL_ZOOM: u8 = 13;

/// Center of the map before anything has been accepted (Midtown Manhattan).
pub const INITIAL_CENTER: LatLng = LatLng::new(40.749933, -73.98633);

const MAX_ZOOM: u8 = 21;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Marker {
    Hidden,
    Visible(LatLng),
}

impl Marker {
    pub fn position(&self) -> Option<LatLng> {
        match self {
            Marker::Visible(at) => Some(*at),
            Marker::Hidden => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Viewport {
    Centered { center: LatLng, zoom: u8 },
    Fitted(Bounds),
}

impl Viewport {
    pub fn center(&self) -> LatLng {
        match self {
            Viewport::Centered { center, .. } => *center,
            Viewport::Fitted(bounds) => bounds.center(),
        }
    }

    /// Zoom level at which the whole viewport is visible.
    pub fn zoom(&self) -> u8 {
        match self {
            Viewport::Centered { zoom, .. } => *zoom,
            Viewport::Fitted(bounds) => fit_zoom(bounds),
        }
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Viewport::Centered { center, zoom } => write!(f, "centered on {center} at zoom {zoom}"),
            Viewport::Fitted(b) => write!(
                f,
                "fitted to {},{} .. {},{}",
                b.south, b.west, b.north, b.east
            ),
        }
    }
}

/// What one acceptance did to the map, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncUpdate {
    pub marker_steps: Vec<Marker>,
    pub viewport: Viewport,
}

/// Single marker and viewport that follow the most recently accepted place.
///
/// Only the last action is emphasized; the waypoint list is the source of
/// truth for route order.
#[derive(Debug, Clone)]
pub struct MapSync {
    marker: Marker,
    viewport: Viewport,
}

impl Default for MapSync {
    fn default() -> Self {
        Self {
            marker: Marker::Hidden,
            viewport: Viewport::Centered {
                center: INITIAL_CENTER,
                zoom: INITIAL_ZOOM,
            },
        }
    }
}

impl MapSync {
    pub fn marker(&self) -> Marker {
        self.marker
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Move the marker and viewport to a newly accepted place.
    ///
    /// The marker is always hidden before it is repositioned. Places with
    /// explicit bounds get the viewport fitted to them, others are centered
    /// at street zoom.
    pub fn on_record_accepted(&mut self, record: &PlaceRecord) -> SyncUpdate {
        let mut marker_steps = Vec::with_capacity(2);

        self.marker = Marker::Hidden;
        marker_steps.push(self.marker);

        self.viewport = match record.viewport_bounds {
            Some(bounds) => Viewport::Fitted(bounds),
            None => Viewport::Centered {
                center: record.location,
                zoom: STREET_ZOOM,
            },
        };

        self.marker = Marker::Visible(record.location);
        marker_steps.push(self.marker);

        log::debug!("Map {} with marker at {}", self.viewport, record.location);

        SyncUpdate {
            marker_steps,
            viewport: self.viewport,
        }
    }

    /// Link that opens the current view in a browser.
    pub fn view_link(&self) -> String {
        match self.marker {
            Marker::Visible(at) => format!(
                "https://www.google.com/maps/search/?api=1&query={},{}",
                at.lat, at.lng
            ),
            Marker::Hidden => {
                let center = self.viewport.center();
                format!(
                    "https://www.google.com/maps/@{},{},{}z",
                    center.lat,
                    center.lng,
                    self.viewport.zoom()
                )
            }
        }
    }
}

/// Largest web-mercator zoom at which `bounds` still fits on a 256px tile.
fn fit_zoom(bounds: &Bounds) -> u8 {
    let span = bounds.lng_span().max(bounds.north - bounds.south);
    if span.is_nan() || span <= 0.0 {
        return STREET_ZOOM;
    }
    let zoom = (360.0 / span).log2().floor();
    zoom.clamp(0.0, MAX_ZOOM as f64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place::normalize;
    use crate::place::tests::selection;

    #[test]
    fn test_initial_state() {
        let map = MapSync::default();
        assert_eq!(map.marker(), Marker::Hidden);
        assert_eq!(
            map.viewport(),
            Viewport::Centered {
                center: INITIAL_CENTER,
                zoom: INITIAL_ZOOM
            }
        );
    }

    #[test]
    fn test_accept_without_viewport_centers_at_street_zoom() {
        let mut map = MapSync::default();
        let record = normalize(selection("Pier 17", 40.7063, -74.0034)).unwrap();
        let update = map.on_record_accepted(&record);

        assert_eq!(
            update.viewport,
            Viewport::Centered {
                center: record.location,
                zoom: STREET_ZOOM
            }
        );
        assert!(matches!(map.marker(), Marker::Visible(_)));
        assert_eq!(map.marker().position(), Some(record.location));
    }

    #[test]
    fn test_marker_hides_before_moving() {
        let mut map = MapSync::default();
        let first = normalize(selection("A", 1.0, 1.0)).unwrap();
        let second = normalize(selection("B", 2.0, 2.0)).unwrap();
        map.on_record_accepted(&first);
        let update = map.on_record_accepted(&second);
        assert_eq!(
            update.marker_steps,
            vec![Marker::Hidden, Marker::Visible(second.location)]
        );
    }

    #[test]
    fn test_accept_with_viewport_fits_bounds() {
        let mut map = MapSync::default();
        let mut record = normalize(selection("Manhattan", 40.78, -73.97)).unwrap();
        let bounds = Bounds {
            south: 40.68,
            west: -74.05,
            north: 40.88,
            east: -73.90,
        };
        record.viewport_bounds = Some(bounds);
        let update = map.on_record_accepted(&record);

        assert_eq!(update.viewport, Viewport::Fitted(bounds));
        // The marker stays on the place, not on the viewport center.
        assert_eq!(map.marker().position(), Some(record.location));
    }

    #[test]
    fn test_only_last_record_is_shown() {
        let mut map = MapSync::default();
        for i in 0..5 {
            let record = normalize(selection("P", i as f64, i as f64)).unwrap();
            map.on_record_accepted(&record);
            assert_eq!(map.marker(), Marker::Visible(record.location));
        }
    }

    #[test]
    fn test_fit_zoom() {
        let city = Bounds {
            south: 40.0,
            west: -74.0,
            north: 40.1,
            east: -73.9,
        };
        assert_eq!(fit_zoom(&city), 11);
        assert_eq!(fit_zoom(&Bounds::point(LatLng::new(1.0, 1.0))), STREET_ZOOM);
        let world = Bounds {
            south: -80.0,
            west: -180.0,
            north: 80.0,
            east: 180.0,
        };
        assert_eq!(fit_zoom(&world), 0);
    }

    #[test]
    fn test_view_link_follows_marker() {
        let mut map = MapSync::default();
        assert_eq!(
            map.view_link(),
            "https://www.google.com/maps/@40.749933,-73.98633,13z"
        );
        let record = normalize(selection("X", 40.5, -74.25)).unwrap();
        map.on_record_accepted(&record);
        assert_eq!(
            map.view_link(),
            "https://www.google.com/maps/search/?api=1&query=40.5,-74.25"
        );
    }
}
