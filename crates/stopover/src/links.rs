use std::collections::HashSet;

use crate::place::PlaceRecord;
use crate::submit::{RouteBackend, RouteLink, SubmissionError};

const DIRECTIONS_URL: &str = "https://www.google.com/maps/dir/?api=1";

/// Places per link: origin, eight intermediate waypoints and destination.
pub const MAX_PLACES_PER_LINK: usize = 10;

/// Build directions links for a most-recent-first snapshot.
///
/// Later copies of a place id are dropped, the rest is put in chronological
/// order and cut into legs of at most [`MAX_PLACES_PER_LINK`] places. Each leg
/// starts where the previous one ended.
///
/// Legs start every nine places, so with 10, 19, 28, ... places the last start
/// would hold only the final place. That leg is skipped rather than emitted as
/// an origin-equals-destination link.
pub fn build_route_links(snapshot: &[PlaceRecord]) -> Vec<RouteLink> {
    let mut seen = HashSet::new();
    let mut route: Vec<&PlaceRecord> = snapshot
        .iter()
        .filter(|place| match &place.place_id {
            Some(id) => seen.insert(id.as_str()),
            None => true,
        })
        .collect();
    route.reverse();

    if route.len() < 2 {
        return Vec::new();
    }

    route_legs(&route)
        .into_iter()
        .map(|leg| RouteLink::new(directions_url(leg)))
        .collect()
}

fn route_legs<'a, 'p>(route: &'a [&'p PlaceRecord]) -> Vec<&'a [&'p PlaceRecord]> {
    let stride = MAX_PLACES_PER_LINK - 1;
    (0..route.len())
        .step_by(stride)
        .map(|start| &route[start..(start + MAX_PLACES_PER_LINK).min(route.len())])
        .filter(|leg| leg.len() >= 2)
        .collect()
}

fn encode(place: &PlaceRecord) -> String {
    urlencoding::encode(&place.formatted_address).into_owned()
}

fn directions_url(leg: &[&PlaceRecord]) -> String {
    let (Some(origin), Some(destination)) = (leg.first(), leg.last()) else {
        return DIRECTIONS_URL.to_string();
    };
    let mut url = format!(
        "{DIRECTIONS_URL}&origin={}&destination={}",
        encode(origin),
        encode(destination)
    );

    let waypoints: Vec<String> = leg[1..leg.len() - 1].iter().map(|p| encode(p)).collect();
    if !waypoints.is_empty() {
        url.push_str("&waypoints=");
        url.push_str(&waypoints.join("%7C"));
    }
    url
}

/// Route links computed locally, without a route service.
pub struct LocalBackend;

impl RouteBackend for LocalBackend {
    fn describe(&self) -> String {
        "local route builder".to_string()
    }

    fn generate(&self, snapshot: &[PlaceRecord]) -> Result<Vec<RouteLink>, SubmissionError> {
        Ok(build_route_links(snapshot))
    }
}
