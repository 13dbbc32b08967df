use crate::map_sync::{MapSync, SyncUpdate};
use crate::place::{
    PlaceRecord, RawGeocodeResult, RawPlace, RawSearchSelection, ValidationError, normalize,
};
use crate::providers::GeolocationError;
use crate::submit::{self, RouteBackend, RouteLink, SubmissionError};
use crate::waypoints::WaypointList;

/// Completion of something the session was waiting on, or a user action.
#[derive(Debug)]
pub enum SessionEvent {
    /// The device position resolved (or failed to) through reverse geocoding.
    CurrentLocation(Result<RawGeocodeResult, GeolocationError>),
    /// The user picked a search candidate.
    SearchSelection(RawSearchSelection),
    /// A submission of `sent` waypoints came back.
    Submitted {
        sent: usize,
        result: Result<Vec<RouteLink>, SubmissionError>,
    },
}

/// What handling an event amounted to, for the user interface to report.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Seeded(PlaceRecord, SyncUpdate),
    SeedSkipped(String),
    Added(PlaceRecord, SyncUpdate),
    Rejected(ValidationError),
    Routed(Vec<RouteLink>),
    SubmissionFailed(SubmissionError),
}

/// One planning session: waypoint list, map view and latest route links.
///
/// Each piece of state is changed only by the event that owns it. Nothing
/// here blocks; callers deliver events as their operations complete.
#[derive(Debug, Default)]
pub struct Session {
    waypoints: WaypointList,
    map: MapSync,
    route_links: Vec<RouteLink>,
    debug_info: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waypoints(&self) -> &WaypointList {
        &self.waypoints
    }

    pub fn map(&self) -> &MapSync {
        &self.map
    }

    /// Links from the most recent successful submission.
    pub fn route_links(&self) -> &[RouteLink] {
        &self.route_links
    }

    /// Outcome line of the most recent submission.
    pub fn debug_info(&self) -> &str {
        &self.debug_info
    }

    pub fn apply(&mut self, event: SessionEvent) -> Notice {
        match event {
            SessionEvent::CurrentLocation(Err(e)) => {
                log::warn!("Error retrieving current location: {e}");
                Notice::SeedSkipped(e.to_string())
            }
            SessionEvent::CurrentLocation(Ok(raw)) => match self.accept(raw.into()) {
                Ok((record, update)) => Notice::Seeded(record, update),
                Err(e) => {
                    log::warn!("Current location not usable: {e}");
                    Notice::SeedSkipped(e.to_string())
                }
            },
            SessionEvent::SearchSelection(raw) => {
                log::debug!("Selected {} [{}]", raw.label(), raw.types.join(", "));
                match self.accept(raw.into()) {
                    Ok((record, update)) => Notice::Added(record, update),
                    Err(e) => {
                        log::info!("Selection rejected: {e}");
                        Notice::Rejected(e)
                    }
                }
            }
            SessionEvent::Submitted { sent, result } => match result {
                Ok(links) => {
                    self.debug_info = format!(
                        "Successfully sent {sent} address(es) to the backend, received {} route link(s)",
                        links.len()
                    );
                    self.route_links = links.clone();
                    Notice::Routed(links)
                }
                Err(e) => {
                    self.debug_info = format!("Error sending data to backend: {e}");
                    Notice::SubmissionFailed(e)
                }
            },
        }
    }

    /// Submit the current list and apply the outcome.
    ///
    /// Blocks until the backend answers; interactive front ends that must stay
    /// responsive run [`submit::submit`] themselves and deliver
    /// [`SessionEvent::Submitted`].
    pub fn submit(&mut self, backend: &dyn RouteBackend) -> Notice {
        let snapshot = self.waypoints.snapshot();
        let result = submit::submit(backend, &snapshot);
        self.apply(SessionEvent::Submitted {
            sent: snapshot.len(),
            result,
        })
    }

    fn accept(&mut self, raw: RawPlace) -> Result<(PlaceRecord, SyncUpdate), ValidationError> {
        let seed = matches!(raw, RawPlace::Geocode(_));
        let record = normalize(raw)?;
        if seed {
            self.waypoints.seed(record.clone());
        } else {
            self.waypoints.prepend(record.clone());
        }
        let update = self.map.on_record_accepted(&record);
        Ok((record, update))
    }
}
