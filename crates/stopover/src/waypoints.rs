use std::collections::VecDeque;

use crate::place::PlaceRecord;

/// Ordered waypoints for the current session, most recent addition first.
///
/// Only validated records get here, so there is no failure path. Entries are
/// never reordered, deduplicated or evicted.
#[derive(Debug, Clone, Default)]
pub struct WaypointList {
    places: VecDeque<PlaceRecord>,
    seeded: bool,
}

impl WaypointList {
    /// Insert the device's current location.
    ///
    /// Meant to run once per session. It is an ordinary prepend, so a seed
    /// that resolves after search selections lands in front of them.
    pub fn seed(&mut self, record: PlaceRecord) {
        if self.seeded {
            log::debug!("Seeding current location again: {}", record.formatted_address);
        }
        self.seeded = true;
        self.prepend(record);
    }

    pub fn prepend(&mut self, record: PlaceRecord) {
        log::debug!(
            "Waypoint #{} added: {}",
            self.places.len() + 1,
            record.formatted_address
        );
        self.places.push_front(record);
    }

    /// Head-to-tail copy of the current list.
    pub fn snapshot(&self) -> Vec<PlaceRecord> {
        self.places.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaceRecord> {
        self.places.iter()
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }
}
