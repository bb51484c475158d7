use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::events::NavigationEvent;

/// Running counters for one floor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigationProjection {
    pub floor_id: String,
    pub grid_rebuilds: usize,
    pub walkable_cells: usize,
    pub paths_found: usize,
    pub paths_failed: usize,
    pub reservations: usize,
    pub relocated_destinations: usize,
    pub releases: usize,
    pub expirations: usize,
    pub exhausted_arbitrations: usize,
    pub last_activity: Option<DateTime<Utc>>,
}

impl NavigationProjection {
    pub fn new(floor_id: String) -> Self {
        Self {
            floor_id,
            ..Default::default()
        }
    }

    pub fn apply_event(&mut self, event: &NavigationEvent) {
        match event {
            NavigationEvent::GridInitialized { walkable_cells, timestamp, .. } => {
                self.grid_rebuilds += 1;
                self.walkable_cells = *walkable_cells;
                self.last_activity = Some(*timestamp);
            }
            NavigationEvent::DestinationReserved { requested, position, timestamp, .. } => {
                self.reservations += 1;
                if requested != position {
                    self.relocated_destinations += 1;
                }
                self.last_activity = Some(*timestamp);
            }
            NavigationEvent::DestinationReleased { timestamp, .. } => {
                self.releases += 1;
                self.last_activity = Some(*timestamp);
            }
            NavigationEvent::ReservationsExpired { agent_ids, timestamp, .. } => {
                self.expirations += agent_ids.len();
                self.last_activity = Some(*timestamp);
            }
            NavigationEvent::ReservationExhausted { timestamp, .. } => {
                self.exhausted_arbitrations += 1;
                self.last_activity = Some(*timestamp);
            }
            NavigationEvent::PathFound { timestamp, .. } => {
                self.paths_found += 1;
                self.last_activity = Some(*timestamp);
            }
            NavigationEvent::PathFailed { timestamp, .. } => {
                self.paths_failed += 1;
                self.last_activity = Some(*timestamp);
            }
        }
    }
}

/// In-memory projection store keyed by floor id.
#[derive(Debug, Default)]
pub struct NavigationProjectionStore {
    pub floors: HashMap<String, NavigationProjection>,
}

impl NavigationProjectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_event(&mut self, floor_id: &str, event: &NavigationEvent) {
        self.floors
            .entry(floor_id.to_string())
            .or_insert_with(|| NavigationProjection::new(floor_id.to_string()))
            .apply_event(event);
    }
}
