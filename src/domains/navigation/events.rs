use crate::common::DomainEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::WorldPoint;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NavigationEvent {
    GridInitialized {
        floor_id: String,
        width: usize,
        depth: usize,
        walkable_cells: usize,
        obstacle_count: usize,
        timestamp: DateTime<Utc>,
    },
    DestinationReserved {
        floor_id: String,
        agent_id: String,
        requested: WorldPoint,
        position: WorldPoint,
        expires_at: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
    DestinationReleased {
        floor_id: String,
        agent_id: String,
        timestamp: DateTime<Utc>,
    },
    ReservationsExpired {
        floor_id: String,
        agent_ids: Vec<String>,
        timestamp: DateTime<Utc>,
    },
    ReservationExhausted {
        floor_id: String,
        agent_id: String,
        requested: WorldPoint,
        attempts: usize,
        timestamp: DateTime<Utc>,
    },
    PathFound {
        floor_id: String,
        start: WorldPoint,
        end: WorldPoint,
        waypoint_count: usize,
        nodes_expanded: usize,
        timestamp: DateTime<Utc>,
    },
    PathFailed {
        floor_id: String,
        start: WorldPoint,
        end: WorldPoint,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl NavigationEvent {
    /// Agent the event concerns, for single-agent events.
    pub fn agent_id(&self) -> Option<&str> {
        match self {
            NavigationEvent::DestinationReserved { agent_id, .. }
            | NavigationEvent::DestinationReleased { agent_id, .. }
            | NavigationEvent::ReservationExhausted { agent_id, .. } => Some(agent_id),
            _ => None,
        }
    }
}

impl DomainEvent for NavigationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            NavigationEvent::GridInitialized { .. } => "GridInitialized",
            NavigationEvent::DestinationReserved { .. } => "DestinationReserved",
            NavigationEvent::DestinationReleased { .. } => "DestinationReleased",
            NavigationEvent::ReservationsExpired { .. } => "ReservationsExpired",
            NavigationEvent::ReservationExhausted { .. } => "ReservationExhausted",
            NavigationEvent::PathFound { .. } => "PathFound",
            NavigationEvent::PathFailed { .. } => "PathFailed",
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            NavigationEvent::GridInitialized { floor_id, .. }
            | NavigationEvent::DestinationReserved { floor_id, .. }
            | NavigationEvent::DestinationReleased { floor_id, .. }
            | NavigationEvent::ReservationsExpired { floor_id, .. }
            | NavigationEvent::ReservationExhausted { floor_id, .. }
            | NavigationEvent::PathFound { floor_id, .. }
            | NavigationEvent::PathFailed { floor_id, .. } => floor_id,
        }
    }

    fn event_version(&self) -> u64 { 1 }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            NavigationEvent::GridInitialized { timestamp, .. }
            | NavigationEvent::DestinationReserved { timestamp, .. }
            | NavigationEvent::DestinationReleased { timestamp, .. }
            | NavigationEvent::ReservationsExpired { timestamp, .. }
            | NavigationEvent::ReservationExhausted { timestamp, .. }
            | NavigationEvent::PathFound { timestamp, .. }
            | NavigationEvent::PathFailed { timestamp, .. } => *timestamp,
        }
    }
}
