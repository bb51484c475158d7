use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Arc;

use super::clock::{Clock, DynClock, SystemClock};
use super::events::NavigationEvent;
use super::grid::{GridFrame, GridSnapshot, WalkableGrid, DEFAULT_CELL_SIZE};
use super::layout::FloorLayout;
use super::obstacle::{ObstacleDescriptor, Padding};
use super::reservation::{ArbitrationKind, DestinationRegistry, Reservation, ReservationPolicy};
use super::search::{PathResult, PathSearch};
use super::types::WorldPoint;
use crate::common::{DomainEvent, NavigationError, NavigationResult};
use crate::domains::logger::DynLogger;

/// Uncommitted events kept per context before the oldest are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationSettings {
    pub cell_size: f64,
    pub padding: Padding,
    /// Ring-search bound for substitute endpoints; `None` covers the grid.
    pub max_fallback_radius: Option<usize>,
    pub reservations: ReservationPolicy,
    /// Bound on the uncommitted event buffer.
    pub event_capacity: usize,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            padding: Padding::default(),
            max_fallback_radius: None,
            reservations: ReservationPolicy::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Grid and destination registry for one floor.
///
/// Everything is driven synchronously through `&mut self`; contexts built
/// for different floors share nothing. Each state change is recorded as an
/// uncommitted [`NavigationEvent`] for the application layer to drain; once
/// `event_capacity` events are pending the oldest one is dropped.
pub struct NavigationContext {
    floor_id: String,
    settings: NavigationSettings,
    grid: Option<WalkableGrid>,
    registry: DestinationRegistry,
    clock: DynClock,
    logger: DynLogger,
    uncommitted_events: VecDeque<NavigationEvent>,
}

impl NavigationContext {
    pub fn new(
        floor_id: impl Into<String>,
        settings: NavigationSettings,
        clock: DynClock,
        logger: DynLogger,
    ) -> Self {
        Self {
            floor_id: floor_id.into(),
            registry: DestinationRegistry::new(settings.reservations, clock.clone(), logger.clone()),
            settings,
            grid: None,
            clock,
            logger,
            uncommitted_events: VecDeque::new(),
        }
    }

    pub fn with_defaults(floor_id: impl Into<String>, logger: DynLogger) -> Self {
        Self::new(floor_id, NavigationSettings::default(), Arc::new(SystemClock), logger)
    }

    pub fn floor_id(&self) -> &str {
        &self.floor_id
    }

    pub fn settings(&self) -> &NavigationSettings {
        &self.settings
    }

    // --- grid -------------------------------------------------------------

    /// Rebuilds the grid from scratch. Paddings default to the configured
    /// values. On invalid input the previous grid stays in place.
    pub fn initialize(
        &mut self,
        floor_size: f64,
        obstacles: &[ObstacleDescriptor],
        obstacle_padding: Option<usize>,
        furniture_padding: Option<usize>,
    ) -> NavigationResult<()> {
        let padding = Padding {
            obstacle: obstacle_padding.unwrap_or(self.settings.padding.obstacle),
            furniture: furniture_padding.unwrap_or(self.settings.padding.furniture),
        };
        let grid = match WalkableGrid::build(floor_size, self.settings.cell_size, obstacles, padding) {
            Ok(grid) => grid,
            Err(e) => {
                self.logger
                    .error(&format!("[{}] grid initialization rejected: {}", self.floor_id, e));
                return Err(e);
            }
        };

        let walkable_cells = grid.walkable_count();
        self.logger.info(&format!(
            "[{}] grid initialized: {}x{} cells, {} walkable, {} obstacles, padding {}/{}",
            self.floor_id,
            grid.width(),
            grid.depth(),
            walkable_cells,
            obstacles.len(),
            padding.obstacle,
            padding.furniture
        ));
        self.add_event(NavigationEvent::GridInitialized {
            floor_id: self.floor_id.clone(),
            width: grid.width(),
            depth: grid.depth(),
            walkable_cells,
            obstacle_count: obstacles.len(),
            timestamp: self.now(),
        });
        self.grid = Some(grid);
        Ok(())
    }

    pub fn initialize_layout(&mut self, layout: &FloorLayout) -> NavigationResult<()> {
        self.initialize(
            layout.floor_size,
            &layout.obstacles,
            layout.obstacle_padding,
            layout.furniture_padding,
        )
    }

    pub fn is_initialized(&self) -> bool {
        self.grid.is_some()
    }

    pub fn grid(&self) -> Option<&WalkableGrid> {
        self.grid.as_ref()
    }

    /// Transform parameters of the active grid.
    pub fn frame(&self) -> Option<GridFrame> {
        self.grid.as_ref().map(|g| *g.frame())
    }

    pub fn grid_data(&self) -> Option<GridSnapshot> {
        self.grid.as_ref().map(WalkableGrid::snapshot)
    }

    pub fn random_walkable_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<WorldPoint> {
        self.grid.as_ref().and_then(|g| g.random_walkable_point(rng))
    }

    // --- path search ------------------------------------------------------

    pub fn find_path(&mut self, start: WorldPoint, end: WorldPoint) -> NavigationResult<Vec<WorldPoint>> {
        self.plan_path(start, end).map(|result| result.waypoints)
    }

    /// Like [`find_path`](Self::find_path) but keeps the search details.
    pub fn plan_path(&mut self, start: WorldPoint, end: WorldPoint) -> NavigationResult<PathResult> {
        let outcome = match &self.grid {
            Some(grid) => PathSearch::new(grid, self.settings.max_fallback_radius).find_path(&start, &end),
            None => Err(NavigationError::GridUninitialized),
        };

        match outcome {
            Ok(result) => {
                if result.start_substituted || result.goal_substituted {
                    self.logger.debug(&format!(
                        "[{}] substituted blocked endpoint(s): start ({}, {}), goal ({}, {})",
                        self.floor_id, result.start.x, result.start.z, result.goal.x, result.goal.z
                    ));
                }
                self.add_event(NavigationEvent::PathFound {
                    floor_id: self.floor_id.clone(),
                    start,
                    end,
                    waypoint_count: result.waypoints.len(),
                    nodes_expanded: result.nodes_expanded,
                    timestamp: self.now(),
                });
                Ok(result)
            }
            Err(e) => {
                let msg = format!("[{}] path {} -> {} failed: {}", self.floor_id, start, end, e);
                match e {
                    NavigationError::NoPathFound { .. } => self.logger.warn(&msg),
                    _ => self.logger.error(&msg),
                }
                self.add_event(NavigationEvent::PathFailed {
                    floor_id: self.floor_id.clone(),
                    start,
                    end,
                    reason: e.to_string(),
                    timestamp: self.now(),
                });
                Err(e)
            }
        }
    }

    // --- destinations -----------------------------------------------------

    pub fn reserve(&mut self, position: WorldPoint, agent_id: &str) -> Reservation {
        let duration = self.settings.reservations.default_duration_ms;
        self.reserve_for(position, agent_id, duration)
    }

    pub fn reserve_for(&mut self, position: WorldPoint, agent_id: &str, duration_ms: u64) -> Reservation {
        let reservation = self.registry.reserve_for(position, agent_id, duration_ms);
        self.record_expired();
        self.record_reserved(position, &reservation);
        reservation
    }

    pub fn find_available_destination(&mut self, requested: WorldPoint, agent_id: &str) -> WorldPoint {
        let attempts = self.settings.reservations.max_attempts;
        self.find_available_destination_with_attempts(requested, agent_id, attempts)
    }

    /// Arbitrates a destination for `agent_id`. When a grid is active,
    /// probe points must land on walkable cells.
    pub fn find_available_destination_with_attempts(
        &mut self,
        requested: WorldPoint,
        agent_id: &str,
        max_attempts: usize,
    ) -> WorldPoint {
        let grid = self.grid.as_ref();
        let arbitration = self.registry.arbitrate_where(requested, agent_id, max_attempts, |p| {
            grid.map_or(true, |g| g.is_walkable_world(p))
        });
        self.record_expired();

        match arbitration.kind {
            ArbitrationKind::Requested => {}
            ArbitrationKind::Probed { attempt, angle_deg } => self.logger.debug(&format!(
                "[{}] agent {} moved from {} to {} (attempt {}, {} deg)",
                self.floor_id, agent_id, requested, arbitration.position, attempt, angle_deg
            )),
            ArbitrationKind::Exhausted => self.add_event(NavigationEvent::ReservationExhausted {
                floor_id: self.floor_id.clone(),
                agent_id: agent_id.to_string(),
                requested,
                attempts: max_attempts,
                timestamp: self.now(),
            }),
        }

        self.record_reserved(requested, &arbitration.reservation);
        arbitration.position
    }

    pub fn release(&mut self, agent_id: &str) -> bool {
        let released = self.registry.release(agent_id);
        self.record_expired();
        if released {
            self.add_event(NavigationEvent::DestinationReleased {
                floor_id: self.floor_id.clone(),
                agent_id: agent_id.to_string(),
                timestamp: self.now(),
            });
        }
        released
    }

    pub fn get_active_destinations(&mut self) -> Vec<Reservation> {
        let active = self.registry.get_active_destinations();
        self.record_expired();
        active
    }

    pub fn registry(&self) -> &DestinationRegistry {
        &self.registry
    }

    // --- events -----------------------------------------------------------

    pub fn uncommitted_events(&self) -> &VecDeque<NavigationEvent> {
        &self.uncommitted_events
    }

    pub fn mark_events_as_committed(&mut self) {
        self.uncommitted_events.clear();
    }

    pub fn take_events(&mut self) -> Vec<NavigationEvent> {
        self.uncommitted_events.drain(..).collect()
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn add_event(&mut self, event: NavigationEvent) {
        if self.settings.event_capacity == 0 {
            return;
        }
        while self.uncommitted_events.len() >= self.settings.event_capacity {
            if let Some(dropped) = self.uncommitted_events.pop_front() {
                self.logger.debug(&format!(
                    "[{}] event buffer full, dropping {}",
                    self.floor_id,
                    dropped.event_type()
                ));
            }
        }
        self.uncommitted_events.push_back(event);
    }

    fn record_reserved(&mut self, requested: WorldPoint, reservation: &Reservation) {
        self.add_event(NavigationEvent::DestinationReserved {
            floor_id: self.floor_id.clone(),
            agent_id: reservation.agent_id.clone(),
            requested,
            position: reservation.position,
            expires_at: reservation.expires_at,
            timestamp: reservation.reserved_at,
        });
    }

    fn record_expired(&mut self) {
        let expired = self.registry.take_expired();
        if expired.is_empty() {
            return;
        }
        self.add_event(NavigationEvent::ReservationsExpired {
            floor_id: self.floor_id.clone(),
            agent_ids: expired.into_iter().map(|r| r.agent_id).collect(),
            timestamp: self.now(),
        });
    }
}
