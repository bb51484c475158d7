use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use super::clock::DynClock;
use super::types::WorldPoint;
use crate::domains::logger::DynLogger;

/// Probe directions, in degrees, tried at every radius.
/// Expired reservations held for [`DestinationRegistry::take_expired`];
/// older ones are discarded past this count.
pub const EXPIRED_BACKLOG_CAPACITY: usize = 256;

pub const PROBE_ANGLES_DEG: [f64; 8] = [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0];

const SAME_POINT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub agent_id: String,
    pub position: WorldPoint,
    pub reserved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Reservation {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReservationPolicy {
    pub default_duration_ms: u64,
    /// Two reservations closer than this conflict.
    pub min_separation: f64,
    pub max_attempts: usize,
    /// Probe radius for attempt `n` is `min_separation * (1 + radius_growth * n)`.
    pub radius_growth: f64,
}

impl ReservationPolicy {
    pub fn probe_radius(&self, attempt: usize) -> f64 {
        self.min_separation * (1.0 + self.radius_growth * attempt as f64)
    }
}

impl Default for ReservationPolicy {
    fn default() -> Self {
        Self {
            default_duration_ms: 15_000,
            min_separation: 1.0,
            max_attempts: 8,
            radius_growth: 0.5,
        }
    }
}

/// How a destination request was settled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ArbitrationKind {
    /// The requested point was free.
    Requested,
    /// A probe point replaced the requested one.
    Probed { attempt: usize, angle_deg: f64 },
    /// Nothing free was found; the requested point was reserved anyway.
    Exhausted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arbitration {
    pub requested: WorldPoint,
    pub position: WorldPoint,
    pub kind: ArbitrationKind,
    pub reservation: Reservation,
}

/// Short-lived destination claims, one per agent.
///
/// Expiry is lazy: every public call first drops reservations whose time is
/// up. Dropped reservations are kept aside until [`take_expired`] collects
/// them, at most [`EXPIRED_BACKLOG_CAPACITY`] of the most recent.
///
/// [`take_expired`]: DestinationRegistry::take_expired
pub struct DestinationRegistry {
    reservations: BTreeMap<String, Reservation>,
    expired: VecDeque<Reservation>,
    policy: ReservationPolicy,
    clock: DynClock,
    logger: DynLogger,
}

impl DestinationRegistry {
    pub fn new(policy: ReservationPolicy, clock: DynClock, logger: DynLogger) -> Self {
        Self {
            reservations: BTreeMap::new(),
            expired: VecDeque::new(),
            policy,
            clock,
            logger,
        }
    }

    pub fn policy(&self) -> &ReservationPolicy {
        &self.policy
    }

    /// Reserves `position` for the default duration.
    pub fn reserve(&mut self, position: WorldPoint, agent_id: &str) -> Reservation {
        self.reserve_for(position, agent_id, self.policy.default_duration_ms)
    }

    /// Reserves `position` for `duration_ms`, replacing the agent's previous
    /// reservation.
    pub fn reserve_for(&mut self, position: WorldPoint, agent_id: &str, duration_ms: u64) -> Reservation {
        self.purge_expired();
        let now = self.clock.now();
        let duration = Duration::milliseconds(i64::try_from(duration_ms).unwrap_or(i64::MAX));
        let reservation = Reservation {
            agent_id: agent_id.to_string(),
            position,
            reserved_at: now,
            expires_at: now.checked_add_signed(duration).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        self.reservations.insert(agent_id.to_string(), reservation.clone());
        reservation
    }

    pub fn find_available_destination(&mut self, requested: WorldPoint, agent_id: &str) -> WorldPoint {
        self.arbitrate(requested, agent_id, self.policy.max_attempts).position
    }

    pub fn find_available_destination_with_attempts(
        &mut self,
        requested: WorldPoint,
        agent_id: &str,
        max_attempts: usize,
    ) -> WorldPoint {
        self.arbitrate(requested, agent_id, max_attempts).position
    }

    pub fn arbitrate(&mut self, requested: WorldPoint, agent_id: &str, max_attempts: usize) -> Arbitration {
        self.arbitrate_where(requested, agent_id, max_attempts, |_| true)
    }

    /// Settles a destination for `agent_id` and reserves it.
    ///
    /// Probe points must also satisfy `accept`; the requested point itself is
    /// only checked against other agents' reservations.
    pub fn arbitrate_where<F>(
        &mut self,
        requested: WorldPoint,
        agent_id: &str,
        max_attempts: usize,
        accept: F,
    ) -> Arbitration
    where
        F: Fn(&WorldPoint) -> bool,
    {
        self.purge_expired();

        if !self.is_occupied(&requested, agent_id) {
            return Arbitration {
                requested,
                position: requested,
                kind: ArbitrationKind::Requested,
                reservation: self.reserve(requested, agent_id),
            };
        }

        let mut tested = vec![requested];
        for attempt in 1..=max_attempts {
            let radius = self.policy.probe_radius(attempt);
            for angle_deg in PROBE_ANGLES_DEG {
                let angle = angle_deg.to_radians();
                let candidate = WorldPoint::new(
                    requested.x + radius * angle.cos(),
                    requested.y,
                    requested.z + radius * angle.sin(),
                );
                if tested.iter().any(|t| t.distance(&candidate) < SAME_POINT_EPSILON) {
                    continue;
                }
                tested.push(candidate);
                if !accept(&candidate) || self.is_occupied(&candidate, agent_id) {
                    continue;
                }
                return Arbitration {
                    requested,
                    position: candidate,
                    kind: ArbitrationKind::Probed { attempt, angle_deg },
                    reservation: self.reserve(candidate, agent_id),
                };
            }
        }

        self.logger.warn(&format!(
            "no free destination near {} for agent {} after {} attempts; reserving it anyway",
            requested, agent_id, max_attempts
        ));
        Arbitration {
            requested,
            position: requested,
            kind: ArbitrationKind::Exhausted,
            reservation: self.reserve(requested, agent_id),
        }
    }

    /// Drops every reservation held by `agent_id`. Returns whether one existed.
    pub fn release(&mut self, agent_id: &str) -> bool {
        self.purge_expired();
        self.reservations.remove(agent_id).is_some()
    }

    /// Unexpired reservations, ordered by agent id.
    pub fn get_active_destinations(&mut self) -> Vec<Reservation> {
        self.purge_expired();
        self.reservations.values().cloned().collect()
    }

    /// Whether another agent's reservation is closer than the minimum
    /// separation. The caller's own reservation never counts.
    pub fn is_available(&mut self, position: &WorldPoint, agent_id: &str) -> bool {
        self.purge_expired();
        !self.is_occupied(position, agent_id)
    }

    /// Reservations dropped by expiry since the last call.
    pub fn take_expired(&mut self) -> Vec<Reservation> {
        self.expired.drain(..).collect()
    }

    fn is_occupied(&self, position: &WorldPoint, agent_id: &str) -> bool {
        let min = self.policy.min_separation;
        self.reservations
            .values()
            .any(|r| r.agent_id != agent_id && r.position.distance(position) < min)
    }

    fn purge_expired(&mut self) {
        let now = self.clock.now();
        let expired_ids: Vec<String> = self
            .reservations
            .values()
            .filter(|r| r.is_expired(now))
            .map(|r| r.agent_id.clone())
            .collect();
        for id in expired_ids {
            if let Some(reservation) = self.reservations.remove(&id) {
                self.logger
                    .debug(&format!("reservation of agent {} at {} expired", id, reservation.position));
                if self.expired.len() == EXPIRED_BACKLOG_CAPACITY {
                    self.expired.pop_front();
                }
                self.expired.push_back(reservation);
            }
        }
    }
}
