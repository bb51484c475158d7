use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::common::ApplicationResult;
use crate::domains::navigation::{
    FloorLayout, FloorLayoutSource, GridSnapshot, NavigationContext, NavigationEvent, Reservation, WorldPoint,
};

/// A settled destination and the route to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationPlan {
    pub agent_id: String,
    pub requested: WorldPoint,
    pub destination: WorldPoint,
    pub waypoints: Vec<WorldPoint>,
}

/// Navigation-intent layer: arbitrates a destination, then routes to it.
pub struct NavigationService {
    context: NavigationContext,
    layouts: Arc<dyn FloorLayoutSource>,
    event_sender: Option<mpsc::Sender<NavigationEvent>>,
}

impl NavigationService {
    pub fn new(context: NavigationContext, layouts: Arc<dyn FloorLayoutSource>) -> Self {
        Self {
            context,
            layouts,
            event_sender: None,
        }
    }

    /// Publishes drained domain events on `sender` after every call.
    pub fn with_event_sender(mut self, sender: mpsc::Sender<NavigationEvent>) -> Self {
        self.event_sender = Some(sender);
        self
    }

    pub fn context(&self) -> &NavigationContext {
        &self.context
    }

    pub fn load_floor(&mut self, name: &str) -> ApplicationResult<()> {
        let layout = self.layouts.load_layout(name)?;
        tracing::info!("Loaded floor layout {} ({} obstacles)", name, layout.obstacles.len());
        self.apply_layout(&layout)
    }

    pub fn apply_layout(&mut self, layout: &FloorLayout) -> ApplicationResult<()> {
        let result = self.context.initialize_layout(layout);
        self.publish();
        Ok(result?)
    }

    /// Picks a free destination near `target` for `agent_id` and plans a
    /// path there from `from`. When no path exists the reservation is
    /// released again, so an agent that stays put holds no spot.
    pub fn navigate(&mut self, agent_id: &str, from: WorldPoint, target: WorldPoint) -> ApplicationResult<NavigationPlan> {
        let destination = self.context.find_available_destination(target, agent_id);
        let outcome = self.context.find_path(from, destination);
        if outcome.is_err() {
            self.context.release(agent_id);
        }
        self.publish();

        let waypoints = outcome?;
        tracing::debug!(
            "Agent {} heads to {} via {} waypoints",
            agent_id,
            destination,
            waypoints.len()
        );
        Ok(NavigationPlan {
            agent_id: agent_id.to_string(),
            requested: target,
            destination,
            waypoints,
        })
    }

    /// Sends an idle agent to a random walkable spot. `None` when the floor
    /// has no walkable cell or no grid yet.
    pub fn wander<R: Rng + ?Sized>(
        &mut self,
        agent_id: &str,
        from: WorldPoint,
        rng: &mut R,
    ) -> ApplicationResult<Option<NavigationPlan>> {
        match self.context.random_walkable_point(rng) {
            Some(target) => self.navigate(agent_id, from, target).map(Some),
            None => Ok(None),
        }
    }

    /// Frees the agent's destination on arrival or cancellation.
    pub fn arrive(&mut self, agent_id: &str) -> bool {
        let released = self.context.release(agent_id);
        self.publish();
        released
    }

    pub fn active_destinations(&mut self) -> Vec<Reservation> {
        let active = self.context.get_active_destinations();
        self.publish();
        active
    }

    pub fn grid_data(&self) -> Option<GridSnapshot> {
        self.context.grid_data()
    }

    fn publish(&mut self) {
        let events = self.context.take_events();
        let Some(sender) = &self.event_sender else {
            return;
        };
        for event in events {
            match sender.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(dropped)) => {
                    tracing::warn!("Navigation event channel full, dropping {:?}", dropped);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::warn!("Navigation event channel closed, no longer publishing");
                    self.event_sender = None;
                    return;
                }
            }
        }
    }
}
