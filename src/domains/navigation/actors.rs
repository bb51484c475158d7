use crate::common::{DomainEvent, EventEnvelope, EventMetadata};
use super::events::NavigationEvent;
use super::projections::{NavigationProjection, NavigationProjectionStore};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Envelopes kept in the journal before the oldest are dropped.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 4096;

/// Consumes navigation events off the channel, wraps each in an
/// [`EventEnvelope`] and keeps per-floor projections and a bounded journal
/// of the most recent envelopes.
pub struct NavigationEventActor {
    projection_store: Arc<RwLock<NavigationProjectionStore>>,
    journal: Arc<RwLock<VecDeque<EventEnvelope>>>,
    journal_capacity: usize,
    event_receiver: mpsc::Receiver<NavigationEvent>,
}

/// Cheap cloneable read handle onto a running [`NavigationEventActor`].
#[derive(Clone)]
pub struct NavigationEventView {
    projection_store: Arc<RwLock<NavigationProjectionStore>>,
    journal: Arc<RwLock<VecDeque<EventEnvelope>>>,
}

impl NavigationEventActor {
    pub fn new(event_receiver: mpsc::Receiver<NavigationEvent>) -> Self {
        Self::with_journal_capacity(event_receiver, DEFAULT_JOURNAL_CAPACITY)
    }

    /// Keeps at most `journal_capacity` envelopes (at least one).
    pub fn with_journal_capacity(event_receiver: mpsc::Receiver<NavigationEvent>, journal_capacity: usize) -> Self {
        Self {
            projection_store: Arc::new(RwLock::new(NavigationProjectionStore::new())),
            journal: Arc::new(RwLock::new(VecDeque::new())),
            journal_capacity: journal_capacity.max(1),
            event_receiver,
        }
    }

    pub fn view(&self) -> NavigationEventView {
        NavigationEventView {
            projection_store: self.projection_store.clone(),
            journal: self.journal.clone(),
        }
    }

    /// Runs until every sender is dropped.
    pub async fn run(&mut self) {
        while let Some(event) = self.event_receiver.recv().await {
            if let Err(e) = self.handle_event(event).await {
                tracing::error!("Failed to handle navigation event: {}", e);
            }
        }
    }

    async fn handle_event(&self, event: NavigationEvent) -> Result<(), String> {
        let mut metadata = EventMetadata::from_source("NavigationEventActor");
        metadata.agent_id = event.agent_id().map(str::to_string);
        let envelope = EventEnvelope::new(&event, "FloorNavigation", metadata)
            .map_err(|e| format!("Failed to create event envelope: {}", e))?;

        self.projection_store
            .write()
            .await
            .apply_event(event.aggregate_id(), &event);
        {
            let mut journal = self.journal.write().await;
            if journal.len() >= self.journal_capacity {
                journal.pop_front();
            }
            journal.push_back(envelope);
        }

        tracing::debug!("Handled navigation event: {}", event.event_type());
        Ok(())
    }
}

impl NavigationEventView {
    pub async fn projection(&self, floor_id: &str) -> Option<NavigationProjection> {
        self.projection_store.read().await.floors.get(floor_id).cloned()
    }

    pub async fn journal(&self) -> Vec<EventEnvelope> {
        self.journal.read().await.iter().cloned().collect()
    }
}
