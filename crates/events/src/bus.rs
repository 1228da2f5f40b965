//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the hub between job handlers and downstream routing.
//! It is designed to be shared via `Arc<EventBus>` across the worker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// RouterEvent
// ---------------------------------------------------------------------------

/// Event type dispatched when acknowledgement workflows should be
/// started for a batch of sampled transactions.
pub const ACK_WORKFLOWS_REQUESTED: &str = "acknowledgement.workflows.requested";

/// An event routed to downstream processing inside this process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterEvent {
    /// Dot-separated event name, e.g. [`ACK_WORKFLOWS_REQUESTED`].
    pub event_type: String,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl RouterEvent {
    /// Create a new event with an empty payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// AckWorkflowsRequested
// ---------------------------------------------------------------------------

/// Request to start acknowledgement workflows for sampled transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckWorkflowsRequested {
    /// Batch the sampled transactions belong to.
    pub batch_id: String,
    /// Transaction ids to acknowledge.
    pub transaction_ids: Vec<String>,
}

impl AckWorkflowsRequested {
    /// Wrap this payload in a [`RouterEvent`] envelope.
    pub fn into_event(self) -> RouterEvent {
        let payload =
            serde_json::to_value(&self).expect("AckWorkflowsRequested is always serialisable");
        RouterEvent::new(ACK_WORKFLOWS_REQUESTED).with_payload(payload)
    }

    /// Decode the payload back out of an event envelope.
    pub fn from_event(event: &RouterEvent) -> Result<Self, serde_json::Error> {
        serde_json::from_value(event.payload.clone())
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// Error returned by [`EventBus::dispatch`] when an event cannot reach
/// any subscriber.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No subscriber is attached, so the event would be lost.
    #[error("no subscribers registered on the event router")]
    NoSubscribers,
}

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`RouterEvent`].
pub struct EventBus {
    sender: broadcast::Sender<RouterEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are
    /// dropped and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers, dropping it
    /// silently when there are none. For fire-and-forget callers.
    pub fn publish(&self, event: RouterEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Publish an event that must reach at least one subscriber.
    ///
    /// Returns the number of subscribers the event was delivered to.
    /// Job handlers use this so that a lost dispatch surfaces as a job
    /// failure instead of vanishing.
    pub fn dispatch(&self, event: RouterEvent) -> Result<usize, DispatchError> {
        self.sender
            .send(event)
            .map_err(|_| DispatchError::NoSubscribers)
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<RouterEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
