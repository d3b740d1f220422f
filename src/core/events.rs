//! List change notifications
//!
//! The [`ListEventBus`] lets presentation code re-render when a list changes
//! without polling the view-model. It uses `tokio::sync::broadcast`, so any
//! number of subscribers can listen and publishing never blocks.
//!
//! ```text
//! ListController ──▶ ListEventBus::publish() ──▶ broadcast channel ──▶ table widget
//!                                                                 ──▶ status counters
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

/// Something changed in one list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ListEvent {
    /// The collection was replaced by a fetch
    Loaded { entity: String, count: usize },
    /// A record was patched after the backend confirmed
    Updated {
        entity: String,
        id: String,
        patch: serde_json::Value,
    },
    /// A record was removed after the backend confirmed
    Removed { entity: String, id: String },
    /// Filters or sort changed; `visible` is the new view length
    FiltersChanged { entity: String, visible: usize },
    /// An operation failed and the user was told
    Failed {
        entity: String,
        id: Option<String>,
        code: String,
        message: String,
    },
}

impl ListEvent {
    pub fn entity(&self) -> &str {
        match self {
            ListEvent::Loaded { entity, .. }
            | ListEvent::Updated { entity, .. }
            | ListEvent::Removed { entity, .. }
            | ListEvent::FiltersChanged { entity, .. }
            | ListEvent::Failed { entity, .. } => entity,
        }
    }

    pub fn record_id(&self) -> Option<&str> {
        match self {
            ListEvent::Updated { id, .. } | ListEvent::Removed { id, .. } => Some(id),
            ListEvent::Failed { id, .. } => id.as_deref(),
            _ => None,
        }
    }
}

/// Envelope wrapping a list event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: ListEvent,
}

impl EventEnvelope {
    pub fn new(event: ListEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based bus for list events
///
/// Cheap to clone; clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct ListEventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl ListEventBus {
    /// Create a bus buffering up to `capacity` events per slow subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of receivers; zero when nobody listens.
    pub fn publish(&self, event: ListEvent) -> usize {
        self.sender.send(EventEnvelope::new(event)).unwrap_or(0)
    }

    /// Receive all events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Same as [`subscribe`](Self::subscribe) but as a `Stream`
    pub fn subscribe_stream(&self) -> BroadcastStream<EventEnvelope> {
        BroadcastStream::new(self.sender.subscribe())
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ListEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
