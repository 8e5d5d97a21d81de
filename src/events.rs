//! Event Log Module
//!
//! Bounded, newest-first history of analytics events. Constructed once at
//! startup and handed to whatever needs to record or read events.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

/// Default number of events retained.
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

// == Event Record ==
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub at: DateTime<Utc>,
    pub message: String,
}

impl EventRecord {
    /// Renders as `[<rfc3339>] <message>`.
    pub fn line(&self) -> String {
        format!("[{}] {}", self.at.to_rfc3339(), self.message)
    }
}

// == Event Log ==
/// Shared event history. Clones record into the same log.
///
/// Events are stored in a VecDeque where:
/// - Front = most recent event
/// - Back = oldest event, dropped first once capacity is reached
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Arc<RwLock<VecDeque<EventRecord>>>,
    capacity: usize,
}

impl EventLog {
    /// Creates an empty log keeping at most `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    // == Record ==
    /// Appends an event stamped now, evicting the oldest past capacity.
    pub async fn record(&self, message: impl Into<String>) {
        let record = EventRecord {
            at: Utc::now(),
            message: message.into(),
        };
        info!(event = %record.message, "analytics");

        if self.capacity == 0 {
            return;
        }
        let mut events = self.events.write().await;
        events.push_front(record);
        events.truncate(self.capacity);
    }

    // == History ==
    /// Snapshot of the retained events, newest first.
    pub async fn history(&self) -> Vec<EventRecord> {
        self.events.read().await.iter().cloned().collect()
    }

    // == Clear ==
    pub async fn clear(&self) {
        self.events.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
