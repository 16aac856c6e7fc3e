//! Telemetry event as buffered and submitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An event waiting for batched delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedEvent {
    pub id: String,
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
}

impl QueuedEvent {
    pub fn new(payload: serde_json::Value) -> Self {
        Self::new_at(payload, Utc::now())
    }

    pub fn new_at(payload: serde_json::Value, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            payload,
            enqueued_at: now,
        }
    }
}

/// Wire body of a batch submission.
#[derive(Debug, Serialize)]
pub struct EventBatch<'a> {
    pub events: &'a [QueuedEvent],
}
