//! Scheduled calendar events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar block, optionally tied to a task and mirrored to an
/// external calendar via `external_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub id: String,
    pub user_id: String,
    pub task_id: Option<String>,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Correlation id assigned by the external calendar system
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewScheduledEvent {
    pub user_id: String,
    pub task_id: Option<String>,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduledEventPatch {
    pub title: Option<String>,
    pub task_id: Option<Option<String>>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub external_id: Option<Option<String>>,
}
