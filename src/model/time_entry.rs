//! Time entries - tracked intervals against a task

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked interval. The interval is open while `ended_at` is `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: String,
    pub task_id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeEntry {
    /// Whether the timer is still running
    pub fn is_running(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Elapsed seconds for closed entries; `None` while running
    pub fn duration_seconds(&self) -> Option<i64> {
        self.ended_at.map(|end| (end - self.started_at).num_seconds())
    }
}

#[derive(Debug, Clone)]
pub struct NewTimeEntry {
    pub task_id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TimeEntryPatch {
    pub ended_at: Option<Option<DateTime<Utc>>>,
    pub note: Option<Option<String>>,
}
