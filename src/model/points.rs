//! Points ledger entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An append-only ledger line. Points are signed; spending is negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsEntry {
    pub id: String,
    pub user_id: String,
    pub task_id: Option<String>,
    pub time_entry_id: Option<String>,
    pub points: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPointsEntry {
    pub user_id: String,
    pub task_id: Option<String>,
    pub time_entry_id: Option<String>,
    pub points: i64,
    pub reason: String,
}
