//! Per-day rollups of tracked work

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One row per (user, date). Aggregates are recomputed by callers; this
/// layer only stores them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub tracked_seconds: i64,
    pub tasks_completed: i64,
    pub points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDailySummary {
    pub user_id: String,
    pub date: NaiveDate,
    pub tracked_seconds: i64,
    pub tasks_completed: i64,
    pub points: i64,
}

#[derive(Debug, Clone, Default)]
pub struct DailySummaryPatch {
    pub tracked_seconds: Option<i64>,
    pub tasks_completed: Option<i64>,
    pub points: Option<i64>,
}
