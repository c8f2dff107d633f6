//! Roles, subscriptions and the subscription audit log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A subscription tier. Numeric limits are `None` for unlimited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    /// Tier name, unique (e.g. "free", "pro")
    pub name: String,
    pub price_cents: i64,
    pub max_workspaces: Option<i64>,
    pub max_projects: Option<i64>,
    pub max_tasks: Option<i64>,
    pub can_sync: bool,
    pub can_reports: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
    pub price_cents: i64,
    pub max_workspaces: Option<i64>,
    pub max_projects: Option<i64>,
    pub max_tasks: Option<i64>,
    pub can_sync: bool,
    pub can_reports: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RolePatch {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub max_workspaces: Option<Option<i64>>,
    pub max_projects: Option<Option<i64>>,
    pub max_tasks: Option<Option<i64>>,
    pub can_sync: Option<bool>,
    pub can_reports: Option<bool>,
}

/// The one active subscription a user holds (unique per user)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSubscription {
    pub id: String,
    pub user_id: String,
    pub role_id: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUserSubscription {
    pub user_id: String,
    pub role_id: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct UserSubscriptionPatch {
    pub role_id: Option<String>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

/// Append-only audit record of a role or price change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionHistoryEntry {
    pub id: String,
    pub user_id: String,
    pub role_id: String,
    pub price_cents: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for appending to the history log
#[derive(Debug, Clone)]
pub struct SubscriptionChange {
    pub user_id: String,
    pub role_id: String,
    pub price_cents: i64,
    pub note: Option<String>,
}

impl Role {
    /// Whether this tier caps the number of projects
    pub fn limits_projects(&self) -> bool {
        self.max_projects.is_some()
    }
}
