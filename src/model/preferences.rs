//! Per-user preferences (primary key = user id)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: String,
    /// IANA timezone name
    pub timezone: String,
    /// 0 = Sunday, 1 = Monday
    pub week_starts_on: i64,
    pub theme: String,
    pub daily_goal_minutes: Option<i64>,
    pub notifications_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUserPreferences {
    pub user_id: String,
    pub timezone: String,
    pub week_starts_on: i64,
    pub theme: String,
    pub daily_goal_minutes: Option<i64>,
    pub notifications_enabled: bool,
}

impl NewUserPreferences {
    /// Defaults applied when a user first signs in
    pub fn defaults_for(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            timezone: "UTC".to_string(),
            week_starts_on: 1,
            theme: "system".to_string(),
            daily_goal_minutes: None,
            notifications_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserPreferencesPatch {
    pub timezone: Option<String>,
    pub week_starts_on: Option<i64>,
    pub theme: Option<String>,
    pub daily_goal_minutes: Option<Option<i64>>,
    pub notifications_enabled: Option<bool>,
}
