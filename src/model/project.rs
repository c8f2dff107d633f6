//! Project domain type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project inside a workspace; tasks hang off it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub workspace_id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Display color, hex string
    pub color: Option<String>,
    /// Completion percentage, 0-100
    pub completion: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub workspace_id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub color: Option<Option<String>>,
    pub completion: Option<i64>,
}
