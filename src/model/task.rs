//! Task types and tasks
//!
//! A task always belongs to a project and may nest one level of
//! structure via `parent_task_id`; children are resolved by a derived
//! lookup, never materialized as an object graph.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Captured but not yet planned
    Backlog,
    /// Planned for work
    Todo,
    /// Actively being worked on
    InProgress,
    /// Waiting on something external
    Blocked,
    /// Finished
    Done,
}

impl TaskStatus {
    /// Get the string representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Backlog => "backlog",
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Done => "done",
        }
    }

    /// Get all statuses
    pub fn all() -> &'static [TaskStatus] {
        &[
            TaskStatus::Backlog,
            TaskStatus::Todo,
            TaskStatus::InProgress,
            TaskStatus::Blocked,
            TaskStatus::Done,
        ]
    }

    /// Whether the status counts as open work
    pub fn is_open(&self) -> bool {
        !matches!(self, TaskStatus::Done)
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "backlog" => Ok(TaskStatus::Backlog),
            "todo" | "to_do" => Ok(TaskStatus::Todo),
            "in_progress" | "inprogress" | "doing" => Ok(TaskStatus::InProgress),
            "blocked" => Ok(TaskStatus::Blocked),
            "done" | "completed" => Ok(TaskStatus::Done),
            _ => Err(Error::Parse(format!("Unknown task status: {}", s))),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user-defined task category, optionally scoped to a workspace.
///
/// At most one type per user carries `is_default`; the repository's
/// `set_default` enforces that with a two-statement sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskType {
    pub id: String,
    pub user_id: String,
    /// Workspace scope; personal to the user when `None`
    pub workspace_id: Option<String>,
    pub name: String,
    pub icon: Option<String>,
    pub is_default: bool,
    /// Position in the user's ordered type list
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTaskType {
    pub user_id: String,
    pub workspace_id: Option<String>,
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskTypePatch {
    pub name: Option<String>,
    pub icon: Option<Option<String>>,
    pub workspace_id: Option<Option<String>>,
}

/// A unit of work inside a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub user_id: String,
    /// Parent for subtasks; root tasks carry `None`
    pub parent_task_id: Option<String>,
    pub task_type_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    /// Progress percentage, 0-100
    pub progress: i64,
    pub due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub project_id: String,
    pub user_id: String,
    pub parent_task_id: Option<String>,
    pub task_type_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_at: Option<DateTime<Utc>>,
}

impl NewTask {
    /// Minimal constructor; remaining fields default to empty/backlog
    pub fn new(
        project_id: impl Into<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            user_id: user_id.into(),
            parent_task_id: None,
            task_type_id: None,
            title: title.into(),
            description: None,
            status: TaskStatus::Backlog,
            due_at: None,
        }
    }

    pub fn with_parent(mut self, parent_task_id: impl Into<String>) -> Self {
        self.parent_task_id = Some(parent_task_id.into());
        self
    }

    pub fn with_type(mut self, task_type_id: impl Into<String>) -> Self {
        self.task_type_id = Some(task_type_id.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub progress: Option<i64>,
    pub parent_task_id: Option<Option<String>>,
    pub task_type_id: Option<Option<String>>,
    pub due_at: Option<Option<DateTime<Utc>>>,
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in TaskStatus::all() {
            let s = status.as_str();
            let parsed: TaskStatus = s.parse().unwrap();
            assert_eq!(*status, parsed);
        }
    }

    #[test]
    fn test_status_aliases() {
        assert_eq!(TaskStatus::from_str("doing").unwrap(), TaskStatus::InProgress);
        assert_eq!(TaskStatus::from_str("completed").unwrap(), TaskStatus::Done);
        assert!(TaskStatus::from_str("bogus").is_err());
    }

    #[test]
    fn test_open_statuses() {
        assert!(TaskStatus::Backlog.is_open());
        assert!(TaskStatus::Blocked.is_open());
        assert!(!TaskStatus::Done.is_open());
    }

    #[test]
    fn test_new_task_builder() {
        let task = NewTask::new("proj-1", "user-1", "Write report")
            .with_parent("task-0")
            .with_type("type-1");

        assert_eq!(task.status, TaskStatus::Backlog);
        assert_eq!(task.parent_task_id.as_deref(), Some("task-0"));
        assert_eq!(task.task_type_id.as_deref(), Some("type-1"));
    }
}
