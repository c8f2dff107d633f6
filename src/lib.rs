//! # Tasklog - Task & Time Tracking Data Layer
//!
//! Local-first persistence layer for a task/time-tracking application.
//!
//! Tasklog provides:
//! - SQLite schema for users, workspaces, projects, tasks, time entries,
//!   scheduled events, points ledger, daily summaries and preferences
//! - Repositories mapping rows to domain objects over an injected
//!   connection, so callers can compose calls inside one transaction
//! - An auth provider wrapping a hosted identity service
//! - A sync connector feeding queued local mutations to a remote store

pub mod auth;
pub mod config;
pub mod model;
pub mod storage;
pub mod sync;

// Re-exports for convenient access
pub use auth::{AuthProvider, Session};
pub use model::{Task, TaskStatus, TimeEntry, User, Workspace};
pub use storage::Database;
pub use sync::SyncConnector;

/// Result type alias for Tasklog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Tasklog operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    #[error("failed to create {0}: row missing after insert")]
    CreationFailed(&'static str),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid session payload: {0}")]
    InvalidSession(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
