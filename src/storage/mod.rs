//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite; see [`schema`] for the table set.
//!
//! Repositories are stateless service objects. Every method takes an
//! injected `&Connection` so a caller can run several repository calls
//! inside one transaction (`Transaction` derefs to `Connection`).
//! Repositories never begin transactions themselves.

pub mod schema;

pub mod events;
pub mod points;
pub mod preferences;
pub mod projects;
pub mod subscriptions;
pub mod summaries;
pub mod task_types;
pub mod tasks;
pub mod time_entries;
pub mod users;
pub mod workspaces;

pub use events::ScheduledEventRepository;
pub use points::PointsLedgerRepository;
pub use preferences::UserPreferencesRepository;
pub use projects::ProjectRepository;
pub use subscriptions::{RoleRepository, SubscriptionRepository};
pub use summaries::DailySummaryRepository;
pub use task_types::TaskTypeRepository;
pub use tasks::TaskRepository;
pub use time_entries::TimeEntryRepository;
pub use users::UserRepository;
pub use workspaces::WorkspaceRepository;

use crate::Result;
use chrono::{DateTime, Utc};
use rusqlite::types::ToSql;
use rusqlite::{Connection, Transaction};
use std::path::Path;

/// Owned database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Borrow the connection to pass into repository calls
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Start a transaction. Repository calls made through it commit or
    /// roll back together.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}

/// Generate a fresh row id
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current timestamp used for created_at/updated_at stamps
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Accumulates `column = ?` fragments and their values for a partial
/// UPDATE. Placeholders are positional; push order is bind order.
pub(crate) struct SetClause {
    fragments: Vec<String>,
    values: Vec<Box<dyn ToSql>>,
}

impl SetClause {
    pub(crate) fn new() -> Self {
        Self { fragments: Vec::new(), values: Vec::new() }
    }

    pub(crate) fn push(&mut self, column: &str, value: impl ToSql + 'static) {
        self.fragments.push(format!("{} = ?", column));
        self.values.push(Box::new(value));
    }

    pub(crate) fn sql(&self) -> String {
        self.fragments.join(", ")
    }

    /// Values in push order, followed by `trailing` (the WHERE binds)
    pub(crate) fn params_with<'a>(
        &'a self,
        trailing: &'a [&'a dyn ToSql],
    ) -> Vec<&'a dyn ToSql> {
        let mut params: Vec<&dyn ToSql> = self.values.iter().map(|v| v.as_ref()).collect();
        params.extend_from_slice(trailing);
        params
    }
}
