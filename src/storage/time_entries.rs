//! Time entry repository

use crate::model::{NewTimeEntry, TimeEntry, TimeEntryPatch};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::{SetClause, new_id, now};

pub struct TimeEntryRepository;

impl TimeEntryRepository {
    pub fn find_by_id(&self, conn: &Connection, id: &str) -> Result<Option<TimeEntry>> {
        conn.query_row(
            "SELECT id, task_id, user_id, started_at, ended_at, note, created_at, updated_at
             FROM time_entries WHERE id = ?1",
            [id],
            row_to_time_entry,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Entries tracked against a task, oldest first
    pub fn find_by_task(&self, conn: &Connection, task_id: &str) -> Result<Vec<TimeEntry>> {
        let mut stmt = conn.prepare(
            "SELECT id, task_id, user_id, started_at, ended_at, note, created_at, updated_at
             FROM time_entries WHERE task_id = ?1 ORDER BY started_at ASC",
        )?;

        let entries = stmt.query_map([task_id], row_to_time_entry)?.filter_map(|r| r.ok()).collect();
        Ok(entries)
    }

    /// The user's open interval, if a timer is running
    pub fn find_running(&self, conn: &Connection, user_id: &str) -> Result<Option<TimeEntry>> {
        conn.query_row(
            "SELECT id, task_id, user_id, started_at, ended_at, note, created_at, updated_at
             FROM time_entries WHERE user_id = ?1 AND ended_at IS NULL
             ORDER BY started_at DESC LIMIT 1",
            [user_id],
            row_to_time_entry,
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn create(&self, conn: &Connection, new: NewTimeEntry) -> Result<TimeEntry> {
        let id = new_id();
        let ts = now();
        conn.execute(
            "INSERT INTO time_entries (id, task_id, user_id, started_at, ended_at, note, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, ?7)",
            params![id, new.task_id, new.user_id, new.started_at, new.note, ts, ts],
        )?;
        self.find_by_id(conn, &id)?.ok_or(Error::CreationFailed("time entry"))
    }

    pub fn update(&self, conn: &Connection, id: &str, patch: TimeEntryPatch) -> Result<TimeEntry> {
        let mut sets = SetClause::new();
        if let Some(ended_at) = patch.ended_at {
            sets.push("ended_at", ended_at);
        }
        if let Some(note) = patch.note {
            sets.push("note", note);
        }
        sets.push("updated_at", now());

        let sql = format!("UPDATE time_entries SET {} WHERE id = ?", sets.sql());
        let affected = conn.execute(&sql, &sets.params_with(&[&id])[..])?;
        if affected == 0 {
            return Err(Error::NotFound("time entry", id.to_string()));
        }
        self.find_by_id(conn, id)?
            .ok_or_else(|| Error::NotFound("time entry", id.to_string()))
    }

    /// Close an open interval
    pub fn stop(&self, conn: &Connection, id: &str, ended_at: DateTime<Utc>) -> Result<TimeEntry> {
        self.update(
            conn,
            id,
            TimeEntryPatch { ended_at: Some(Some(ended_at)), ..Default::default() },
        )
    }

    /// Hard delete; time entries are not soft-deletable
    pub fn delete(&self, conn: &Connection, id: &str) -> Result<()> {
        conn.execute("DELETE FROM time_entries WHERE id = ?1", [id])?;
        Ok(())
    }

    pub fn count_by_task(&self, conn: &Connection, task_id: &str) -> Result<i64> {
        conn.query_row("SELECT COUNT(*) FROM time_entries WHERE task_id = ?1", [task_id], |row| {
            row.get(0)
        })
        .map_err(Into::into)
    }
}

fn row_to_time_entry(row: &rusqlite::Row) -> rusqlite::Result<TimeEntry> {
    Ok(TimeEntry {
        id: row.get(0)?,
        task_id: row.get(1)?,
        user_id: row.get(2)?,
        started_at: row.get(3)?,
        ended_at: row.get(4)?,
        note: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
