//! Scheduled event repository

use crate::model::{NewScheduledEvent, ScheduledEvent, ScheduledEventPatch};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::{SetClause, new_id, now};

pub struct ScheduledEventRepository;

impl ScheduledEventRepository {
    pub fn find_by_id(&self, conn: &Connection, id: &str) -> Result<Option<ScheduledEvent>> {
        conn.query_row(
            "SELECT id, user_id, task_id, title, starts_at, ends_at, external_id, created_at, updated_at
             FROM scheduled_events WHERE id = ?1",
            [id],
            row_to_event,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Resolve an event by the id the external calendar assigned to it
    pub fn find_by_external_id(
        &self,
        conn: &Connection,
        external_id: &str,
    ) -> Result<Option<ScheduledEvent>> {
        conn.query_row(
            "SELECT id, user_id, task_id, title, starts_at, ends_at, external_id, created_at, updated_at
             FROM scheduled_events WHERE external_id = ?1",
            [external_id],
            row_to_event,
        )
        .optional()
        .map_err(Into::into)
    }

    /// A user's events overlapping [from, until), earliest first
    pub fn find_by_user_between(
        &self,
        conn: &Connection,
        user_id: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<ScheduledEvent>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, task_id, title, starts_at, ends_at, external_id, created_at, updated_at
             FROM scheduled_events
             WHERE user_id = ?1 AND starts_at < ?3 AND ends_at > ?2
             ORDER BY starts_at ASC",
        )?;

        let events = stmt
            .query_map(params![user_id, from, until], row_to_event)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(events)
    }

    pub fn create(&self, conn: &Connection, new: NewScheduledEvent) -> Result<ScheduledEvent> {
        let id = new_id();
        let ts = now();
        conn.execute(
            "INSERT INTO scheduled_events (id, user_id, task_id, title, starts_at, ends_at,
                                           external_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                new.user_id,
                new.task_id,
                new.title,
                new.starts_at,
                new.ends_at,
                new.external_id,
                ts,
                ts
            ],
        )?;
        self.find_by_id(conn, &id)?.ok_or(Error::CreationFailed("scheduled event"))
    }

    pub fn update(
        &self,
        conn: &Connection,
        id: &str,
        patch: ScheduledEventPatch,
    ) -> Result<ScheduledEvent> {
        let mut sets = SetClause::new();
        if let Some(title) = patch.title {
            sets.push("title", title);
        }
        if let Some(task_id) = patch.task_id {
            sets.push("task_id", task_id);
        }
        if let Some(starts_at) = patch.starts_at {
            sets.push("starts_at", starts_at);
        }
        if let Some(ends_at) = patch.ends_at {
            sets.push("ends_at", ends_at);
        }
        if let Some(external_id) = patch.external_id {
            sets.push("external_id", external_id);
        }
        sets.push("updated_at", now());

        let sql = format!("UPDATE scheduled_events SET {} WHERE id = ?", sets.sql());
        let affected = conn.execute(&sql, &sets.params_with(&[&id])[..])?;
        if affected == 0 {
            return Err(Error::NotFound("scheduled event", id.to_string()));
        }
        self.find_by_id(conn, id)?
            .ok_or_else(|| Error::NotFound("scheduled event", id.to_string()))
    }

    /// Hard delete; events are not soft-deletable
    pub fn delete(&self, conn: &Connection, id: &str) -> Result<()> {
        conn.execute("DELETE FROM scheduled_events WHERE id = ?1", [id])?;
        Ok(())
    }

    pub fn count_by_user(&self, conn: &Connection, user_id: &str) -> Result<i64> {
        conn.query_row("SELECT COUNT(*) FROM scheduled_events WHERE user_id = ?1", [user_id], |row| {
            row.get(0)
        })
        .map_err(Into::into)
    }
}

fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<ScheduledEvent> {
    Ok(ScheduledEvent {
        id: row.get(0)?,
        user_id: row.get(1)?,
        task_id: row.get(2)?,
        title: row.get(3)?,
        starts_at: row.get(4)?,
        ends_at: row.get(5)?,
        external_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use chrono::TimeZone;

    fn event_at(user_id: &str, hour: u32) -> NewScheduledEvent {
        let starts = Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap();
        NewScheduledEvent {
            user_id: user_id.to_string(),
            task_id: None,
            title: format!("block-{}", hour),
            starts_at: starts,
            ends_at: starts + chrono::Duration::hours(1),
            external_id: None,
        }
    }

    #[test]
    fn test_window_query_ordered() {
        let db = Database::open_in_memory().unwrap();
        let repo = ScheduledEventRepository;

        repo.create(db.conn(), event_at("u1", 14)).unwrap();
        repo.create(db.conn(), event_at("u1", 9)).unwrap();
        repo.create(db.conn(), event_at("u2", 10)).unwrap();

        let from = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap();
        let events = repo.find_by_user_between(db.conn(), "u1", from, until).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "block-9");
    }

    #[test]
    fn test_window_excludes_outside() {
        let db = Database::open_in_memory().unwrap();
        let repo = ScheduledEventRepository;

        repo.create(db.conn(), event_at("u1", 9)).unwrap();

        let from = Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        assert!(repo.find_by_user_between(db.conn(), "u1", from, until).unwrap().is_empty());
    }

    #[test]
    fn test_external_correlation() {
        let db = Database::open_in_memory().unwrap();
        let repo = ScheduledEventRepository;

        let mut new = event_at("u1", 9);
        new.external_id = Some("gcal-123".to_string());
        let created = repo.create(db.conn(), new).unwrap();

        let found = repo.find_by_external_id(db.conn(), "gcal-123").unwrap().unwrap();
        assert_eq!(found.id, created.id);
    }

    #[test]
    fn test_reschedule() {
        let db = Database::open_in_memory().unwrap();
        let repo = ScheduledEventRepository;

        let created = repo.create(db.conn(), event_at("u1", 9)).unwrap();
        let new_start = created.starts_at + chrono::Duration::hours(2);
        let patch = ScheduledEventPatch {
            starts_at: Some(new_start),
            ends_at: Some(new_start + chrono::Duration::hours(1)),
            ..Default::default()
        };
        let updated = repo.update(db.conn(), &created.id, patch).unwrap();

        assert_eq!(updated.starts_at, new_start);
        assert_eq!(updated.title, created.title);
    }
}
