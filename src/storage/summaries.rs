//! Daily summary repository

use crate::model::{DailySummary, DailySummaryPatch, NewDailySummary};
use crate::{Error, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};

use super::{SetClause, new_id, now};

pub struct DailySummaryRepository;

impl DailySummaryRepository {
    pub fn find_by_id(&self, conn: &Connection, id: &str) -> Result<Option<DailySummary>> {
        conn.query_row(
            "SELECT id, user_id, date, tracked_seconds, tasks_completed, points, created_at, updated_at
             FROM daily_summaries WHERE id = ?1",
            [id],
            row_to_summary,
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn find_by_user_and_date(
        &self,
        conn: &Connection,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailySummary>> {
        conn.query_row(
            "SELECT id, user_id, date, tracked_seconds, tasks_completed, points, created_at, updated_at
             FROM daily_summaries WHERE user_id = ?1 AND date = ?2",
            params![user_id, date],
            row_to_summary,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Summaries in [from, until], oldest first
    pub fn find_range(
        &self,
        conn: &Connection,
        user_id: &str,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<DailySummary>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, date, tracked_seconds, tasks_completed, points, created_at, updated_at
             FROM daily_summaries
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date ASC",
        )?;

        let summaries = stmt
            .query_map(params![user_id, from, until], row_to_summary)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(summaries)
    }

    /// Inserts the day's row. A second row for the same (user, date)
    /// violates the unique index and surfaces as a storage error.
    pub fn create(&self, conn: &Connection, new: NewDailySummary) -> Result<DailySummary> {
        let id = new_id();
        let ts = now();
        conn.execute(
            "INSERT INTO daily_summaries (id, user_id, date, tracked_seconds, tasks_completed,
                                          points, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                new.user_id,
                new.date,
                new.tracked_seconds,
                new.tasks_completed,
                new.points,
                ts,
                ts
            ],
        )?;
        self.find_by_id(conn, &id)?.ok_or(Error::CreationFailed("daily summary"))
    }

    pub fn update(&self, conn: &Connection, id: &str, patch: DailySummaryPatch) -> Result<DailySummary> {
        let mut sets = SetClause::new();
        if let Some(tracked_seconds) = patch.tracked_seconds {
            sets.push("tracked_seconds", tracked_seconds);
        }
        if let Some(tasks_completed) = patch.tasks_completed {
            sets.push("tasks_completed", tasks_completed);
        }
        if let Some(points) = patch.points {
            sets.push("points", points);
        }
        sets.push("updated_at", now());

        let sql = format!("UPDATE daily_summaries SET {} WHERE id = ?", sets.sql());
        let affected = conn.execute(&sql, &sets.params_with(&[&id])[..])?;
        if affected == 0 {
            return Err(Error::NotFound("daily summary", id.to_string()));
        }
        self.find_by_id(conn, id)?
            .ok_or_else(|| Error::NotFound("daily summary", id.to_string()))
    }

    /// Hard delete; summaries are not soft-deletable
    pub fn delete(&self, conn: &Connection, id: &str) -> Result<()> {
        conn.execute("DELETE FROM daily_summaries WHERE id = ?1", [id])?;
        Ok(())
    }

    pub fn count_by_user(&self, conn: &Connection, user_id: &str) -> Result<i64> {
        conn.query_row("SELECT COUNT(*) FROM daily_summaries WHERE user_id = ?1", [user_id], |row| {
            row.get(0)
        })
        .map_err(Into::into)
    }
}

fn row_to_summary(row: &rusqlite::Row) -> rusqlite::Result<DailySummary> {
    Ok(DailySummary {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: row.get(2)?,
        tracked_seconds: row.get(3)?,
        tasks_completed: row.get(4)?,
        points: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
