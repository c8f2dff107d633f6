//! Points ledger repository
//!
//! Append-only: entries are created and read, never updated. Balances
//! are derived by summing the signed points column.

use crate::model::{NewPointsEntry, PointsEntry};
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};

use super::{new_id, now};

pub struct PointsLedgerRepository;

impl PointsLedgerRepository {
    pub fn find_by_id(&self, conn: &Connection, id: &str) -> Result<Option<PointsEntry>> {
        conn.query_row(
            "SELECT id, user_id, task_id, time_entry_id, points, reason, created_at
             FROM points_ledger WHERE id = ?1",
            [id],
            row_to_entry,
        )
        .optional()
        .map_err(Into::into)
    }

    /// A user's ledger, newest first
    pub fn find_by_user(&self, conn: &Connection, user_id: &str) -> Result<Vec<PointsEntry>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, task_id, time_entry_id, points, reason, created_at
             FROM points_ledger WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;

        let entries = stmt.query_map([user_id], row_to_entry)?.filter_map(|r| r.ok()).collect();
        Ok(entries)
    }

    pub fn create(&self, conn: &Connection, new: NewPointsEntry) -> Result<PointsEntry> {
        let id = new_id();
        let ts = now();
        conn.execute(
            "INSERT INTO points_ledger (id, user_id, task_id, time_entry_id, points, reason, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![id, new.user_id, new.task_id, new.time_entry_id, new.points, new.reason, ts],
        )?;
        self.find_by_id(conn, &id)?.ok_or(Error::CreationFailed("points entry"))
    }

    /// Signed balance across the whole ledger
    pub fn total_for_user(&self, conn: &Connection, user_id: &str) -> Result<i64> {
        conn.query_row(
            "SELECT COALESCE(SUM(points), 0) FROM points_ledger WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )
        .map_err(Into::into)
    }

    pub fn count_by_user(&self, conn: &Connection, user_id: &str) -> Result<i64> {
        conn.query_row("SELECT COUNT(*) FROM points_ledger WHERE user_id = ?1", [user_id], |row| {
            row.get(0)
        })
        .map_err(Into::into)
    }
}

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<PointsEntry> {
    Ok(PointsEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        task_id: row.get(2)?,
        time_entry_id: row.get(3)?,
        points: row.get(4)?,
        reason: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn award(user_id: &str, points: i64, reason: &str) -> NewPointsEntry {
        NewPointsEntry {
            user_id: user_id.to_string(),
            task_id: None,
            time_entry_id: None,
            points,
            reason: reason.to_string(),
        }
    }

    #[test]
    fn test_signed_balance() {
        let db = Database::open_in_memory().unwrap();
        let repo = PointsLedgerRepository;

        repo.create(db.conn(), award("u1", 50, "task completed")).unwrap();
        repo.create(db.conn(), award("u1", -20, "reward redeemed")).unwrap();
        repo.create(db.conn(), award("u2", 10, "task completed")).unwrap();

        assert_eq!(repo.total_for_user(db.conn(), "u1").unwrap(), 30);
        assert_eq!(repo.total_for_user(db.conn(), "u2").unwrap(), 10);
        assert_eq!(repo.total_for_user(db.conn(), "nobody").unwrap(), 0);
    }

    #[test]
    fn test_ledger_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let repo = PointsLedgerRepository;

        repo.create(db.conn(), award("u1", 5, "first")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        repo.create(db.conn(), award("u1", 7, "second")).unwrap();

        let entries = repo.find_by_user(db.conn(), "u1").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].reason, "second");
        assert_eq!(repo.count_by_user(db.conn(), "u1").unwrap(), 2);
    }

    #[test]
    fn test_links_to_task_and_entry() {
        let db = Database::open_in_memory().unwrap();
        let repo = PointsLedgerRepository;

        let mut new = award("u1", 25, "focus session");
        new.task_id = Some("t1".to_string());
        new.time_entry_id = Some("e1".to_string());
        let entry = repo.create(db.conn(), new).unwrap();

        assert_eq!(entry.task_id.as_deref(), Some("t1"));
        assert_eq!(entry.time_entry_id.as_deref(), Some("e1"));
    }
}
