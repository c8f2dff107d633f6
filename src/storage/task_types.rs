//! Task type repository
//!
//! The single-default invariant (at most one `is_default` per user) is
//! enforced by repository logic, not by a constraint.

use crate::model::{NewTaskType, TaskType, TaskTypePatch};
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};

use super::{SetClause, new_id, now};

pub struct TaskTypeRepository;

impl TaskTypeRepository {
    pub fn find_by_id(&self, conn: &Connection, id: &str) -> Result<Option<TaskType>> {
        conn.query_row(
            "SELECT id, user_id, workspace_id, name, icon, is_default, display_order, created_at, updated_at
             FROM task_types WHERE id = ?1",
            [id],
            row_to_task_type,
        )
        .optional()
        .map_err(Into::into)
    }

    /// A user's types in display order, name as tie-break
    pub fn find_by_user(&self, conn: &Connection, user_id: &str) -> Result<Vec<TaskType>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, workspace_id, name, icon, is_default, display_order, created_at, updated_at
             FROM task_types WHERE user_id = ?1
             ORDER BY display_order ASC, name ASC",
        )?;

        let types = stmt.query_map([user_id], row_to_task_type)?.filter_map(|r| r.ok()).collect();
        Ok(types)
    }

    pub fn default_for_user(&self, conn: &Connection, user_id: &str) -> Result<Option<TaskType>> {
        conn.query_row(
            "SELECT id, user_id, workspace_id, name, icon, is_default, display_order, created_at, updated_at
             FROM task_types WHERE user_id = ?1 AND is_default = 1
             ORDER BY display_order ASC LIMIT 1",
            [user_id],
            row_to_task_type,
        )
        .optional()
        .map_err(Into::into)
    }

    /// New types are appended at the end of the user's order
    pub fn create(&self, conn: &Connection, new: NewTaskType) -> Result<TaskType> {
        let id = new_id();
        let ts = now();
        let next_order: i64 = conn.query_row(
            "SELECT COALESCE(MAX(display_order) + 1, 0) FROM task_types WHERE user_id = ?1",
            [&new.user_id],
            |row| row.get(0),
        )?;
        conn.execute(
            "INSERT INTO task_types (id, user_id, workspace_id, name, icon, is_default, display_order,
                                     created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?8)",
            params![id, new.user_id, new.workspace_id, new.name, new.icon, next_order, ts, ts],
        )?;
        self.find_by_id(conn, &id)?.ok_or(Error::CreationFailed("task type"))
    }

    pub fn update(&self, conn: &Connection, id: &str, patch: TaskTypePatch) -> Result<TaskType> {
        let mut sets = SetClause::new();
        if let Some(name) = patch.name {
            sets.push("name", name);
        }
        if let Some(icon) = patch.icon {
            sets.push("icon", icon);
        }
        if let Some(workspace_id) = patch.workspace_id {
            sets.push("workspace_id", workspace_id);
        }
        sets.push("updated_at", now());

        let sql = format!("UPDATE task_types SET {} WHERE id = ?", sets.sql());
        let affected = conn.execute(&sql, &sets.params_with(&[&id])[..])?;
        if affected == 0 {
            return Err(Error::NotFound("task type", id.to_string()));
        }
        self.find_by_id(conn, id)?
            .ok_or_else(|| Error::NotFound("task type", id.to_string()))
    }

    pub fn delete(&self, conn: &Connection, id: &str) -> Result<()> {
        conn.execute("DELETE FROM task_types WHERE id = ?1", [id])?;
        Ok(())
    }

    pub fn count_by_user(&self, conn: &Connection, user_id: &str) -> Result<i64> {
        conn.query_row("SELECT COUNT(*) FROM task_types WHERE user_id = ?1", [user_id], |row| {
            row.get(0)
        })
        .map_err(Into::into)
    }

    /// Make `task_type_id` the user's default.
    ///
    /// Two statements: clear every default for the user, then set the
    /// target. NOT atomic on its own. Run it inside a caller-supplied
    /// transaction; concurrent callers racing this method can leave
    /// zero or two defaults flagged.
    pub fn set_default(&self, conn: &Connection, user_id: &str, task_type_id: &str) -> Result<()> {
        let ts = now();
        conn.execute(
            "UPDATE task_types SET is_default = 0, updated_at = ?1 WHERE user_id = ?2 AND is_default = 1",
            params![ts, user_id],
        )?;
        let affected = conn.execute(
            "UPDATE task_types SET is_default = 1, updated_at = ?1 WHERE id = ?2 AND user_id = ?3",
            params![ts, task_type_id, user_id],
        )?;
        if affected == 0 {
            return Err(Error::NotFound("task type", task_type_id.to_string()));
        }
        Ok(())
    }

    /// Assign display_order by position in `ordered_ids`.
    ///
    /// One UPDATE per id; same non-atomicity caveat as `set_default`.
    pub fn reorder(&self, conn: &Connection, ordered_ids: &[String]) -> Result<()> {
        let ts = now();
        for (position, id) in ordered_ids.iter().enumerate() {
            conn.execute(
                "UPDATE task_types SET display_order = ?1, updated_at = ?2 WHERE id = ?3",
                params![position as i64, ts, id],
            )?;
        }
        Ok(())
    }
}

fn row_to_task_type(row: &rusqlite::Row) -> rusqlite::Result<TaskType> {
    Ok(TaskType {
        id: row.get(0)?,
        user_id: row.get(1)?,
        workspace_id: row.get(2)?,
        name: row.get(3)?,
        icon: row.get(4)?,
        is_default: row.get(5)?,
        display_order: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn sample_type(user_id: &str, name: &str) -> NewTaskType {
        NewTaskType {
            user_id: user_id.to_string(),
            workspace_id: None,
            name: name.to_string(),
            icon: None,
        }
    }

    #[test]
    fn test_display_order_appends() {
        let db = Database::open_in_memory().unwrap();
        let repo = TaskTypeRepository;

        let a = repo.create(db.conn(), sample_type("u1", "Deep work")).unwrap();
        let b = repo.create(db.conn(), sample_type("u1", "Admin")).unwrap();

        assert_eq!(a.display_order, 0);
        assert_eq!(b.display_order, 1);
    }

    #[test]
    fn test_sequential_set_default_leaves_one() {
        let db = Database::open_in_memory().unwrap();
        let repo = TaskTypeRepository;

        let a = repo.create(db.conn(), sample_type("u1", "Deep work")).unwrap();
        let b = repo.create(db.conn(), sample_type("u1", "Admin")).unwrap();

        repo.set_default(db.conn(), "u1", &a.id).unwrap();
        repo.set_default(db.conn(), "u1", &b.id).unwrap();

        let defaults: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM task_types WHERE user_id = 'u1' AND is_default = 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(defaults, 1);
        assert_eq!(repo.default_for_user(db.conn(), "u1").unwrap().unwrap().id, b.id);
    }

    #[test]
    fn test_set_default_composes_with_transaction() {
        let mut db = Database::open_in_memory().unwrap();
        let repo = TaskTypeRepository;

        let a = repo.create(db.conn(), sample_type("u1", "Deep work")).unwrap();

        // Both statements commit or roll back together
        let tx = db.transaction().unwrap();
        repo.set_default(&tx, "u1", &a.id).unwrap();
        tx.commit().unwrap();

        assert_eq!(repo.default_for_user(db.conn(), "u1").unwrap().unwrap().id, a.id);
    }

    #[test]
    fn test_set_default_unknown_type() {
        let db = Database::open_in_memory().unwrap();
        let repo = TaskTypeRepository;

        repo.create(db.conn(), sample_type("u1", "Deep work")).unwrap();
        let result = repo.set_default(db.conn(), "u1", "missing");
        assert!(matches!(result, Err(Error::NotFound(_, _))));
    }

    #[test]
    fn test_reorder_assigns_positions() {
        let db = Database::open_in_memory().unwrap();
        let repo = TaskTypeRepository;

        let a = repo.create(db.conn(), sample_type("u1", "A")).unwrap();
        let b = repo.create(db.conn(), sample_type("u1", "B")).unwrap();
        let c = repo.create(db.conn(), sample_type("u1", "C")).unwrap();

        repo.reorder(db.conn(), &[c.id.clone(), a.id.clone(), b.id.clone()]).unwrap();

        let ordered = repo.find_by_user(db.conn(), "u1").unwrap();
        let names: Vec<&str> = ordered.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["C", "A", "B"]);
    }

    #[test]
    fn test_ordering_falls_back_to_name() {
        let db = Database::open_in_memory().unwrap();
        let repo = TaskTypeRepository;

        repo.create(db.conn(), sample_type("u1", "Zeta")).unwrap();
        repo.create(db.conn(), sample_type("u1", "Alpha")).unwrap();
        // Tie every display_order to exercise the name tie-break
        db.conn()
            .execute("UPDATE task_types SET display_order = 0", [])
            .unwrap();

        let ordered = repo.find_by_user(db.conn(), "u1").unwrap();
        assert_eq!(ordered[0].name, "Alpha");
    }
}
