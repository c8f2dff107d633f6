//! Task repository
//!
//! Children are resolved with a derived lookup on `parent_task_id`;
//! nothing here loads a task tree recursively.

use crate::model::{NewTask, Task, TaskPatch, TaskStatus};
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};

use super::{SetClause, new_id, now};

pub struct TaskRepository;

impl TaskRepository {
    pub fn find_by_id(&self, conn: &Connection, id: &str) -> Result<Option<Task>> {
        conn.query_row(
            "SELECT id, project_id, user_id, parent_task_id, task_type_id, title, description,
                    status, progress, due_at, created_at, updated_at
             FROM tasks WHERE id = ?1 AND is_deleted = 0",
            [id],
            row_to_task,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Tasks in a project, newest first. The project itself is not
    /// consulted: soft-deleting a project does not hide its tasks here.
    pub fn find_by_project(&self, conn: &Connection, project_id: &str) -> Result<Vec<Task>> {
        let mut stmt = conn.prepare(
            "SELECT id, project_id, user_id, parent_task_id, task_type_id, title, description,
                    status, progress, due_at, created_at, updated_at
             FROM tasks WHERE project_id = ?1 AND is_deleted = 0
             ORDER BY created_at DESC",
        )?;

        let tasks = stmt.query_map([project_id], row_to_task)?.filter_map(|r| r.ok()).collect();
        Ok(tasks)
    }

    /// Direct children of a task, oldest first
    pub fn subtasks(&self, conn: &Connection, parent_task_id: &str) -> Result<Vec<Task>> {
        let mut stmt = conn.prepare(
            "SELECT id, project_id, user_id, parent_task_id, task_type_id, title, description,
                    status, progress, due_at, created_at, updated_at
             FROM tasks WHERE parent_task_id = ?1 AND is_deleted = 0
             ORDER BY created_at ASC",
        )?;

        let tasks = stmt.query_map([parent_task_id], row_to_task)?.filter_map(|r| r.ok()).collect();
        Ok(tasks)
    }

    pub fn find_by_status(
        &self,
        conn: &Connection,
        user_id: &str,
        status: TaskStatus,
    ) -> Result<Vec<Task>> {
        let mut stmt = conn.prepare(
            "SELECT id, project_id, user_id, parent_task_id, task_type_id, title, description,
                    status, progress, due_at, created_at, updated_at
             FROM tasks WHERE user_id = ?1 AND status = ?2 AND is_deleted = 0
             ORDER BY created_at DESC",
        )?;

        let tasks = stmt
            .query_map(params![user_id, status.as_str()], row_to_task)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(tasks)
    }

    pub fn create(&self, conn: &Connection, new: NewTask) -> Result<Task> {
        let id = new_id();
        let ts = now();
        conn.execute(
            "INSERT INTO tasks (id, project_id, user_id, parent_task_id, task_type_id, title,
                                description, status, progress, due_at, is_deleted, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, 0, ?10, ?11)",
            params![
                id,
                new.project_id,
                new.user_id,
                new.parent_task_id,
                new.task_type_id,
                new.title,
                new.description,
                new.status.as_str(),
                new.due_at,
                ts,
                ts
            ],
        )?;
        self.find_by_id(conn, &id)?.ok_or(Error::CreationFailed("task"))
    }

    pub fn update(&self, conn: &Connection, id: &str, patch: TaskPatch) -> Result<Task> {
        let mut sets = SetClause::new();
        if let Some(title) = patch.title {
            sets.push("title", title);
        }
        if let Some(description) = patch.description {
            sets.push("description", description);
        }
        if let Some(status) = patch.status {
            sets.push("status", status.as_str());
        }
        if let Some(progress) = patch.progress {
            sets.push("progress", progress.clamp(0, 100));
        }
        if let Some(parent_task_id) = patch.parent_task_id {
            sets.push("parent_task_id", parent_task_id);
        }
        if let Some(task_type_id) = patch.task_type_id {
            sets.push("task_type_id", task_type_id);
        }
        if let Some(due_at) = patch.due_at {
            sets.push("due_at", due_at);
        }
        sets.push("updated_at", now());

        let sql = format!("UPDATE tasks SET {} WHERE id = ? AND is_deleted = 0", sets.sql());
        let affected = conn.execute(&sql, &sets.params_with(&[&id])[..])?;
        if affected == 0 {
            return Err(Error::NotFound("task", id.to_string()));
        }
        self.find_by_id(conn, id)?
            .ok_or_else(|| Error::NotFound("task", id.to_string()))
    }

    /// Soft delete; subtasks are untouched
    pub fn delete(&self, conn: &Connection, id: &str) -> Result<()> {
        conn.execute(
            "UPDATE tasks SET is_deleted = 1, updated_at = ?1 WHERE id = ?2 AND is_deleted = 0",
            params![now(), id],
        )?;
        Ok(())
    }

    pub fn count_by_project(&self, conn: &Connection, project_id: &str) -> Result<i64> {
        conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE project_id = ?1 AND is_deleted = 0",
            [project_id],
            |row| row.get(0),
        )
        .map_err(Into::into)
    }
}

fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    let status_str: String = row.get(7)?;
    let status: TaskStatus = status_str.parse().map_err(|e: crate::Error| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Task {
        id: row.get(0)?,
        project_id: row.get(1)?,
        user_id: row.get(2)?,
        parent_task_id: row.get(3)?,
        task_type_id: row.get(4)?,
        title: row.get(5)?,
        description: row.get(6)?,
        status,
        progress: row.get(8)?,
        due_at: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}
