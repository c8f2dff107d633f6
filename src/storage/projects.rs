//! Project repository

use crate::model::{NewProject, Project, ProjectPatch};
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};

use super::{SetClause, new_id, now};

pub struct ProjectRepository;

impl ProjectRepository {
    pub fn find_by_id(&self, conn: &Connection, id: &str) -> Result<Option<Project>> {
        conn.query_row(
            "SELECT id, workspace_id, owner_id, name, description, color, completion, created_at, updated_at
             FROM projects WHERE id = ?1 AND is_deleted = 0",
            [id],
            row_to_project,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Projects in a workspace, newest first
    pub fn find_by_workspace(&self, conn: &Connection, workspace_id: &str) -> Result<Vec<Project>> {
        let mut stmt = conn.prepare(
            "SELECT id, workspace_id, owner_id, name, description, color, completion, created_at, updated_at
             FROM projects WHERE workspace_id = ?1 AND is_deleted = 0
             ORDER BY created_at DESC",
        )?;

        let projects = stmt.query_map([workspace_id], row_to_project)?.filter_map(|r| r.ok()).collect();
        Ok(projects)
    }

    pub fn create(&self, conn: &Connection, new: NewProject) -> Result<Project> {
        let id = new_id();
        let ts = now();
        conn.execute(
            "INSERT INTO projects (id, workspace_id, owner_id, name, description, color, completion,
                                   is_deleted, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, ?7, ?8)",
            params![id, new.workspace_id, new.owner_id, new.name, new.description, new.color, ts, ts],
        )?;
        self.find_by_id(conn, &id)?.ok_or(Error::CreationFailed("project"))
    }

    pub fn update(&self, conn: &Connection, id: &str, patch: ProjectPatch) -> Result<Project> {
        let mut sets = SetClause::new();
        if let Some(name) = patch.name {
            sets.push("name", name);
        }
        if let Some(description) = patch.description {
            sets.push("description", description);
        }
        if let Some(color) = patch.color {
            sets.push("color", color);
        }
        if let Some(completion) = patch.completion {
            sets.push("completion", completion.clamp(0, 100));
        }
        sets.push("updated_at", now());

        let sql = format!("UPDATE projects SET {} WHERE id = ? AND is_deleted = 0", sets.sql());
        let affected = conn.execute(&sql, &sets.params_with(&[&id])[..])?;
        if affected == 0 {
            return Err(Error::NotFound("project", id.to_string()));
        }
        self.find_by_id(conn, id)?
            .ok_or_else(|| Error::NotFound("project", id.to_string()))
    }

    /// Soft delete; tasks under the project are untouched
    pub fn delete(&self, conn: &Connection, id: &str) -> Result<()> {
        conn.execute(
            "UPDATE projects SET is_deleted = 1, updated_at = ?1 WHERE id = ?2 AND is_deleted = 0",
            params![now(), id],
        )?;
        Ok(())
    }

    pub fn count_by_workspace(&self, conn: &Connection, workspace_id: &str) -> Result<i64> {
        conn.query_row(
            "SELECT COUNT(*) FROM projects WHERE workspace_id = ?1 AND is_deleted = 0",
            [workspace_id],
            |row| row.get(0),
        )
        .map_err(Into::into)
    }
}

fn row_to_project(row: &rusqlite::Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        workspace_id: row.get(1)?,
        owner_id: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        color: row.get(5)?,
        completion: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
