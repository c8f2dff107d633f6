//! Workspace and membership repository

use crate::model::{NewWorkspace, NewWorkspaceMember, Workspace, WorkspaceMember, WorkspacePatch};
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};

use super::{SetClause, new_id, now};

pub struct WorkspaceRepository;

impl WorkspaceRepository {
    pub fn find_by_id(&self, conn: &Connection, id: &str) -> Result<Option<Workspace>> {
        conn.query_row(
            "SELECT id, owner_id, name, description, created_at, updated_at
             FROM workspaces WHERE id = ?1 AND is_deleted = 0",
            [id],
            row_to_workspace,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Workspaces owned by a user, newest first
    pub fn find_by_owner(&self, conn: &Connection, owner_id: &str) -> Result<Vec<Workspace>> {
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, name, description, created_at, updated_at
             FROM workspaces WHERE owner_id = ?1 AND is_deleted = 0
             ORDER BY created_at DESC",
        )?;

        let workspaces = stmt.query_map([owner_id], row_to_workspace)?.filter_map(|r| r.ok()).collect();
        Ok(workspaces)
    }

    pub fn create(&self, conn: &Connection, new: NewWorkspace) -> Result<Workspace> {
        let id = new_id();
        let ts = now();
        conn.execute(
            "INSERT INTO workspaces (id, owner_id, name, description, is_deleted, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
            params![id, new.owner_id, new.name, new.description, ts, ts],
        )?;
        self.find_by_id(conn, &id)?.ok_or(Error::CreationFailed("workspace"))
    }

    pub fn update(&self, conn: &Connection, id: &str, patch: WorkspacePatch) -> Result<Workspace> {
        let mut sets = SetClause::new();
        if let Some(name) = patch.name {
            sets.push("name", name);
        }
        if let Some(description) = patch.description {
            sets.push("description", description);
        }
        sets.push("updated_at", now());

        let sql = format!("UPDATE workspaces SET {} WHERE id = ? AND is_deleted = 0", sets.sql());
        let affected = conn.execute(&sql, &sets.params_with(&[&id])[..])?;
        if affected == 0 {
            return Err(Error::NotFound("workspace", id.to_string()));
        }
        self.find_by_id(conn, id)?
            .ok_or_else(|| Error::NotFound("workspace", id.to_string()))
    }

    /// Soft delete; members and projects are untouched
    pub fn delete(&self, conn: &Connection, id: &str) -> Result<()> {
        conn.execute(
            "UPDATE workspaces SET is_deleted = 1, updated_at = ?1 WHERE id = ?2 AND is_deleted = 0",
            params![now(), id],
        )?;
        Ok(())
    }

    pub fn count_by_owner(&self, conn: &Connection, owner_id: &str) -> Result<i64> {
        conn.query_row(
            "SELECT COUNT(*) FROM workspaces WHERE owner_id = ?1 AND is_deleted = 0",
            [owner_id],
            |row| row.get(0),
        )
        .map_err(Into::into)
    }

    // ========== Membership ==========

    /// Adds a member. A duplicate (workspace, user) pair violates the
    /// unique index and surfaces as a storage error.
    pub fn add_member(&self, conn: &Connection, new: NewWorkspaceMember) -> Result<WorkspaceMember> {
        let id = new_id();
        let ts = now();
        conn.execute(
            "INSERT INTO workspace_members (id, workspace_id, user_id, role, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, new.workspace_id, new.user_id, new.role, ts, ts],
        )?;
        conn.query_row(
            "SELECT id, workspace_id, user_id, role, created_at, updated_at
             FROM workspace_members WHERE id = ?1",
            [&id],
            row_to_member,
        )
        .optional()?
        .ok_or(Error::CreationFailed("workspace member"))
    }

    pub fn find_member(
        &self,
        conn: &Connection,
        workspace_id: &str,
        user_id: &str,
    ) -> Result<Option<WorkspaceMember>> {
        conn.query_row(
            "SELECT id, workspace_id, user_id, role, created_at, updated_at
             FROM workspace_members WHERE workspace_id = ?1 AND user_id = ?2",
            [workspace_id, user_id],
            row_to_member,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Members of a workspace in join order
    pub fn members(&self, conn: &Connection, workspace_id: &str) -> Result<Vec<WorkspaceMember>> {
        let mut stmt = conn.prepare(
            "SELECT id, workspace_id, user_id, role, created_at, updated_at
             FROM workspace_members WHERE workspace_id = ?1 ORDER BY created_at ASC",
        )?;

        let members = stmt.query_map([workspace_id], row_to_member)?.filter_map(|r| r.ok()).collect();
        Ok(members)
    }

    /// Hard delete; membership rows carry no soft-delete flag
    pub fn remove_member(&self, conn: &Connection, workspace_id: &str, user_id: &str) -> Result<()> {
        conn.execute(
            "DELETE FROM workspace_members WHERE workspace_id = ?1 AND user_id = ?2",
            [workspace_id, user_id],
        )?;
        Ok(())
    }
}

fn row_to_workspace(row: &rusqlite::Row) -> rusqlite::Result<Workspace> {
    Ok(Workspace {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn row_to_member(row: &rusqlite::Row) -> rusqlite::Result<WorkspaceMember> {
    Ok(WorkspaceMember {
        id: row.get(0)?,
        workspace_id: row.get(1)?,
        user_id: row.get(2)?,
        role: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
