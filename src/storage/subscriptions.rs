//! Role and subscription repositories
//!
//! Subscription history is an append-only audit log: entries are written
//! by `record_change` and never updated.

use crate::model::{
    NewRole, NewUserSubscription, Role, RolePatch, SubscriptionChange, SubscriptionHistoryEntry,
    UserSubscription, UserSubscriptionPatch,
};
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};

use super::{SetClause, new_id, now};

pub struct RoleRepository;

impl RoleRepository {
    pub fn find_by_id(&self, conn: &Connection, id: &str) -> Result<Option<Role>> {
        conn.query_row(
            "SELECT id, name, price_cents, max_workspaces, max_projects, max_tasks,
                    can_sync, can_reports, created_at, updated_at
             FROM roles WHERE id = ?1",
            [id],
            row_to_role,
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn find_by_name(&self, conn: &Connection, name: &str) -> Result<Option<Role>> {
        conn.query_row(
            "SELECT id, name, price_cents, max_workspaces, max_projects, max_tasks,
                    can_sync, can_reports, created_at, updated_at
             FROM roles WHERE name = ?1",
            [name],
            row_to_role,
        )
        .optional()
        .map_err(Into::into)
    }

    /// All roles, cheapest first
    pub fn find_all(&self, conn: &Connection) -> Result<Vec<Role>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, price_cents, max_workspaces, max_projects, max_tasks,
                    can_sync, can_reports, created_at, updated_at
             FROM roles ORDER BY price_cents ASC, name ASC",
        )?;

        let roles = stmt.query_map([], row_to_role)?.filter_map(|r| r.ok()).collect();
        Ok(roles)
    }

    pub fn create(&self, conn: &Connection, new: NewRole) -> Result<Role> {
        let id = new_id();
        let ts = now();
        conn.execute(
            "INSERT INTO roles (id, name, price_cents, max_workspaces, max_projects, max_tasks,
                                can_sync, can_reports, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id,
                new.name,
                new.price_cents,
                new.max_workspaces,
                new.max_projects,
                new.max_tasks,
                new.can_sync,
                new.can_reports,
                ts,
                ts
            ],
        )?;
        self.find_by_id(conn, &id)?.ok_or(Error::CreationFailed("role"))
    }

    pub fn update(&self, conn: &Connection, id: &str, patch: RolePatch) -> Result<Role> {
        let mut sets = SetClause::new();
        if let Some(name) = patch.name {
            sets.push("name", name);
        }
        if let Some(price_cents) = patch.price_cents {
            sets.push("price_cents", price_cents);
        }
        if let Some(max_workspaces) = patch.max_workspaces {
            sets.push("max_workspaces", max_workspaces);
        }
        if let Some(max_projects) = patch.max_projects {
            sets.push("max_projects", max_projects);
        }
        if let Some(max_tasks) = patch.max_tasks {
            sets.push("max_tasks", max_tasks);
        }
        if let Some(can_sync) = patch.can_sync {
            sets.push("can_sync", can_sync);
        }
        if let Some(can_reports) = patch.can_reports {
            sets.push("can_reports", can_reports);
        }
        sets.push("updated_at", now());

        let sql = format!("UPDATE roles SET {} WHERE id = ?", sets.sql());
        let affected = conn.execute(&sql, &sets.params_with(&[&id])[..])?;
        if affected == 0 {
            return Err(Error::NotFound("role", id.to_string()));
        }
        self.find_by_id(conn, id)?
            .ok_or_else(|| Error::NotFound("role", id.to_string()))
    }

    /// Hard delete; roles are not soft-deletable
    pub fn delete(&self, conn: &Connection, id: &str) -> Result<()> {
        conn.execute("DELETE FROM roles WHERE id = ?1", [id])?;
        Ok(())
    }
}

pub struct SubscriptionRepository;

impl SubscriptionRepository {
    pub fn find_by_id(&self, conn: &Connection, id: &str) -> Result<Option<UserSubscription>> {
        conn.query_row(
            "SELECT id, user_id, role_id, started_at, expires_at, created_at, updated_at
             FROM user_subscriptions WHERE id = ?1",
            [id],
            row_to_subscription,
        )
        .optional()
        .map_err(Into::into)
    }

    /// The one active subscription for a user
    pub fn find_by_user(&self, conn: &Connection, user_id: &str) -> Result<Option<UserSubscription>> {
        conn.query_row(
            "SELECT id, user_id, role_id, started_at, expires_at, created_at, updated_at
             FROM user_subscriptions WHERE user_id = ?1",
            [user_id],
            row_to_subscription,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Inserts the user's subscription. A second subscription for the
    /// same user violates the unique index and surfaces as a storage
    /// error.
    pub fn create(&self, conn: &Connection, new: NewUserSubscription) -> Result<UserSubscription> {
        let id = new_id();
        let ts = now();
        conn.execute(
            "INSERT INTO user_subscriptions (id, user_id, role_id, started_at, expires_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![id, new.user_id, new.role_id, new.started_at, new.expires_at, ts, ts],
        )?;
        self.find_by_id(conn, &id)?.ok_or(Error::CreationFailed("subscription"))
    }

    pub fn update(
        &self,
        conn: &Connection,
        id: &str,
        patch: UserSubscriptionPatch,
    ) -> Result<UserSubscription> {
        let mut sets = SetClause::new();
        if let Some(role_id) = patch.role_id {
            sets.push("role_id", role_id);
        }
        if let Some(expires_at) = patch.expires_at {
            sets.push("expires_at", expires_at);
        }
        sets.push("updated_at", now());

        let sql = format!("UPDATE user_subscriptions SET {} WHERE id = ?", sets.sql());
        let affected = conn.execute(&sql, &sets.params_with(&[&id])[..])?;
        if affected == 0 {
            return Err(Error::NotFound("subscription", id.to_string()));
        }
        self.find_by_id(conn, id)?
            .ok_or_else(|| Error::NotFound("subscription", id.to_string()))
    }

    /// Hard delete; subscriptions are not soft-deletable
    pub fn delete(&self, conn: &Connection, id: &str) -> Result<()> {
        conn.execute("DELETE FROM user_subscriptions WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Append a role/price change to the audit log
    pub fn record_change(
        &self,
        conn: &Connection,
        change: SubscriptionChange,
    ) -> Result<SubscriptionHistoryEntry> {
        let id = new_id();
        let ts = now();
        conn.execute(
            "INSERT INTO subscription_history (id, user_id, role_id, price_cents, note, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, change.user_id, change.role_id, change.price_cents, change.note, ts],
        )?;
        conn.query_row(
            "SELECT id, user_id, role_id, price_cents, note, created_at
             FROM subscription_history WHERE id = ?1",
            [&id],
            row_to_history,
        )
        .optional()?
        .ok_or(Error::CreationFailed("subscription history entry"))
    }

    /// Audit log for a user, newest first
    pub fn history_for_user(
        &self,
        conn: &Connection,
        user_id: &str,
    ) -> Result<Vec<SubscriptionHistoryEntry>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, role_id, price_cents, note, created_at
             FROM subscription_history WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;

        let entries = stmt.query_map([user_id], row_to_history)?.filter_map(|r| r.ok()).collect();
        Ok(entries)
    }
}

fn row_to_role(row: &rusqlite::Row) -> rusqlite::Result<Role> {
    Ok(Role {
        id: row.get(0)?,
        name: row.get(1)?,
        price_cents: row.get(2)?,
        max_workspaces: row.get(3)?,
        max_projects: row.get(4)?,
        max_tasks: row.get(5)?,
        can_sync: row.get(6)?,
        can_reports: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn row_to_subscription(row: &rusqlite::Row) -> rusqlite::Result<UserSubscription> {
    Ok(UserSubscription {
        id: row.get(0)?,
        user_id: row.get(1)?,
        role_id: row.get(2)?,
        started_at: row.get(3)?,
        expires_at: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn row_to_history(row: &rusqlite::Row) -> rusqlite::Result<SubscriptionHistoryEntry> {
    Ok(SubscriptionHistoryEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        role_id: row.get(2)?,
        price_cents: row.get(3)?,
        note: row.get(4)?,
        created_at: row.get(5)?,
    })
}
