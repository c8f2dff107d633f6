//! User repository

use crate::model::{NewUser, User, UserPatch};
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};

use super::{SetClause, new_id, now};

/// Row↔domain mapping for users. The `is_deleted` flag stays inside this
/// module; domain consumers never see it.
pub struct UserRepository;

impl UserRepository {
    pub fn find_by_id(&self, conn: &Connection, id: &str) -> Result<Option<User>> {
        conn.query_row(
            "SELECT id, email, display_name, avatar_url, created_at, updated_at
             FROM users WHERE id = ?1 AND is_deleted = 0",
            [id],
            row_to_user,
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn find_by_email(&self, conn: &Connection, email: &str) -> Result<Option<User>> {
        conn.query_row(
            "SELECT id, email, display_name, avatar_url, created_at, updated_at
             FROM users WHERE email = ?1 AND is_deleted = 0",
            [email],
            row_to_user,
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn create(&self, conn: &Connection, new: NewUser) -> Result<User> {
        let id = new_id();
        let ts = now();
        conn.execute(
            "INSERT INTO users (id, email, display_name, avatar_url, is_deleted, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
            params![id, new.email, new.display_name, new.avatar_url, ts, ts],
        )?;
        self.find_by_id(conn, &id)?.ok_or(Error::CreationFailed("user"))
    }

    pub fn update(&self, conn: &Connection, id: &str, patch: UserPatch) -> Result<User> {
        let mut sets = SetClause::new();
        if let Some(email) = patch.email {
            sets.push("email", email);
        }
        if let Some(display_name) = patch.display_name {
            sets.push("display_name", display_name);
        }
        if let Some(avatar_url) = patch.avatar_url {
            sets.push("avatar_url", avatar_url);
        }
        sets.push("updated_at", now());

        let sql = format!("UPDATE users SET {} WHERE id = ? AND is_deleted = 0", sets.sql());
        let affected = conn.execute(&sql, &sets.params_with(&[&id])[..])?;
        if affected == 0 {
            return Err(Error::NotFound("user", id.to_string()));
        }
        self.find_by_id(conn, id)?
            .ok_or_else(|| Error::NotFound("user", id.to_string()))
    }

    /// Soft delete: the row stays, reads stop returning it
    pub fn delete(&self, conn: &Connection, id: &str) -> Result<()> {
        conn.execute(
            "UPDATE users SET is_deleted = 1, updated_at = ?1 WHERE id = ?2 AND is_deleted = 0",
            params![now(), id],
        )?;
        Ok(())
    }

    pub fn count(&self, conn: &Connection) -> Result<i64> {
        conn.query_row("SELECT COUNT(*) FROM users WHERE is_deleted = 0", [], |row| row.get(0))
            .map_err(Into::into)
    }
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        display_name: row.get(2)?,
        avatar_url: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn sample_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            display_name: Some("Sam".to_string()),
            avatar_url: None,
        }
    }

    #[test]
    fn test_create_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let repo = UserRepository;

        let created = repo.create(db.conn(), sample_user("sam@example.com")).unwrap();
        let found = repo.find_by_id(db.conn(), &created.id).unwrap().unwrap();

        assert_eq!(found.email, "sam@example.com");
        assert_eq!(found.display_name.as_deref(), Some("Sam"));
        assert_eq!(found.created_at, created.created_at);
    }

    #[test]
    fn test_email_unique() {
        let db = Database::open_in_memory().unwrap();
        let repo = UserRepository;

        repo.create(db.conn(), sample_user("dup@example.com")).unwrap();
        let result = repo.create(db.conn(), sample_user("dup@example.com"));
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[test]
    fn test_update_single_field() {
        let db = Database::open_in_memory().unwrap();
        let repo = UserRepository;

        let created = repo.create(db.conn(), sample_user("sam@example.com")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));

        let patch = UserPatch { display_name: Some(Some("Samuel".to_string())), ..Default::default() };
        let updated = repo.update(db.conn(), &created.id, patch).unwrap();

        assert_eq!(updated.display_name.as_deref(), Some("Samuel"));
        assert_eq!(updated.email, created.email);
        assert!(updated.updated_at > created.updated_at);
    }

    #[test]
    fn test_soft_delete_hides_but_keeps_row() {
        let db = Database::open_in_memory().unwrap();
        let repo = UserRepository;

        let created = repo.create(db.conn(), sample_user("gone@example.com")).unwrap();
        repo.delete(db.conn(), &created.id).unwrap();

        assert!(repo.find_by_id(db.conn(), &created.id).unwrap().is_none());
        assert!(matches!(
            repo.update(db.conn(), &created.id, UserPatch::default()),
            Err(Error::NotFound(_, _))
        ));

        // The row is still there when the flag is ignored
        let raw: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM users WHERE id = ?1", [&created.id], |row| row.get(0))
            .unwrap();
        assert_eq!(raw, 1);
        assert_eq!(repo.count(db.conn()).unwrap(), 0);
    }
}
