//! User preferences repository (primary key = user id)

use crate::model::{NewUserPreferences, UserPreferences, UserPreferencesPatch};
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};

use super::{SetClause, now};

pub struct UserPreferencesRepository;

impl UserPreferencesRepository {
    pub fn get(&self, conn: &Connection, user_id: &str) -> Result<Option<UserPreferences>> {
        conn.query_row(
            "SELECT user_id, timezone, week_starts_on, theme, daily_goal_minutes,
                    notifications_enabled, created_at, updated_at
             FROM user_preferences WHERE user_id = ?1",
            [user_id],
            row_to_preferences,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Inserts the user's preferences row. The primary key keeps it to
    /// one row per user; a second create surfaces as a storage error.
    pub fn create(&self, conn: &Connection, new: NewUserPreferences) -> Result<UserPreferences> {
        let ts = now();
        conn.execute(
            "INSERT INTO user_preferences (user_id, timezone, week_starts_on, theme,
                                           daily_goal_minutes, notifications_enabled, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new.user_id,
                new.timezone,
                new.week_starts_on,
                new.theme,
                new.daily_goal_minutes,
                new.notifications_enabled,
                ts,
                ts
            ],
        )?;
        self.get(conn, &new.user_id)?.ok_or(Error::CreationFailed("user preferences"))
    }

    pub fn update(
        &self,
        conn: &Connection,
        user_id: &str,
        patch: UserPreferencesPatch,
    ) -> Result<UserPreferences> {
        let mut sets = SetClause::new();
        if let Some(timezone) = patch.timezone {
            sets.push("timezone", timezone);
        }
        if let Some(week_starts_on) = patch.week_starts_on {
            sets.push("week_starts_on", week_starts_on);
        }
        if let Some(theme) = patch.theme {
            sets.push("theme", theme);
        }
        if let Some(daily_goal_minutes) = patch.daily_goal_minutes {
            sets.push("daily_goal_minutes", daily_goal_minutes);
        }
        if let Some(notifications_enabled) = patch.notifications_enabled {
            sets.push("notifications_enabled", notifications_enabled);
        }
        sets.push("updated_at", now());

        let sql = format!("UPDATE user_preferences SET {} WHERE user_id = ?", sets.sql());
        let affected = conn.execute(&sql, &sets.params_with(&[&user_id])[..])?;
        if affected == 0 {
            return Err(Error::NotFound("user preferences", user_id.to_string()));
        }
        self.get(conn, user_id)?
            .ok_or_else(|| Error::NotFound("user preferences", user_id.to_string()))
    }

    /// Hard delete; preferences are not soft-deletable
    pub fn delete(&self, conn: &Connection, user_id: &str) -> Result<()> {
        conn.execute("DELETE FROM user_preferences WHERE user_id = ?1", [user_id])?;
        Ok(())
    }
}

fn row_to_preferences(row: &rusqlite::Row) -> rusqlite::Result<UserPreferences> {
    Ok(UserPreferences {
        user_id: row.get(0)?,
        timezone: row.get(1)?,
        week_starts_on: row.get(2)?,
        theme: row.get(3)?,
        daily_goal_minutes: row.get(4)?,
        notifications_enabled: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
