use super::SqliteMusicStore;
use crate::user::{NewUser, ProfileUpdate, RefreshTokenStore, User, UserRole, UserStore};
use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, role, created_at, updated_at";

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let role: String = row.get("role")?;
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        role: UserRole::from_str(&role).unwrap_or_default(),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

impl SqliteMusicStore {
    fn find_user_by(&self, column: &str, value: &str) -> Result<Option<User>> {
        let conn = self.conn();
        let user = conn
            .query_row(
                &format!("SELECT {} FROM app_user WHERE {} = ?1", USER_COLUMNS, column),
                params![value],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }
}

impl UserStore for SqliteMusicStore {
    fn create_user(&self, user: &NewUser) -> Result<i64> {
        let conn = self.conn();
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO app_user (username, email, password_hash, first_name, last_name, role, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                user.username,
                user.email,
                user.password_hash,
                user.first_name,
                user.last_name,
                user.role.as_str(),
                now
            ],
        )
        .with_context(|| format!("Failed to create user {}", user.username))?;
        Ok(conn.last_insert_rowid())
    }

    fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        let user = conn
            .query_row(
                &format!("SELECT {} FROM app_user WHERE id = ?1", USER_COLUMNS),
                params![user_id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_user_by("email", email)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_user_by("username", username)
    }

    fn get_password_hash(&self, user_id: i64) -> Result<Option<String>> {
        let conn = self.conn();
        let hash = conn
            .query_row(
                "SELECT password_hash FROM app_user WHERE id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash)
    }

    fn set_password_hash(&self, user_id: i64, password_hash: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "UPDATE app_user SET password_hash = ?1, updated_at = ?2 WHERE id = ?3",
            params![password_hash, chrono::Utc::now().timestamp(), user_id],
        )?;
        Ok(())
    }

    fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> Result<bool> {
        let mut assignments = vec!["updated_at = ?"];
        let mut values = vec![Value::Integer(chrono::Utc::now().timestamp())];
        for (column, value) in [
            ("username = ?", &update.username),
            ("email = ?", &update.email),
            ("first_name = ?", &update.first_name),
            ("last_name = ?", &update.last_name),
        ] {
            if let Some(value) = value {
                assignments.push(column);
                values.push(Value::Text(value.clone()));
            }
        }
        values.push(Value::Integer(user_id));

        let conn = self.conn();
        let changed = conn.execute(
            &format!("UPDATE app_user SET {} WHERE id = ?", assignments.join(", ")),
            params_from_iter(values),
        )?;
        Ok(changed > 0)
    }

    fn list_user_ids(&self) -> Result<Vec<i64>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id FROM app_user ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    fn list_user_ids_with_role(&self, role: UserRole) -> Result<Vec<i64>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id FROM app_user WHERE role = ?1 ORDER BY id")?;
        let ids = stmt
            .query_map(params![role.as_str()], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }
}

impl RefreshTokenStore for SqliteMusicStore {
    fn blacklist_refresh_token(&self, jti: &str, user_id: i64, expires_at: i64) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR IGNORE INTO refresh_token_blacklist (jti, user_id, expires_at) VALUES (?1, ?2, ?3)",
            params![jti, user_id, expires_at],
        )?;
        Ok(())
    }

    fn is_refresh_token_blacklisted(&self, jti: &str) -> Result<bool> {
        let conn = self.conn();
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM refresh_token_blacklist WHERE jti = ?1",
                params![jti],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn prune_expired_blacklist(&self, now: i64) -> Result<usize> {
        let conn = self.conn();
        let removed = conn.execute(
            "DELETE FROM refresh_token_blacklist WHERE expires_at < ?1",
            params![now],
        )?;
        Ok(removed)
    }
}
