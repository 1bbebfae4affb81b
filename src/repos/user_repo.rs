//! users table CRUD

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::{new_id, now_rfc3339, parse_timestamp};
use crate::error::ApiResult;
use crate::models::{Role, User};

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

pub struct UserRepo;

impl UserRepo {
    pub fn create(conn: &Connection, new: &NewUser) -> ApiResult<User> {
        let id = new_id("usr");
        let now = now_rfc3339();

        conn.execute(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                id,
                new.username,
                new.email,
                new.password_hash,
                new.role.as_str(),
                now,
                now,
            ],
        )?;

        info!("[UserRepo] Created user id={}", id);
        Self::get(conn, &id)?.ok_or_else(|| crate::error::ApiError::database("insert lost"))
    }

    pub fn get(conn: &Connection, id: &str) -> ApiResult<Option<User>> {
        let user = conn
            .query_row(
                "SELECT id, username, email, password_hash, role, created_at, updated_at
                 FROM users WHERE id = ?1",
                params![id],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn find_by_email(conn: &Connection, email: &str) -> ApiResult<Option<User>> {
        let user = conn
            .query_row(
                "SELECT id, username, email, password_hash, role, created_at, updated_at
                 FROM users WHERE email = ?1",
                params![email],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn list(conn: &Connection) -> ApiResult<Vec<User>> {
        let mut stmt = conn.prepare(
            "SELECT id, username, email, password_hash, role, created_at, updated_at
             FROM users ORDER BY created_at",
        )?;
        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    pub fn list_admins(conn: &Connection) -> ApiResult<Vec<User>> {
        let mut stmt = conn.prepare(
            "SELECT id, username, email, password_hash, role, created_at, updated_at
             FROM users WHERE role = 'admin' ORDER BY created_at",
        )?;
        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Update username/email. Untouched fields keep their value.
    pub fn update_profile(
        conn: &Connection,
        id: &str,
        username: Option<&str>,
        email: Option<&str>,
    ) -> ApiResult<Option<User>> {
        let changed = conn.execute(
            "UPDATE users SET
                username = COALESCE(?2, username),
                email = COALESCE(?3, email),
                updated_at = ?4
             WHERE id = ?1",
            params![id, username, email, now_rfc3339()],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, id)
    }

    pub fn update_role(conn: &Connection, id: &str, role: Role) -> ApiResult<Option<User>> {
        let changed = conn.execute(
            "UPDATE users SET role = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, role.as_str(), now_rfc3339()],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        info!("[UserRepo] Updated role of {} to {}", id, role.as_str());
        Self::get(conn, id)
    }

    pub fn delete(conn: &Connection, id: &str) -> ApiResult<bool> {
        let changed = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        let role_raw: String = row.get(4)?;
        let role = Role::from_str(&role_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                format!("unknown role {:?}", role_raw).into(),
            )
        })?;
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            role,
            created_at: parse_timestamp(5, row.get(5)?)?,
            updated_at: parse_timestamp(6, row.get(6)?)?,
        })
    }
}
