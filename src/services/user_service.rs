//! User administration

use std::sync::Arc;

use tracing::info;

use crate::database::Database;
use crate::error::{ApiError, ApiResult};
use crate::models::{PublicUser, Role, UpdateUserRequest};
use crate::repos::UserRepo;

pub struct UserService {
    db: Arc<Database>,
}

impl UserService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn list(&self) -> ApiResult<Vec<PublicUser>> {
        let conn = self.db.conn()?;
        Ok(UserRepo::list(&conn)?
            .into_iter()
            .map(PublicUser::from)
            .collect())
    }

    /// Admin users, e.g. for course-teacher pickers.
    pub fn list_admins(&self) -> ApiResult<Vec<PublicUser>> {
        let conn = self.db.conn()?;
        Ok(UserRepo::list_admins(&conn)?
            .into_iter()
            .map(PublicUser::from)
            .collect())
    }

    pub fn get(&self, id: &str) -> ApiResult<PublicUser> {
        let conn = self.db.conn()?;
        UserRepo::get(&conn, id)?
            .map(PublicUser::from)
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub fn update_profile(&self, id: &str, req: &UpdateUserRequest) -> ApiResult<PublicUser> {
        if req.username.is_none() && req.email.is_none() {
            return Err(ApiError::validation("No update data provided."));
        }
        let conn = self.db.conn()?;
        UserRepo::update_profile(&conn, id, req.username.as_deref(), req.email.as_deref())?
            .map(PublicUser::from)
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub fn update_role(&self, id: &str, role_raw: Option<&str>) -> ApiResult<PublicUser> {
        let role_raw = role_raw
            .ok_or_else(|| ApiError::validation("Missing required fields: role"))?;
        let role = Role::from_str(role_raw).ok_or_else(|| {
            ApiError::validation("Invalid role value. Must be 'student' or 'admin'.")
        })?;

        let conn = self.db.conn()?;
        UserRepo::update_role(&conn, id, role)?
            .map(PublicUser::from)
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub fn delete(&self, id: &str) -> ApiResult<()> {
        let conn = self.db.conn()?;
        if !UserRepo::delete(&conn, id)? {
            return Err(ApiError::not_found("User not found"));
        }
        info!("[UserService] Deleted user {}", id);
        Ok(())
    }
}
