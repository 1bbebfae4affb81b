//! Registration, login and request authentication
//!
//! Login failure is deliberately indistinguishable between "no such user"
//! and "wrong password" so the endpoint can not be used for enumeration.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{info, warn};

use crate::auth;
use crate::database::Database;
use crate::error::{ApiError, ApiResult};
use crate::models::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, Role};
use crate::repos::{NewUser, UserRepo};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").expect("valid email regex")
});

const BAD_CREDENTIALS: &str = "Invalid credentials - email or password is incorrect";

/// The authenticated caller, resolved from a verified token plus a fresh
/// user lookup (a token for a since-deleted user is rejected).
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

pub struct AuthService {
    db: Arc<Database>,
    jwt_secret: String,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(db: Arc<Database>, jwt_secret: String, bcrypt_cost: u32) -> Self {
        Self {
            db,
            jwt_secret,
            bcrypt_cost,
        }
    }

    pub fn register(&self, req: &RegisterRequest) -> ApiResult<PublicUser> {
        let username = non_empty(req.username.as_deref())
            .ok_or_else(|| ApiError::validation("Missing required fields: username"))?;
        let email = non_empty(req.email.as_deref())
            .ok_or_else(|| ApiError::validation("Missing required fields: email"))?;
        let password = non_empty(req.password.as_deref())
            .ok_or_else(|| ApiError::validation("Missing required fields: password"))?;

        if !EMAIL_RE.is_match(email) {
            return Err(ApiError::validation("Invalid email address"));
        }

        let role = match req.role.as_deref() {
            None => Role::Student,
            Some(raw) => Role::from_str(raw).ok_or_else(|| {
                ApiError::validation("Invalid role value. Must be 'student' or 'admin'.")
            })?,
        };

        let conn = self.db.conn()?;
        if UserRepo::find_by_email(&conn, email)?.is_some() {
            return Err(ApiError::conflict("User already exists"));
        }

        let password_hash = auth::hash_password(password, self.bcrypt_cost)?;
        let user = UserRepo::create(
            &conn,
            &NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                role,
            },
        )?;

        info!("[AuthService] Registered user {}", user.id);
        Ok(user.into())
    }

    pub fn login(&self, req: &LoginRequest) -> ApiResult<LoginResponse> {
        let email = non_empty(req.email.as_deref())
            .ok_or_else(|| ApiError::validation("Missing required fields: email"))?;
        let password = non_empty(req.password.as_deref())
            .ok_or_else(|| ApiError::validation("Missing required fields: password"))?;

        let conn = self.db.conn()?;
        let user = UserRepo::find_by_email(&conn, email)?
            .ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS))?;

        if !auth::verify_password(password, &user.password_hash)? {
            warn!("[AuthService] Failed login for {}", email);
            return Err(ApiError::unauthorized(BAD_CREDENTIALS));
        }

        let token = auth::issue_token(&self.jwt_secret, &user.id, user.role)?;
        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    /// Resolve the caller from the `Authorization` header: 401 when the
    /// header is absent, 403 when the token does not verify or the user
    /// behind it no longer exists.
    pub fn authenticate(&self, auth_header: Option<&str>) -> ApiResult<AuthUser> {
        let token = auth::bearer_token(auth_header)?;
        let claims = auth::verify_token(&self.jwt_secret, token)?;

        let conn = self.db.conn()?;
        let user = UserRepo::get(&conn, &claims.sub)?
            .ok_or_else(|| ApiError::forbidden("Invalid or expired token"))?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        })
    }

    pub fn require_admin(&self, user: &AuthUser) -> ApiResult<()> {
        if user.role != Role::Admin {
            return Err(ApiError::forbidden("Forbidden: admins only"));
        }
        Ok(())
    }

    /// Gate for endpoints a user may call on their own resource.
    pub fn require_self_or_admin(&self, user: &AuthUser, target_user_id: &str) -> ApiResult<()> {
        if user.role != Role::Admin && user.id != target_user_id {
            return Err(ApiError::forbidden("Forbidden: not your resource"));
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
