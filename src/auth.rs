//! Token and password primitives
//!
//! HS256 bearer tokens carrying the user id and role, valid for one hour;
//! bcrypt for password hashes. Policy lives in `services::auth_service`,
//! this module only signs, verifies and parses.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::models::Role;

/// Tokens expire after one hour; there is no refresh mechanism.
pub const TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub role: String,
    /// Unix expiry timestamp.
    pub exp: i64,
}

pub fn issue_token(secret: &str, user_id: &str, role: Role) -> ApiResult<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: chrono::Utc::now().timestamp() + TOKEN_TTL_SECS,
    };
    encode_token(secret, &claims)
}

pub fn encode_token(secret: &str, claims: &Claims) -> ApiResult<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token signing failed: {}", e)))
}

/// Verify signature and expiry. Invalid, malformed or expired tokens are
/// all rejected with Forbidden.
pub fn verify_token(secret: &str, token: &str) -> ApiResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::forbidden("Invalid or expired token"))
}

/// Extract the token from an `Authorization: Bearer <token>` header.
/// A missing or non-Bearer header is Unauthorized (not Forbidden): the
/// caller supplied no credential at all.
pub fn bearer_token(header: Option<&str>) -> ApiResult<&str> {
    let header = header.ok_or_else(|| ApiError::unauthorized("Unauthorized: no token provided"))?;
    header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Unauthorized: no token provided"))
}

pub fn hash_password(password: &str, cost: u32) -> ApiResult<String> {
    bcrypt::hash(password, cost).map_err(|e| ApiError::Internal(format!("bcrypt: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    bcrypt::verify(password, hash).map_err(|e| ApiError::Internal(format!("bcrypt: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_preserves_claims() {
        let token = issue_token("s3cret", "usr_abc", Role::Admin).unwrap();
        let claims = verify_token("s3cret", &token).unwrap();
        assert_eq!(claims.sub, "usr_abc");
        assert_eq!(claims.role, "admin");
        assert!(claims.exp > chrono::Utc::now().timestamp());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("s3cret", "usr_abc", Role::Student).unwrap();
        let err = verify_token("other", &token).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            sub: "usr_abc".to_string(),
            role: "student".to_string(),
            exp: chrono::Utc::now().timestamp() - 120,
        };
        let token = encode_token("s3cret", &claims).unwrap();
        let err = verify_token("s3cret", &token).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert!(matches!(
            bearer_token(None).unwrap_err(),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            bearer_token(Some("Basic abc")).unwrap_err(),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            bearer_token(Some("Bearer ")).unwrap_err(),
            ApiError::Unauthorized(_)
        ));
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter2", 4).unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }
}
