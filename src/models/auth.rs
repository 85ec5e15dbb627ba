// src/models/auth.rs
// DOCUMENTATION: Sessions and the request/response DTOs of the login flows
// PURPOSE: Email change, recovery login and second factor payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::UserResponse;

/// Bearer session
/// DOCUMENTATION: Only the SHA-256 digest of the token is persisted
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub token_hash: String,
    pub user_id: i64,

    /// Second factor satisfied (TOTP, recovery code, or not enrolled)
    pub two_factor_passed: bool,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Body of POST /auth/login and POST /settings/emailchange1
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Body of POST /auth/login-recovery
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecoveryLoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,

    /// One unused recovery code
    #[validate(length(min = 1, max = 64))]
    pub recovery: String,
}

/// Body of POST /auth/2fa
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TwoFactorRequest {
    #[validate(length(equal = 6))]
    pub one_time_password: String,
}

/// Body of POST /settings/emailchange2
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmailChangeRequest {
    #[validate(email, length(max = 2083))]
    pub newmail: String,
}

/// Returned by every successful login route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Raw bearer token, shown once
    pub token: String,
    pub two_factor_required: bool,

    /// Next step of the flow, when there is one
    pub redirect: Option<String>,
    pub user: UserResponse,
}

/// Description of a form for the GET "show form" routes
#[derive(Debug, Clone, Serialize)]
pub struct FormDescriptor {
    pub form: &'static str,
    pub action: &'static str,
    pub method: &'static str,
    pub fields: Vec<&'static str>,
}
