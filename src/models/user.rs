// src/models/user.rs
// DOCUMENTATION: Users and their one-time recovery codes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::AccountRef;

/// Represents a user row
/// DOCUMENTATION: A user belongs to one account and sees only that account's data
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub account_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,

    /// Argon2 PHC string, never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub email_verified_at: Option<DateTime<Utc>>,

    /// Hex-encoded TOTP secret, set when 2FA is enabled
    #[serde(skip_serializing)]
    pub google2fa_secret: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub account_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
}

/// User as exposed by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub object: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub email_verified: bool,
    pub two_factor_enabled: bool,
    pub account: AccountRef,
}

impl User {
    pub fn has_two_factor(&self) -> bool {
        self.google2fa_secret
            .as_deref()
            .map(|s| !s.is_empty())
            .unwrap_or(false)
    }

    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            object: "user".to_string(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            email_verified: self.email_verified_at.is_some(),
            two_factor_enabled: self.has_two_factor(),
            account: AccountRef {
                id: self.account_id,
            },
        }
    }
}
