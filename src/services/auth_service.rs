// src/services/auth_service.rs
// DOCUMENTATION: Login, recovery login, second factor and email change
// PURPOSE: Everything behind the auth/2fa gates and the email change routes

use crate::db::{SessionRepository, UserRepository};
use crate::errors::CrmError;
use crate::models::{
    EmailChangeRequest, LoginRequest, LoginResponse, RecoveryLoginRequest, Session, User,
};
use crate::services::{credentials, totp};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Where the email change login sends the user next
pub const EMAIL_CHANGE_NEXT_STEP: &str = "/settings/emailchange2";

pub struct AuthService;

impl AuthService {
    /// Check email and password
    /// DOCUMENTATION: Unknown email and wrong password give the same error
    pub async fn authenticate(
        users: &dyn UserRepository,
        email: &str,
        password: &str,
    ) -> Result<User, CrmError> {
        let user = users.find_by_email(email.trim()).await?;

        match user {
            Some(user) if credentials::verify_password(password, &user.password_hash) => Ok(user),
            _ => {
                log::warn!("Rejected login for {}", email);
                Err(CrmError::InvalidCredentials)
            }
        }
    }

    /// Open a session and return the raw token
    pub async fn start_session(
        sessions: &dyn SessionRepository,
        user: &User,
        two_factor_passed: bool,
        ttl_seconds: i64,
    ) -> Result<String, CrmError> {
        let token = credentials::generate_token();
        let now = Utc::now();
        let expires_at = Duration::try_seconds(ttl_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                CrmError::InternalError(format!("session ttl {}s is out of range", ttl_seconds))
            })?;

        sessions
            .insert(&Session {
                token_hash: credentials::sha256_hex(&token),
                user_id: user.id,
                two_factor_passed,
                created_at: now,
                expires_at,
            })
            .await?;

        Ok(token)
    }

    /// Credential login
    /// DOCUMENTATION: Users enrolled in 2FA get a session that still has to
    /// pass POST /auth/2fa before reaching 2fa-gated routes
    pub async fn attempt_login(
        users: &dyn UserRepository,
        sessions: &dyn SessionRepository,
        req: &LoginRequest,
        ttl_seconds: i64,
        redirect: Option<&str>,
    ) -> Result<LoginResponse, CrmError> {
        let user = Self::authenticate(users, &req.email, &req.password).await?;
        let two_factor_required = user.has_two_factor();
        let token = Self::start_session(sessions, &user, !two_factor_required, ttl_seconds).await?;

        log::info!("User {} logged in", user.id);

        Ok(LoginResponse {
            token,
            two_factor_required,
            redirect: redirect.map(str::to_string),
            user: user.to_response(),
        })
    }

    /// Login with credentials plus a one-time recovery code
    /// DOCUMENTATION: The code is burnt on success and the session counts as
    /// having passed the second factor
    pub async fn recovery_login(
        users: &dyn UserRepository,
        sessions: &dyn SessionRepository,
        req: &RecoveryLoginRequest,
        ttl_seconds: i64,
    ) -> Result<LoginResponse, CrmError> {
        let user = Self::authenticate(users, &req.email, &req.password).await?;

        let code_hash = credentials::recovery_code_hash(&req.recovery);
        if !users.consume_recovery_code(user.id, &code_hash).await? {
            log::warn!("Invalid or used recovery code for user {}", user.id);
            return Err(CrmError::ValidationError(
                "The recovery code is invalid or has already been used".to_string(),
            ));
        }

        log::info!("User {} logged in with a recovery code", user.id);
        let token = Self::start_session(sessions, &user, true, ttl_seconds).await?;

        Ok(LoginResponse {
            token,
            two_factor_required: false,
            redirect: None,
            user: user.to_response(),
        })
    }

    /// Resolve a raw bearer token to its live session and user
    pub async fn resolve_session(
        users: &dyn UserRepository,
        sessions: &dyn SessionRepository,
        raw_token: &str,
    ) -> Result<(Session, User), CrmError> {
        let session = sessions
            .find(&credentials::sha256_hex(raw_token))
            .await?
            .filter(|s| !s.is_expired(Utc::now()))
            .ok_or(CrmError::Unauthorized)?;

        let user = users
            .find_by_id(session.user_id)
            .await?
            .ok_or(CrmError::Unauthorized)?;

        Ok((session, user))
    }

    /// Check a TOTP code and mark the session as having passed 2FA
    pub async fn verify_two_factor(
        sessions: &dyn SessionRepository,
        session: &Session,
        user: &User,
        code: &str,
    ) -> Result<(), CrmError> {
        let secret = match user.google2fa_secret.as_deref() {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                return Err(CrmError::InvalidInput(
                    "Two factor authentication is not enabled".to_string(),
                ))
            }
        };

        let now = Utc::now().timestamp().max(0) as u64;
        if !totp::verify(secret, code, now)? {
            log::warn!("Wrong one time password for user {}", user.id);
            return Err(CrmError::ValidationError(
                "The one time password is invalid".to_string(),
            ));
        }

        sessions.mark_two_factor_passed(&session.token_hash).await?;
        Ok(())
    }

    /// Replace the user's email address
    /// DOCUMENTATION: The address must not belong to another user; the new
    /// address starts unverified
    pub async fn change_email(
        users: &dyn UserRepository,
        user: &User,
        req: &EmailChangeRequest,
    ) -> Result<User, CrmError> {
        let new_email = req.newmail.trim();

        if users.email_taken(new_email, user.id).await? {
            return Err(CrmError::ValidationError(
                "The email has already been taken".to_string(),
            ));
        }

        let updated = users.update_email(user.id, new_email).await?;
        log::info!("User {} changed email address", user.id);
        Ok(updated)
    }

    pub async fn logout(
        sessions: &dyn SessionRepository,
        session: &Session,
    ) -> Result<(), CrmError> {
        sessions.delete(&session.token_hash).await
    }

    /// Enable 2FA for a user
    /// DOCUMENTATION: Returns the new secret and the raw recovery codes,
    /// which are never stored in clear
    pub async fn enable_two_factor(
        users: &dyn UserRepository,
        user_id: i64,
    ) -> Result<(String, Vec<String>), CrmError> {
        let secret = totp::generate_secret();
        let codes = credentials::generate_recovery_codes(credentials::RECOVERY_CODE_COUNT);
        let hashes: Vec<String> = codes
            .iter()
            .map(|c| credentials::recovery_code_hash(c))
            .collect();

        users.set_two_factor_secret(user_id, Some(&secret)).await?;
        users.store_recovery_codes(user_id, &hashes).await?;

        log::info!("Enabled two factor authentication for user {}", user_id);
        Ok((secret, codes))
    }
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired sessions
pub fn start_session_cleanup_task(sessions: Arc<dyn SessionRepository>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            match sessions.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => log::info!("Session cleanup: removed {} expired sessions", removed),
                Err(e) => log::warn!("Session cleanup failed: {}", e),
            }
        }
    });
}
