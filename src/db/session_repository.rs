// src/db/session_repository.rs
// DOCUMENTATION: Bearer sessions in PostgreSQL

use super::{database_error, SessionRepository};
use crate::errors::CrmError;
use crate::models::Session;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn insert(&self, session: &Session) -> Result<(), CrmError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, user_id, two_factor_passed, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&session.token_hash)
        .bind(session.user_id)
        .bind(session.two_factor_passed)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("create session", e))?;

        Ok(())
    }

    async fn find(&self, token_hash: &str) -> Result<Option<Session>, CrmError> {
        sqlx::query_as::<_, Session>(
            r#"
            SELECT token_hash, user_id, two_factor_passed, created_at, expires_at
            FROM sessions
            WHERE token_hash = $1 AND expires_at > NOW()
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("fetch session", e))
    }

    async fn mark_two_factor_passed(&self, token_hash: &str) -> Result<(), CrmError> {
        sqlx::query("UPDATE sessions SET two_factor_passed = true WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("update session", e))?;

        Ok(())
    }

    async fn delete(&self, token_hash: &str) -> Result<(), CrmError> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("delete session", e))?;

        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, CrmError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("purge sessions", e))?;

        Ok(result.rows_affected())
    }
}
