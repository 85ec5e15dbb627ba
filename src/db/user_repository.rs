// src/db/user_repository.rs
// DOCUMENTATION: Accounts, users and recovery codes in PostgreSQL

use super::{database_error, is_unique_violation, UserRepository};
use crate::errors::CrmError;
use crate::models::{Account, NewUser, User};
use async_trait::async_trait;
use sqlx::PgPool;

const USER_COLUMNS: &str = r#"
    id, account_id, first_name, last_name, email, password_hash,
    email_verified_at, google2fa_secret, created_at, updated_at
"#;

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_account(&self) -> Result<Account, CrmError> {
        sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (created_at, updated_at) VALUES (NOW(), NOW()) RETURNING id, created_at, updated_at",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("create account", e))
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User, CrmError> {
        let sql = format!(
            r#"
            INSERT INTO users (account_id, first_name, last_name, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(new_user.account_id)
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    CrmError::ValidationError("The email has already been taken".to_string())
                } else {
                    database_error("create user", e)
                }
            })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, CrmError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("fetch user", e))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CrmError> {
        let sql = format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("fetch user by email", e))
    }

    async fn email_taken(&self, email: &str, except_user_id: i64) -> Result<bool, CrmError> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1) AND id <> $2)",
        )
        .bind(email)
        .bind(except_user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("check email", e))?;

        Ok(row.0)
    }

    async fn update_email(&self, user_id: i64, email: &str) -> Result<User, CrmError> {
        let sql = format!(
            r#"
            UPDATE users
            SET email = $2, email_verified_at = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    CrmError::ValidationError("The email has already been taken".to_string())
                } else {
                    database_error("update email", e)
                }
            })?
            .ok_or_else(|| CrmError::NotFound("User".to_string()))
    }

    async fn set_two_factor_secret(
        &self,
        user_id: i64,
        secret: Option<&str>,
    ) -> Result<(), CrmError> {
        sqlx::query("UPDATE users SET google2fa_secret = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(secret)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("set two factor secret", e))?;

        Ok(())
    }

    async fn store_recovery_codes(
        &self,
        user_id: i64,
        code_hashes: &[String],
    ) -> Result<(), CrmError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error("begin transaction", e))?;

        sqlx::query("DELETE FROM recovery_codes WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| database_error("clear recovery codes", e))?;

        for hash in code_hashes {
            sqlx::query(
                "INSERT INTO recovery_codes (user_id, code_hash, used, created_at, updated_at) VALUES ($1, $2, false, NOW(), NOW())",
            )
            .bind(user_id)
            .bind(hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| database_error("store recovery code", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| database_error("commit recovery codes", e))
    }

    async fn consume_recovery_code(
        &self,
        user_id: i64,
        code_hash: &str,
    ) -> Result<bool, CrmError> {
        // Row lock makes concurrent submissions of the same code race-free
        let consumed: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE recovery_codes
            SET used = true, updated_at = NOW()
            WHERE id = (
                SELECT id FROM recovery_codes
                WHERE user_id = $1 AND code_hash = $2 AND used = false
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(code_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("consume recovery code", e))?;

        Ok(consumed.is_some())
    }
}
