// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Repository traits and their PostgreSQL implementations
//
// Handlers and services only see the traits, so the HTTP layer can be
// exercised against any storage that honours the same contract.

pub mod place_repository;
pub mod session_repository;
pub mod user_repository;

pub use place_repository::*;
pub use session_repository::*;
pub use user_repository::*;

use crate::errors::CrmError;
use crate::models::*;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// Place storage, always scoped by the owning account
#[async_trait]
pub trait PlaceRepository: Send + Sync {
    /// One page of the account's places plus the total count
    async fn list(
        &self,
        account_id: i64,
        page: &PageRequest,
    ) -> Result<(Vec<Place>, i64), CrmError>;

    /// None when the id does not exist or belongs to another account
    async fn find(&self, account_id: i64, id: i64) -> Result<Option<Place>, CrmError>;

    async fn create(&self, account_id: i64, req: &CreatePlaceRequest) -> Result<Place, CrmError>;

    /// Partial update, None when the place is not visible to the account
    async fn update(
        &self,
        account_id: i64,
        id: i64,
        req: &UpdatePlaceRequest,
    ) -> Result<Option<Place>, CrmError>;

    /// false when nothing was deleted
    async fn delete(&self, account_id: i64, id: i64) -> Result<bool, CrmError>;
}

/// Accounts, users and recovery codes
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_account(&self) -> Result<Account, CrmError>;

    async fn create_user(&self, new_user: &NewUser) -> Result<User, CrmError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, CrmError>;

    /// Case-insensitive lookup
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CrmError>;

    /// Whether another user already owns this address
    async fn email_taken(&self, email: &str, except_user_id: i64) -> Result<bool, CrmError>;

    /// Store a new address and clear its verification timestamp
    async fn update_email(&self, user_id: i64, email: &str) -> Result<User, CrmError>;

    async fn set_two_factor_secret(
        &self,
        user_id: i64,
        secret: Option<&str>,
    ) -> Result<(), CrmError>;

    /// Replace the user's recovery codes with the given digests
    async fn store_recovery_codes(
        &self,
        user_id: i64,
        code_hashes: &[String],
    ) -> Result<(), CrmError>;

    /// Mark one unused code as used, false when no unused code matches
    async fn consume_recovery_code(&self, user_id: i64, code_hash: &str)
        -> Result<bool, CrmError>;
}

/// Bearer sessions keyed by token digest
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert(&self, session: &Session) -> Result<(), CrmError>;

    /// Expired sessions are never returned
    async fn find(&self, token_hash: &str) -> Result<Option<Session>, CrmError>;

    async fn mark_two_factor_passed(&self, token_hash: &str) -> Result<(), CrmError>;

    async fn delete(&self, token_hash: &str) -> Result<(), CrmError>;

    /// Remove expired sessions, returns how many were removed
    async fn purge_expired(&self) -> Result<u64, CrmError>;
}

/// Shared application storage
#[derive(Clone)]
pub struct Repositories {
    pub places: Arc<dyn PlaceRepository>,
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Repositories {
            places: Arc::new(PgPlaceRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            sessions: Arc::new(PgSessionRepository::new(pool)),
        }
    }
}

/// Log a failed query and wrap it
pub(crate) fn database_error(action: &str, e: sqlx::Error) -> CrmError {
    log::error!("Failed to {}: {}", action, e);
    CrmError::DatabaseError(e.to_string())
}

/// Postgres unique_violation
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}
