// In-memory repositories and factories for HTTP-level tests
#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use async_trait::async_trait;
use chrono::Utc;
use crm_places::config::Config;
use crm_places::db::{PlaceRepository, Repositories, SessionRepository, UserRepository};
use crm_places::errors::CrmError;
use crm_places::handlers;
use crm_places::models::*;
use crm_places::services::{credentials, AuthService, Throttles};
use fake::faker::address::en::{CityName, StateName, StreetName, ZipCode};
use fake::Fake;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const PASSWORD: &str = "correct horse battery staple";

#[derive(Default)]
pub struct MemoryPlaces {
    rows: Mutex<Vec<Place>>,
}

impl MemoryPlaces {
    /// Raw row lookup that ignores ownership, like a direct database query
    pub fn row(&self, id: i64) -> Option<Place> {
        self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned()
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl PlaceRepository for MemoryPlaces {
    async fn list(
        &self,
        account_id: i64,
        page: &PageRequest,
    ) -> Result<(Vec<Place>, i64), CrmError> {
        let mut owned: Vec<Place> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect();

        match page.sort {
            SortOrder::CreatedAtAsc => owned.sort_by_key(|p| (p.created_at, p.id)),
            SortOrder::CreatedAtDesc => {
                owned.sort_by_key(|p| (p.created_at, p.id));
                owned.reverse();
            }
            SortOrder::UpdatedAtAsc => owned.sort_by_key(|p| (p.updated_at, p.id)),
            SortOrder::UpdatedAtDesc => {
                owned.sort_by_key(|p| (p.updated_at, p.id));
                owned.reverse();
            }
        }

        let total = owned.len() as i64;
        let data = owned
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .collect();
        Ok((data, total))
    }

    async fn find(&self, account_id: i64, id: i64) -> Result<Option<Place>, CrmError> {
        Ok(self.row(id).filter(|p| p.account_id == account_id))
    }

    async fn create(&self, account_id: i64, req: &CreatePlaceRequest) -> Result<Place, CrmError> {
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        let place = Place {
            id: rows.iter().map(|p| p.id).max().unwrap_or(0) + 1,
            account_id,
            street: req.street.clone(),
            city: req.city.clone(),
            province: req.province.clone(),
            postal_code: req.postal_code.clone(),
            country: req.country.clone(),
            latitude: req.latitude,
            longitude: req.longitude,
            created_at: now,
            updated_at: now,
        };
        rows.push(place.clone());
        Ok(place)
    }

    async fn update(
        &self,
        account_id: i64,
        id: i64,
        req: &UpdatePlaceRequest,
    ) -> Result<Option<Place>, CrmError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(place) = rows
            .iter_mut()
            .find(|p| p.id == id && p.account_id == account_id)
        else {
            return Ok(None);
        };
        apply_update(place, req);
        place.updated_at = Utc::now();
        Ok(Some(place.clone()))
    }

    async fn delete(&self, account_id: i64, id: i64) -> Result<bool, CrmError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| !(p.id == id && p.account_id == account_id));
        Ok(rows.len() < before)
    }
}

/// Same semantics as the COALESCE update in PgPlaceRepository: only
/// provided fields change
fn apply_update(place: &mut Place, req: &UpdatePlaceRequest) {
    let fields = [
        (&mut place.street, &req.street),
        (&mut place.city, &req.city),
        (&mut place.province, &req.province),
        (&mut place.postal_code, &req.postal_code),
        (&mut place.country, &req.country),
    ];
    for (current, provided) in fields {
        if provided.is_some() {
            *current = provided.clone();
        }
    }
    if req.latitude.is_some() {
        place.latitude = req.latitude;
    }
    if req.longitude.is_some() {
        place.longitude = req.longitude;
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    accounts: Mutex<Vec<Account>>,
    users: Mutex<Vec<User>>,
    /// (user_id, code_hash, used)
    recovery_codes: Mutex<Vec<(i64, String, bool)>>,
}

impl MemoryUsers {
    pub fn user(&self, id: i64) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn create_account(&self) -> Result<Account, CrmError> {
        let mut accounts = self.accounts.lock().unwrap();
        let now = Utc::now();
        let account = Account {
            id: accounts.len() as i64 + 1,
            created_at: now,
            updated_at: now,
        };
        accounts.push(account.clone());
        Ok(account)
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User, CrmError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(CrmError::ValidationError(
                "The email has already been taken".to_string(),
            ));
        }
        let now = Utc::now();
        let user = User {
            id: users.len() as i64 + 1,
            account_id: new_user.account_id,
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            email_verified_at: Some(now),
            google2fa_secret: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, CrmError> {
        Ok(self.user(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CrmError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn email_taken(&self, email: &str, except_user_id: i64) -> Result<bool, CrmError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.id != except_user_id && u.email.eq_ignore_ascii_case(email)))
    }

    async fn update_email(&self, user_id: i64, email: &str) -> Result<User, CrmError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| CrmError::NotFound("User".to_string()))?;
        user.email = email.to_string();
        user.email_verified_at = None;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_two_factor_secret(
        &self,
        user_id: i64,
        secret: Option<&str>,
    ) -> Result<(), CrmError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.google2fa_secret = secret.map(str::to_string);
        }
        Ok(())
    }

    async fn store_recovery_codes(
        &self,
        user_id: i64,
        code_hashes: &[String],
    ) -> Result<(), CrmError> {
        let mut codes = self.recovery_codes.lock().unwrap();
        codes.retain(|(owner, _, _)| *owner != user_id);
        codes.extend(code_hashes.iter().map(|h| (user_id, h.clone(), false)));
        Ok(())
    }

    async fn consume_recovery_code(
        &self,
        user_id: i64,
        code_hash: &str,
    ) -> Result<bool, CrmError> {
        let mut codes = self.recovery_codes.lock().unwrap();
        match codes
            .iter_mut()
            .find(|(owner, hash, used)| *owner == user_id && hash == code_hash && !*used)
        {
            Some(entry) => {
                entry.2 = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemorySessions {
    sessions: Mutex<HashMap<String, Session>>,
}

#[async_trait]
impl SessionRepository for MemorySessions {
    async fn insert(&self, session: &Session) -> Result<(), CrmError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.token_hash.clone(), session.clone());
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> Result<Option<Session>, CrmError> {
        let now = Utc::now();
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .get(token_hash)
            .filter(|s| !s.is_expired(now))
            .cloned())
    }

    async fn mark_two_factor_passed(&self, token_hash: &str) -> Result<(), CrmError> {
        if let Some(session) = self.sessions.lock().unwrap().get_mut(token_hash) {
            session.two_factor_passed = true;
        }
        Ok(())
    }

    async fn delete(&self, token_hash: &str) -> Result<(), CrmError> {
        self.sessions.lock().unwrap().remove(token_hash);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, CrmError> {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        Ok((before - sessions.len()) as u64)
    }
}

/// A signed-in test user
pub struct SignedIn {
    pub user: User,
    pub token: String,
}

impl SignedIn {
    pub fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token))
    }
}

/// Shared state behind one test application
pub struct TestContext {
    pub places: Arc<MemoryPlaces>,
    pub users: Arc<MemoryUsers>,
    pub sessions: Arc<MemorySessions>,
    pub config: Config,
    pub throttles: Arc<Throttles>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let throttles = Arc::new(Throttles::from_config(&config));
        TestContext {
            places: Arc::new(MemoryPlaces::default()),
            users: Arc::new(MemoryUsers::default()),
            sessions: Arc::new(MemorySessions::default()),
            config,
            throttles,
        }
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            places: self.places.clone(),
            users: self.users.clone(),
            sessions: self.sessions.clone(),
        }
    }

    /// The service as main.rs wires it, minus logging middleware
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.repositories()))
            .app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::from(self.throttles.clone()))
            .configure(handlers::configure)
    }

    /// New account with one user whose password is PASSWORD
    pub async fn create_user(&self, email: &str) -> User {
        let account = self.users.create_account().await.unwrap();
        self.users
            .create_user(&NewUser {
                account_id: account.id,
                first_name: "Test".to_string(),
                last_name: Some("User".to_string()),
                email: email.to_string(),
                password_hash: credentials::hash_password(PASSWORD).unwrap(),
            })
            .await
            .unwrap()
    }

    /// New user with a session that already passed any second factor
    pub async fn signin(&self) -> SignedIn {
        let email = format!("user{}@example.com", self.users.users.lock().unwrap().len() + 1);
        let user = self.create_user(&email).await;
        let token = AuthService::start_session(
            self.sessions.as_ref(),
            &user,
            true,
            self.config.session_ttl_seconds,
        )
        .await
        .unwrap();
        SignedIn { user, token }
    }

    /// Place factory: random address, no coordinates
    pub async fn create_places(&self, account_id: i64, count: usize) -> Vec<Place> {
        let mut created = Vec::with_capacity(count);
        for _ in 0..count {
            let req = CreatePlaceRequest {
                street: Some(StreetName().fake()),
                city: Some(CityName().fake()),
                province: Some(StateName().fake()),
                postal_code: Some(ZipCode().fake()),
                country: Some("USA".to_string()),
                latitude: None,
                longitude: None,
            };
            created.push(self.places.create(account_id, &req).await.unwrap());
        }
        created
    }
}
