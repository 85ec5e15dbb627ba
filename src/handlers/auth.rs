// src/handlers/auth.rs
// DOCUMENTATION: auth / 2fa gates and the /auth routes
// PURPOSE: Bearer session extractors plus login, recovery login, 2FA and logout

use crate::config::Config;
use crate::db::Repositories;
use crate::errors::CrmError;
use crate::models::{
    FormDescriptor, LoginRequest, RecoveryLoginRequest, Session, TwoFactorRequest, User,
};
use crate::services::{AuthService, Throttles};
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use std::future::Future;
use std::net::IpAddr;
use std::pin::Pin;
use validator::Validate;

/// Caller holding a live session ("auth" gate)
/// DOCUMENTATION: Reads `Authorization: Bearer <token>`; missing, unknown
/// or expired tokens are rejected with 401
pub struct AuthenticatedUser {
    pub user: User,
    pub session: Session,
}

impl AuthenticatedUser {
    pub fn account_id(&self) -> i64 {
        self.user.account_id
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = CrmError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let repos = req.app_data::<web::Data<Repositories>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let repos = repos.ok_or_else(|| {
                CrmError::InternalError("repositories are not registered".to_string())
            })?;
            let token = token.ok_or(CrmError::Unauthorized)?;

            let (session, user) =
                AuthService::resolve_session(repos.users.as_ref(), repos.sessions.as_ref(), &token)
                    .await?;

            Ok(AuthenticatedUser { user, session })
        })
    }
}

/// Caller that also satisfied the second factor ("auth" + "2fa" gates)
/// DOCUMENTATION: Users without 2FA pass straight through
pub struct TwoFactorUser(pub AuthenticatedUser);

impl FromRequest for TwoFactorUser {
    type Error = CrmError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let authenticated = AuthenticatedUser::from_request(req, payload);

        Box::pin(async move {
            let auth = authenticated.await?;
            if auth.user.has_two_factor() && !auth.session.two_factor_passed {
                return Err(CrmError::TwoFactorRequired);
            }
            Ok(TwoFactorUser(auth))
        })
    }
}

/// Token from the Authorization header, if any
fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Throttle key for guest routes
/// DOCUMENTATION: The TCP peer address. X-Forwarded-For is only read when the
/// peer is a trusted proxy, walking right to left past other trusted hops
pub(crate) fn client_key(req: &HttpRequest, trusted_proxies: &[IpAddr]) -> String {
    let Some(peer) = req.peer_addr().map(|addr| addr.ip()) else {
        return "unknown".to_string();
    };
    if !trusted_proxies.contains(&peer) {
        return peer.to_string();
    }

    let forwarded: Vec<IpAddr> = req
        .headers()
        .get_all("X-Forwarded-For")
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(','))
        .filter_map(|ip| ip.trim().parse().ok())
        .collect();

    forwarded
        .into_iter()
        .rev()
        .find(|ip| !trusted_proxies.contains(ip))
        .unwrap_or(peer)
        .to_string()
}

/// POST /auth/login
pub async fn login(
    req: HttpRequest,
    repos: web::Data<Repositories>,
    config: web::Data<Config>,
    throttles: web::Data<Throttles>,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, CrmError> {
    throttles.login.check(&client_key(&req, &config.trusted_proxies))?;
    body.validate()?;

    let response = AuthService::attempt_login(
        repos.users.as_ref(),
        repos.sessions.as_ref(),
        &body,
        config.session_ttl_seconds,
        None,
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /auth/login-recovery
pub async fn show_recovery_login() -> impl Responder {
    HttpResponse::Ok().json(FormDescriptor {
        form: "recovery_login",
        action: "/auth/login-recovery",
        method: "POST",
        fields: vec!["email", "password", "recovery"],
    })
}

/// POST /auth/login-recovery
/// Log in with a one-time recovery code instead of a TOTP code
pub async fn recovery_login(
    req: HttpRequest,
    repos: web::Data<Repositories>,
    config: web::Data<Config>,
    throttles: web::Data<Throttles>,
    body: web::Json<RecoveryLoginRequest>,
) -> Result<impl Responder, CrmError> {
    throttles.login.check(&client_key(&req, &config.trusted_proxies))?;
    body.validate()?;

    let response = AuthService::recovery_login(
        repos.users.as_ref(),
        repos.sessions.as_ref(),
        &body,
        config.session_ttl_seconds,
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// POST /auth/2fa
pub async fn verify_two_factor(
    auth: AuthenticatedUser,
    repos: web::Data<Repositories>,
    throttles: web::Data<Throttles>,
    body: web::Json<TwoFactorRequest>,
) -> Result<impl Responder, CrmError> {
    throttles.login.check(&format!("user:{}", auth.user.id))?;
    body.validate()?;

    AuthService::verify_two_factor(
        repos.sessions.as_ref(),
        &auth.session,
        &auth.user,
        &body.one_time_password,
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({ "two_factor_passed": true })))
}

/// POST /auth/logout
pub async fn logout(
    auth: AuthenticatedUser,
    repos: web::Data<Repositories>,
) -> Result<impl Responder, CrmError> {
    AuthService::logout(repos.sessions.as_ref(), &auth.session).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configuration for auth routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/login-recovery", web::get().to(show_recovery_login))
            .route("/login-recovery", web::post().to(recovery_login))
            .route("/2fa", web::post().to(verify_two_factor))
            .route("/logout", web::post().to(logout)),
    );
}
