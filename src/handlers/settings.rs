// src/handlers/settings.rs
// DOCUMENTATION: Two-step email change
// PURPOSE: Step 1 authenticates (throttled), step 2 is behind auth + 2fa

use super::auth::{client_key, TwoFactorUser};
use crate::config::Config;
use crate::db::Repositories;
use crate::errors::CrmError;
use crate::models::{DataResponse, EmailChangeRequest, FormDescriptor, LoginRequest};
use crate::services::{AuthService, Throttles, EMAIL_CHANGE_NEXT_STEP};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

/// GET /settings/emailchange1
pub async fn show_login_form() -> impl Responder {
    HttpResponse::Ok().json(FormDescriptor {
        form: "emailchange1",
        action: "/settings/emailchange1",
        method: "POST",
        fields: vec!["email", "password"],
    })
}

/// POST /settings/emailchange1
/// Authenticate, then continue at step 2
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
        Some(EMAIL_CHANGE_NEXT_STEP),
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /settings/emailchange2
/// Current address of the signed-in user
pub async fn index(
    TwoFactorUser(auth): TwoFactorUser,
    throttles: web::Data<Throttles>,
) -> Result<impl Responder, CrmError> {
    throttles.settings.check(&format!("user:{}", auth.user.id))?;

    Ok(HttpResponse::Ok().json(DataResponse {
        data: auth.user.to_response(),
    }))
}

/// POST /settings/emailchange2
/// Save the new address
pub async fn save(
    TwoFactorUser(auth): TwoFactorUser,
    repos: web::Data<Repositories>,
    throttles: web::Data<Throttles>,
    body: web::Json<EmailChangeRequest>,
) -> Result<impl Responder, CrmError> {
    throttles.settings.check(&format!("user:{}", auth.user.id))?;
    body.validate()?;

    let user = AuthService::change_email(repos.users.as_ref(), &auth.user, &body).await?;

    Ok(HttpResponse::Ok().json(DataResponse {
        data: user.to_response(),
    }))
}

/// Configuration for settings routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/settings")
            .route("/emailchange1", web::get().to(show_login_form))
            .route("/emailchange1", web::post().to(login))
            .route("/emailchange2", web::get().to(index))
            .route("/emailchange2", web::post().to(save)),
    );
}
