// src/handlers/places.rs
// DOCUMENTATION: HTTP handlers for place operations
// PURPOSE: Parse requests, call services, return responses

use super::auth::AuthenticatedUser;
use crate::config::Config;
use crate::db::Repositories;
use crate::errors::CrmError;
use crate::models::{CreatePlaceRequest, DataResponse, ListQuery, PageRequest, UpdatePlaceRequest};
use crate::services::PlaceService;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// GET /api/places
/// Paginated list of the caller's places
pub async fn list_places(
    auth: AuthenticatedUser,
    repos: web::Data<Repositories>,
    config: web::Data<Config>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, CrmError> {
    let page = PageRequest::from_query(&query, config.default_page_size, config.max_page_size)?;
    let result = PlaceService::list_places(repos.places.as_ref(), auth.account_id(), page).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /api/places/{id}
pub async fn get_place(
    auth: AuthenticatedUser,
    repos: web::Data<Repositories>,
    path: web::Path<i64>,
) -> Result<impl Responder, CrmError> {
    let place =
        PlaceService::get_place(repos.places.as_ref(), auth.account_id(), path.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(DataResponse { data: place }))
}

/// POST /api/places
/// Create a new place
pub async fn create_place(
    auth: AuthenticatedUser,
    repos: web::Data<Repositories>,
    req: web::Json<CreatePlaceRequest>,
) -> Result<impl Responder, CrmError> {
    req.validate()?;

    let place =
        PlaceService::create_place(repos.places.as_ref(), auth.account_id(), req.into_inner())
            .await?;
    Ok(HttpResponse::Created().json(DataResponse { data: place }))
}

/// PUT /api/places/{id}
/// Update a place
pub async fn update_place(
    auth: AuthenticatedUser,
    repos: web::Data<Repositories>,
    path: web::Path<i64>,
    req: web::Json<UpdatePlaceRequest>,
) -> Result<impl Responder, CrmError> {
    req.validate()?;

    let place = PlaceService::update_place(
        repos.places.as_ref(),
        auth.account_id(),
        path.into_inner(),
        req.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(DataResponse { data: place }))
}

/// DELETE /api/places/{id}
pub async fn delete_place(
    auth: AuthenticatedUser,
    repos: web::Data<Repositories>,
    path: web::Path<i64>,
) -> Result<impl Responder, CrmError> {
    let deleted =
        PlaceService::delete_place(repos.places.as_ref(), auth.account_id(), path.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(deleted))
}

/// Configuration for place routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/places")
            .route("", web::get().to(list_places))
            .route("", web::post().to(create_place))
            .route("/{id}", web::get().to(get_place))
            .route("/{id}", web::put().to(update_place))
            .route("/{id}", web::delete().to(delete_place)),
    );
}
