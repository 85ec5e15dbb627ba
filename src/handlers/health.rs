// src/handlers/health.rs
// DOCUMENTATION: Liveness check for load balancers
// PURPOSE: GET /health, no auth, no database access

use crate::config::Config;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

pub async fn health_check(config: web::Data<Config>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "crm-places",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": config.environment,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
