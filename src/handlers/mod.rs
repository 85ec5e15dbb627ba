// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components and assemble the route table

pub mod auth;
pub mod health;
pub mod places;
pub mod settings;

pub use auth::config as auth_config;
pub use auth::{AuthenticatedUser, TwoFactorUser};
pub use health::config as health_config;
pub use places::config as places_config;
pub use settings::config as settings_config;

use crate::errors::CrmError;
use actix_web::web;

/// Extractor error handlers so malformed input uses the JSON error body
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| CrmError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| CrmError::InvalidInput(err.to_string()).into()),
    )
    // Ids that are not integers can never match a record
    .app_data(
        web::PathConfig::default()
            .error_handler(|_err, _req| CrmError::NotFound("Resource".to_string()).into()),
    );
}

/// Every route of the service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(extractor_config)
        .configure(health_config)
        .configure(auth_config)
        .configure(settings_config)
        .configure(places_config);
}
