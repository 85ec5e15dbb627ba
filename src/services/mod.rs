// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod auth_service;
pub mod credentials;
pub mod place_service;
pub mod throttle;
pub mod totp;

pub use auth_service::*;
pub use place_service::*;
pub use throttle::*;
