// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod account;
pub mod auth;
pub mod pagination;
pub mod place;
pub mod user;

pub use account::*;
pub use auth::*;
pub use pagination::*;
pub use place::*;
pub use user::*;
