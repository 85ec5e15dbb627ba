// src/lib.rs
// DOCUMENTATION: Library root shared by the server, the CLI and the tests

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
