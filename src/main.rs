// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, and start HTTP server

use actix_web::{middleware::Logger, web, App, HttpServer};
use crm_places::config::{self, Config};
use crm_places::db::Repositories;
use crm_places::handlers;
use crm_places::services::{start_session_cleanup_task, start_throttle_cleanup_task, Throttles};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.clone()
        } else {
            "info,actix_web=info,sqlx=warn".to_string()
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    log::info!("Starting crm-places service...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    let repos = Repositories::postgres(pool);

    // 5. Throttles for the login and settings route groups
    let throttles = Arc::new(Throttles::from_config(&config));
    log::info!(
        "Throttles: login {}/min, settings {}/min",
        config.login_throttle_per_minute,
        config.settings_throttle_per_minute
    );

    // Background maintenance (every 5 minutes)
    start_session_cleanup_task(repos.sessions.clone(), 300);
    start_throttle_cleanup_task(throttles.clone(), 300);

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_data = web::Data::new(config);
    let repos_data = web::Data::new(repos);
    let throttles_data = web::Data::from(throttles);

    HttpServer::new(move || {
        App::new()
            // Application state (repositories, config, and throttles)
            .app_data(repos_data.clone())
            .app_data(config_data.clone())
            .app_data(throttles_data.clone())
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::configure)
    })
    .bind(&server_addr)?
    .run()
    .await
}
