mod api;
mod app;
mod auth;
mod config;
mod db;
mod domain;
mod error;
mod ingest;
mod logging;
mod middleware;
mod routes;
mod services;

use anyhow::Result;

use auth::TokenService;
use services::Mailer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting CampusHire backend"
    );

    // Create database pool
    let pool = db::create_pool(&settings).await?;

    // Token service for issuing and verifying JWTs
    let tokens = TokenService::new(&settings);

    // SMTP mailer
    let mailer = Mailer::new(&settings);

    // Create application state
    let state = app::AppState::new(pool, settings.clone(), tokens, mailer);

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
