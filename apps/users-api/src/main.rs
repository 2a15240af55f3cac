use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    // Variables from a `.env` file never override the process environment
    let dotenv_path = config::load_dotenv();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.environment);

    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }

    // Open and index the store; failures leave the server running without it
    let state = AppState::new(config).await;

    // Build router with API routes
    let api_routes = api::routes(&state);

    // Create a router with OpenAPI docs
    let router = create_router::<openapi::ApiDoc>(api_routes)?;

    // Merge health endpoints
    let app = router.merge(health_router(state.config.app));

    info!("Starting Users API with graceful shutdown (30s timeout)");

    let server_config = state.config.server.clone();
    let mongo = state.mongo;

    create_production_app(
        app,
        &server_config,
        Duration::from_secs(30),
        async move {
            if let Ok(store) = mongo {
                info!("Shutting down: closing MongoDB connections");
                store.client.shutdown().await;
                info!("MongoDB connection closed successfully");
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Users API shutdown complete");
    Ok(())
}
