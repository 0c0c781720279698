use axum_helpers::server::{create_production_app, create_router, health_router};
use axum_helpers::verifier_from_config;
use core_config::load_dotenv;
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
    load_dotenv();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());

    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(config.mongodb.database());

    let health = database::mongodb::check_health_detailed(&mongo_client).await;
    info!(
        response_time_ms = health.response_time_ms,
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database()
    );

    api::events::init_indexes(&db).await?;

    let verifier = verifier_from_config(&config.auth);
    info!(provider = %config.auth.provider(), "Bearer authentication configured");

    let state = AppState::new(config, mongo_client, db, verifier);

    // `/`, `/health` and `/ready` sit beside the docs; everything else under `/api`
    let root = api::health::router(state.events.clone()).merge(health_router(state.config.app));
    let router = create_router::<openapi::ApiDoc>(api::routes(&state), root)?;

    info!("Starting Social Events API with graceful shutdown (30s timeout)");

    create_production_app(
        router,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing MongoDB connections");
            drop(state.mongo_client);
            info!("MongoDB connection closed successfully");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Social Events API shutdown complete");
    Ok(())
}
