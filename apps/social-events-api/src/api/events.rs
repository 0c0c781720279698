//! Events API routes

use crate::state::AppState;
use axum::Router;
use domain_events::MongoEventRepository;
use tracing::info;

/// Public reads plus bearer-protected writes, backed by MongoDB
pub fn router(state: &AppState) -> Router {
    domain_events::events_router(state.events.clone(), state.verifier.clone())
}

/// Initialize event indexes in MongoDB
pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    let repository = MongoEventRepository::new(db);
    repository
        .create_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create event indexes: {}", e))?;
    info!("Event collection indexes created");
    Ok(())
}
