//! API routes module
//!
//! These are nested under `/api` by `axum_helpers::create_router`.

pub mod events;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: &AppState) -> Router {
    events::router(state)
}
