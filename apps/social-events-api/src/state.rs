//! Application state management.
//!
//! The state is built once in `main` and cloned into each router (Arc and
//! client clones share the underlying pools).

use axum_helpers::SharedVerifier;
use domain_events::{EventService, EventsState, MongoEventRepository};
use mongodb::{Client, Database};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    pub db: Database,
    pub events: EventsState<MongoEventRepository>,
    /// Verifier used by the bearer middleware on write routes
    pub verifier: SharedVerifier,
}

impl AppState {
    pub fn new(
        config: crate::config::Config,
        mongo_client: Client,
        db: Database,
        verifier: SharedVerifier,
    ) -> Self {
        let events = Arc::new(EventService::new(MongoEventRepository::new(&db)));
        Self {
            config,
            mongo_client,
            db,
            events,
            verifier,
        }
    }
}
