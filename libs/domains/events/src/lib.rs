//! Events Domain
//!
//! Listing, searching and owner-gated editing of social events stored in
//! MongoDB:
//! - Public reads: upcoming events (title search, type filter) and single events
//! - Authenticated writes: only the creator of an event may change or delete it
//!
//! ```text
//!  HTTP ─► handlers ─► EventService ─► EventRepository ─► MongoDB `events`
//!            │           (id, owner,      (Mongo / in-memory)
//!            │            validation)
//!            └── require_bearer_auth on writes
//! ```

use axum_helpers::errors::responses::{
    BadRequestIdResponse, BadRequestValidationResponse, ForbiddenResponse,
    InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

mod error;
mod handlers;
mod models;
mod mongodb;
mod repository;
mod service;

pub use error::{EventError, Result};
pub use handlers::{EventsState, events_router};
pub use models::{
    CreateEvent, DeleteOutcome, Event, EventQuery, EventResponse, InsertOutcome, MyEventsParams,
    UpcomingParams, UpdateEvent, UpdateOutcome, iso_millis, parse_event_id,
};
pub use mongodb::{EVENTS_COLLECTION, MongoEventRepository};
pub use repository::{EventRepository, InMemoryEventRepository};
pub use service::EventService;

/// OpenAPI documentation for Events API
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::upcoming_events,
        handlers::get_event,
        handlers::create_event,
        handlers::my_events,
        handlers::update_event,
        handlers::delete_event,
    ),
    components(
        schemas(
            EventResponse,
            CreateEvent,
            UpdateEvent,
            InsertOutcome,
            UpdateOutcome,
            DeleteOutcome,
        ),
        responses(
            BadRequestIdResponse,
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            InternalServerErrorResponse,
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "events", description = "Social events: upcoming listings and creator-owned CRUD")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected operations
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
