//! HTTP handlers for events API

use crate::error::EventError;
use crate::models::{
    CreateEvent, DeleteOutcome, Event, EventResponse, InsertOutcome, MyEventsParams, UpcomingParams,
    UpdateEvent, UpdateOutcome,
};
use crate::repository::EventRepository;
use crate::service::EventService;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use axum_helpers::errors::responses::{
    BadRequestIdResponse, BadRequestValidationResponse, ForbiddenResponse,
    InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
};
use axum_helpers::{AuthPrincipal, JsonBody, SharedVerifier, require_bearer_auth};
use std::sync::Arc;
use tracing::instrument;

/// Events router state
pub type EventsState<R> = Arc<EventService<R>>;

/// Create the events router.
///
/// Reads are public; writes and `/my-events` go through bearer authentication.
pub fn events_router<R: EventRepository + 'static>(
    service: EventsState<R>,
    verifier: SharedVerifier,
) -> Router {
    let public = Router::new()
        .route("/events/upcoming", get(upcoming_events::<R>))
        .route("/event/{id}", get(get_event::<R>));

    let protected = Router::new()
        .route("/events", post(create_event::<R>))
        .route("/my-events", get(my_events::<R>))
        .route("/event/{id}", put(update_event::<R>).delete(delete_event::<R>))
        .route_layer(from_fn_with_state(verifier, require_bearer_auth));

    public.merge(protected).with_state(service)
}

fn to_responses(events: Vec<Event>) -> Vec<EventResponse> {
    events.into_iter().map(EventResponse::from).collect()
}

/// List upcoming events
#[utoipa::path(
    get,
    path = "/events/upcoming",
    params(UpcomingParams),
    responses(
        (status = 200, description = "Events dated after now", body = Vec<EventResponse>),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip(state))]
pub async fn upcoming_events<R: EventRepository>(
    State(state): State<EventsState<R>>,
    Query(params): Query<UpcomingParams>,
) -> Result<Json<Vec<EventResponse>>, EventError> {
    let events = state.upcoming(params.search, params.event_type).await?;
    Ok(Json(to_responses(events)))
}

/// Get event by ID
#[utoipa::path(
    get,
    path = "/event/{id}",
    params(
        ("id" = String, Path, description = "Event ID (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Event found", body = EventResponse),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip(state))]
pub async fn get_event<R: EventRepository>(
    State(state): State<EventsState<R>>,
    Path(id): Path<String>,
) -> Result<Json<EventResponse>, EventError> {
    let event = state.get(&id).await?;
    Ok(Json(event.into()))
}

/// Create a new event
#[utoipa::path(
    post,
    path = "/events",
    request_body = CreateEvent,
    responses(
        (status = 201, description = "Event created", body = InsertOutcome),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "events"
)]
#[instrument(skip(state, principal, input), fields(title = %input.title))]
pub async fn create_event<R: EventRepository>(
    State(state): State<EventsState<R>>,
    AuthPrincipal(principal): AuthPrincipal,
    JsonBody(input): JsonBody<CreateEvent>,
) -> Result<impl IntoResponse, EventError> {
    let outcome = state.create(&principal, input).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// List the caller's own events
#[utoipa::path(
    get,
    path = "/my-events",
    params(MyEventsParams),
    responses(
        (status = 200, description = "Events created by the caller", body = Vec<EventResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "events"
)]
#[instrument(skip(state, principal))]
pub async fn my_events<R: EventRepository>(
    State(state): State<EventsState<R>>,
    AuthPrincipal(principal): AuthPrincipal,
    Query(params): Query<MyEventsParams>,
) -> Result<Json<Vec<EventResponse>>, EventError> {
    let events = state.my_events(&principal, params.email).await?;
    Ok(Json(to_responses(events)))
}

/// Update an event owned by the caller
#[utoipa::path(
    put,
    path = "/event/{id}",
    params(
        ("id" = String, Path, description = "Event ID (24 hex characters)")
    ),
    request_body = UpdateEvent,
    responses(
        (status = 200, description = "Event updated", body = UpdateOutcome),
        (status = 400, response = BadRequestIdResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "events"
)]
#[instrument(skip(state, principal, body))]
pub async fn update_event<R: EventRepository>(
    State(state): State<EventsState<R>>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<serde_json::Value>,
) -> Result<Json<UpdateOutcome>, EventError> {
    let outcome = state.update(&principal, &id, body).await?;
    Ok(Json(outcome))
}

/// Delete an event owned by the caller
#[utoipa::path(
    delete,
    path = "/event/{id}",
    params(
        ("id" = String, Path, description = "Event ID (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Event deleted", body = DeleteOutcome),
        (status = 400, response = BadRequestIdResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "events"
)]
#[instrument(skip(state, principal))]
pub async fn delete_event<R: EventRepository>(
    State(state): State<EventsState<R>>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<String>,
) -> Result<Json<DeleteOutcome>, EventError> {
    let outcome = state.delete(&principal, &id).await?;
    Ok(Json(outcome))
}
