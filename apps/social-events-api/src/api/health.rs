//! Liveness and readiness endpoints

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use domain_events::{EventRepository, EventsState};
use serde_json::Value;

pub const LIVENESS_MESSAGE: &str = "Social Events Server is running!";

/// `GET /` and `GET /ready`
pub fn router<R: EventRepository + 'static>(events: EventsState<R>) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/ready", get(readiness::<R>))
        .with_state(events)
}

async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// Pings MongoDB through the events repository
async fn readiness<R: EventRepository>(
    State(events): State<EventsState<R>>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let mongodb: HealthCheckFuture =
        Box::pin(async move { events.ping().await.map_err(|e| e.to_string()) });
    run_health_checks(vec![("mongodb", mongodb)]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use domain_events::{EventService, InMemoryEventRepository};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(EventService::new(InMemoryEventRepository::new())))
    }

    #[tokio::test]
    async fn test_liveness_is_plain_text() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], LIVENESS_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_readiness_reports_mongodb() {
        let response = app()
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["mongodb"], "connected");
    }
}
