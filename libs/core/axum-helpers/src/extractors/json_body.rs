//! JSON extractor whose rejections render as [`AppError`] responses.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;

/// Like [`axum::Json`], but malformed bodies produce the standard error body
/// with status `400` (`415` for a missing content type).
///
/// Validation is left to the caller so it can run after authorization checks.
///
/// ```ignore
/// use axum_helpers::extractors::JsonBody;
///
/// async fn create_event(JsonBody(payload): JsonBody<CreateEvent>) -> impl IntoResponse {
///     // ...
/// }
/// ```
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(data))
    }
}
