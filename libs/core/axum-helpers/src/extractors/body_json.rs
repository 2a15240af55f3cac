//! JSON body extractor with `{ "error": ... }` rejections.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;

/// JSON body extractor.
///
/// Behaves like [`axum::Json`], except that every rejection (missing
/// content type, syntax error, wrong field types) is reported as
/// `400 { "error": ... }`.
pub struct BodyJson<T>(pub T);

impl<T, S> FromRequest<S> for BodyJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        Ok(BodyJson(data))
    }
}
