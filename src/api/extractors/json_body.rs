use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use crate::error::AppError;

/// JSON body whose rejections use the service's `{"error": ...}` shape.
/// An empty body deserializes as `T::default()`.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Usage(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(T::default()));
        }

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| AppError::Usage(format!("Malformed request body: {}", e)))
    }
}
