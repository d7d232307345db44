//! Request extractors.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;

/// JSON request body that must be a JSON object.
///
/// Unlike `axum::Json` this ignores the `Content-Type` header and maps every
/// failure onto the API's error taxonomy: an unparsable body or a non-object
/// is `NotAJson`, an object whose fields have the wrong types is
/// `InvalidInput`. Unknown fields are ignored by the target structs, which is
/// how protected fields are dropped on update.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read request body: {}", e)))?;
        parse_object(&bytes).map(JsonBody)
    }
}

pub fn parse_object<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|_| AppError::NotAJson)?;
    if !value.is_object() {
        return Err(AppError::NotAJson);
    }
    serde_json::from_value(value).map_err(|e| AppError::InvalidInput(e.to_string()))
}
