use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// JSON object body. Anything that is not a JSON object is a 400 `INVALID_JSON`.
#[derive(Debug, Clone)]
pub struct JsonPayload(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::invalid_json(rejection.body_text()))?;

        match value {
            Value::Object(map) => Ok(JsonPayload(map)),
            _ => Err(ApiError::invalid_json("Request body must be a JSON object")),
        }
    }
}
