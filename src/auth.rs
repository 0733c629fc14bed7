//! API key authentication via the `api-key` request header.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};
use serde_json::{json, Value};
use std::env;

const API_KEY_HEADER: &str = "api-key";

/// Marker extractor: a request only reaches a handler taking `ApiKey` if its
/// `api-key` header matches the shared secret.
pub struct ApiKey;

/// The shared secret, from the environment.
pub fn expected_api_key() -> String {
    env::var("API_KEY").unwrap_or_else(|_| "api_live_676".to_string())
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Unauthorized. Missing or invalid API key." })),
    )
}

#[async_trait]
impl<S> FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let client_key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());

        match client_key {
            Some(key) if key == expected_api_key() => Ok(ApiKey),
            _ => {
                tracing::warn!("Unauthorized access attempt");
                Err(unauthorized())
            }
        }
    }
}
