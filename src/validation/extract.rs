//! Axum extractors that run validation and reject with `ApiError`.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{parse, parse_with_id, Input, BODY_FIELD};
use crate::error::ApiError;

/// Validated JSON body.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: Input,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let value = json_body(req, state).await?;
        parse(value).map(Self)
    }
}

/// Validated body for a `/:id` route; the path id is merged in as `id`.
#[derive(Debug, Clone)]
pub struct ValidatedUpdate<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedUpdate<T>
where
    T: Input,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let Path(id) = Path::<String>::from_request_parts(&mut parts, state)
            .await
            .map_err(|rejection| ApiError::invalid_field("id", rejection.body_text()))?;

        let value = json_body(Request::from_parts(parts, body), state).await?;
        parse_with_id(&id, value).map(Self)
    }
}

/// `:id` path segment parsed as a uuid.
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub Uuid);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for PathId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::invalid_field("id", rejection.body_text()))?;
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| ApiError::invalid_field("id", "Invalid uuid"))
    }
}

/// Query-string filter.
#[derive(Debug, Clone, Default)]
pub struct FilterQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for FilterQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(filter)| Self(filter))
            .map_err(|rejection| ApiError::invalid_field("_query", rejection.body_text()))
    }
}

/// Read the body as JSON. An empty body reads as `{}` so that action
/// routes with only optional fields can be called without one.
async fn json_body<S: Send + Sync>(req: Request, state: &S) -> Result<Value, ApiError> {
    let bytes = Bytes::from_request(req, state)
        .await
        .map_err(|rejection| ApiError::invalid_field(BODY_FIELD, rejection.body_text()))?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_slice(&bytes).map_err(|e| ApiError::invalid_field(BODY_FIELD, format!("Invalid JSON: {}", e)))
}
