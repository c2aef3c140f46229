// handlers/public/health.rs - GET / and GET /health

use axum::extract::State;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET / - service banner
pub async fn root_get() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health - 503 when the store cannot be reached
pub async fn health_get(State(state): State<AppState>) -> ApiResult<Value> {
    if let Err(e) = state.store().health_check().await {
        tracing::error!("Health check failed: {}", e);
        return Err(ApiError::unavailable("Database unreachable"));
    }
    Ok(ApiResponse::success(json!({ "status": "ok", "database": "up" })))
}
