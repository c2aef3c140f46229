// handlers/protected/dashboard.rs - GET /api/dashboard

use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::LandlordOverview;
use crate::state::AppState;

pub async fn dashboard_get(State(state): State<AppState>) -> ApiResult<LandlordOverview> {
    Ok(ApiResponse::success(state.dashboard().overview().await?))
}
