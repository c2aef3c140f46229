// handlers/protected/portal.rs - boarder self-service
//
// GET /api/portal/me, GET /api/portal/payments

use axum::extract::State;

use crate::auth::Session;
use crate::database::models::Payment;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::PortalProfile;
use crate::state::AppState;

pub async fn me_get(State(state): State<AppState>, session: Session) -> ApiResult<PortalProfile> {
    Ok(ApiResponse::success(state.portal().me(&session).await?))
}

pub async fn payments_get(State(state): State<AppState>, session: Session) -> ApiResult<Vec<Payment>> {
    Ok(ApiResponse::success(state.portal().payments(&session).await?))
}
