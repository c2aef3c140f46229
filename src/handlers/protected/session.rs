// handlers/protected/session.rs - GET /api/session, PUT /api/session/password

use axum::extract::State;
use serde_json::{json, Value};

use crate::auth::Session;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::SessionView;
use crate::state::AppState;
use crate::validation::inputs::ChangePasswordInput;
use crate::validation::ValidatedJson;

/// GET /api/session - who am I, and where should I be
pub async fn session_get(session: Session) -> ApiResponse<SessionView> {
    ApiResponse::success(session.into())
}

/// PUT /api/session/password
pub async fn password_put(
    State(state): State<AppState>,
    session: Session,
    ValidatedJson(input): ValidatedJson<ChangePasswordInput>,
) -> ApiResult<Value> {
    state.auth().change_password(&session, input).await?;
    Ok(ApiResponse::success(json!({ "changed": true })))
}
