// handlers/elevated/users.rs - /api/admin/users[/:id]

use axum::extract::State;

use crate::database::models::{User, UserFilter};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::inputs::AdminUpdateUserInput;
use crate::validation::{FilterQuery, PathId, ValidatedUpdate};

/// GET /api/admin/users?role=&status=&search=
pub async fn users_get(State(state): State<AppState>, FilterQuery(filter): FilterQuery<UserFilter>) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::success(state.users().list(&filter).await?))
}

/// GET /api/admin/users/:id
pub async fn user_get(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<User> {
    Ok(ApiResponse::success(state.users().get(id).await?))
}

/// PUT /api/admin/users/:id - email, password, role, status
pub async fn user_put(
    State(state): State<AppState>,
    ValidatedUpdate(input): ValidatedUpdate<AdminUpdateUserInput>,
) -> ApiResult<User> {
    Ok(ApiResponse::success(state.users().update(input).await?))
}
