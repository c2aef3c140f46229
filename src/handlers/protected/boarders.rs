// handlers/protected/boarders.rs - /api/boarders[/:id] and boarder actions

use axum::extract::State;

use crate::database::models::{Boarder, BoarderFilter};
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::state::AppState;
use crate::validation::inputs::{AssignRoomInput, CreateBoarderInput, MoveOutInput, UpdateBoarderInput};
use crate::validation::{FilterQuery, PathId, ValidatedJson, ValidatedUpdate};

/// GET /api/boarders?roomId=&isActive=&search=
pub async fn boarders_get(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<BoarderFilter>,
) -> ApiResult<Vec<Boarder>> {
    Ok(ApiResponse::success(state.boarders().list(&filter).await?))
}

/// POST /api/boarders
pub async fn boarders_post(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateBoarderInput>,
) -> ApiResult<Boarder> {
    Ok(ApiResponse::created(state.boarders().create(input).await?))
}

/// GET /api/boarders/:id
pub async fn boarder_get(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Boarder> {
    Ok(ApiResponse::success(state.boarders().get(id).await?))
}

/// PUT /api/boarders/:id
pub async fn boarder_put(
    State(state): State<AppState>,
    ValidatedUpdate(input): ValidatedUpdate<UpdateBoarderInput>,
) -> ApiResult<Boarder> {
    Ok(ApiResponse::success(state.boarders().update(input).await?))
}

/// DELETE /api/boarders/:id - removes the boarder's payments too
pub async fn boarder_delete(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Deleted> {
    state.boarders().delete(id).await?;
    Ok(ApiResponse::deleted(id))
}

/// POST /api/boarders/:id/assign
pub async fn assign_post(
    State(state): State<AppState>,
    ValidatedUpdate(input): ValidatedUpdate<AssignRoomInput>,
) -> ApiResult<Boarder> {
    Ok(ApiResponse::success(state.boarders().assign_room(input).await?))
}

/// POST /api/boarders/:id/unassign
pub async fn unassign_post(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Boarder> {
    Ok(ApiResponse::success(state.boarders().unassign_room(id).await?))
}

/// POST /api/boarders/:id/move-out
pub async fn move_out_post(
    State(state): State<AppState>,
    ValidatedUpdate(input): ValidatedUpdate<MoveOutInput>,
) -> ApiResult<Boarder> {
    Ok(ApiResponse::success(state.boarders().move_out(input).await?))
}

/// POST /api/boarders/:id/access-code - issue a new code
pub async fn access_code_post(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Boarder> {
    Ok(ApiResponse::success(state.boarders().regenerate_access_code(id).await?))
}
