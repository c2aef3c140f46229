// handlers/protected/rooms.rs - /api/rooms[/:id]

use axum::extract::State;

use crate::database::models::{Room, RoomDetail, RoomFilter};
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::state::AppState;
use crate::validation::inputs::{CreateRoomInput, UpdateRoomInput};
use crate::validation::{FilterQuery, PathId, ValidatedJson, ValidatedUpdate};

/// GET /api/rooms?status=&floor=&search=
pub async fn rooms_get(State(state): State<AppState>, FilterQuery(filter): FilterQuery<RoomFilter>) -> ApiResult<Vec<Room>> {
    Ok(ApiResponse::success(state.rooms().list(&filter).await?))
}

/// POST /api/rooms
pub async fn rooms_post(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateRoomInput>,
) -> ApiResult<Room> {
    Ok(ApiResponse::created(state.rooms().create(input).await?))
}

/// GET /api/rooms/:id - includes current occupants
pub async fn room_get(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<RoomDetail> {
    Ok(ApiResponse::success(state.rooms().get(id).await?))
}

/// PUT /api/rooms/:id
pub async fn room_put(
    State(state): State<AppState>,
    ValidatedUpdate(input): ValidatedUpdate<UpdateRoomInput>,
) -> ApiResult<Room> {
    Ok(ApiResponse::success(state.rooms().update(input).await?))
}

/// DELETE /api/rooms/:id
pub async fn room_delete(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Deleted> {
    state.rooms().delete(id).await?;
    Ok(ApiResponse::deleted(id))
}
