// handlers/protected/utilities.rs - /api/utilities[/:id], summary and billing

use axum::extract::State;

use crate::database::models::{ConsumptionSummary, Payment, UtilityFilter, UtilityReading};
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::state::AppState;
use crate::validation::inputs::{BillReadingInput, CreateReadingInput, UpdateReadingInput};
use crate::validation::{FilterQuery, PathId, ValidatedJson, ValidatedUpdate};

/// GET /api/utilities?roomId=&type=&periodFrom=&periodTo=
pub async fn readings_get(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<UtilityFilter>,
) -> ApiResult<Vec<UtilityReading>> {
    Ok(ApiResponse::success(state.utilities().list(&filter).await?))
}

/// POST /api/utilities
pub async fn readings_post(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateReadingInput>,
) -> ApiResult<UtilityReading> {
    Ok(ApiResponse::created(state.utilities().create(input).await?))
}

/// GET /api/utilities/:id
pub async fn reading_get(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<UtilityReading> {
    Ok(ApiResponse::success(state.utilities().get(id).await?))
}

/// PUT /api/utilities/:id
pub async fn reading_put(
    State(state): State<AppState>,
    ValidatedUpdate(input): ValidatedUpdate<UpdateReadingInput>,
) -> ApiResult<UtilityReading> {
    Ok(ApiResponse::success(state.utilities().update(input).await?))
}

/// DELETE /api/utilities/:id
pub async fn reading_delete(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Deleted> {
    state.utilities().delete(id).await?;
    Ok(ApiResponse::deleted(id))
}

/// GET /api/utilities/summary - consumption and amounts per type
pub async fn summary_get(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<UtilityFilter>,
) -> ApiResult<ConsumptionSummary> {
    Ok(ApiResponse::success(state.utilities().summary(&filter).await?))
}

/// POST /api/utilities/:id/bill - one UTILITY payment per active boarder
pub async fn bill_post(
    State(state): State<AppState>,
    ValidatedUpdate(input): ValidatedUpdate<BillReadingInput>,
) -> ApiResult<Vec<Payment>> {
    Ok(ApiResponse::created(state.utilities().bill(input).await?))
}
