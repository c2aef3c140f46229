// handlers/protected/payments.rs - /api/payments[/:id] and payment actions

use axum::extract::State;

use crate::database::models::{Payment, PaymentFilter, PaymentSummary};
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::state::AppState;
use crate::validation::inputs::{CreatePaymentInput, MarkPaidInput, UpdatePaymentInput};
use crate::validation::{FilterQuery, PathId, ValidatedJson, ValidatedUpdate};

/// GET /api/payments?status=&type=&boarderId=&dueFrom=&dueTo=
pub async fn payments_get(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<PaymentFilter>,
) -> ApiResult<Vec<Payment>> {
    Ok(ApiResponse::success(state.payments().list(&filter).await?))
}

/// POST /api/payments
pub async fn payments_post(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreatePaymentInput>,
) -> ApiResult<Payment> {
    Ok(ApiResponse::created(state.payments().create(input).await?))
}

/// GET /api/payments/:id
pub async fn payment_get(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Payment> {
    Ok(ApiResponse::success(state.payments().get(id).await?))
}

/// PUT /api/payments/:id
pub async fn payment_put(
    State(state): State<AppState>,
    ValidatedUpdate(input): ValidatedUpdate<UpdatePaymentInput>,
) -> ApiResult<Payment> {
    Ok(ApiResponse::success(state.payments().update(input).await?))
}

/// DELETE /api/payments/:id
pub async fn payment_delete(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Deleted> {
    state.payments().delete(id).await?;
    Ok(ApiResponse::deleted(id))
}

/// POST /api/payments/:id/paid - optional `paidDate`, defaults to now
pub async fn paid_post(
    State(state): State<AppState>,
    ValidatedUpdate(input): ValidatedUpdate<MarkPaidInput>,
) -> ApiResult<Payment> {
    Ok(ApiResponse::success(state.payments().mark_as_paid(input).await?))
}

/// POST /api/payments/overdue - returns the payments that changed
pub async fn overdue_post(State(state): State<AppState>) -> ApiResult<Vec<Payment>> {
    let today = chrono::Utc::now().date_naive();
    Ok(ApiResponse::success(state.payments().mark_overdue(today).await?))
}

/// GET /api/payments/summary - same filters as the list
pub async fn summary_get(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<PaymentFilter>,
) -> ApiResult<PaymentSummary> {
    Ok(ApiResponse::success(state.payments().summary(&filter).await?))
}
