//! Debt Endpoints
//!
//! 상환 요청, 상환 수락/거부, 완료 제출/확인/거부

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    ledger::{CommandOutcome, Debt},
};

use super::ResolveRequest;

/// 상환 요청
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPaymentRequest {
    /// 10~500자
    pub payment_description: String,
}

/// GET /debts/:debt_id
pub async fn get_debt(
    State(state): State<AppState>,
    Path(debt_id): Path<Uuid>,
) -> Result<Json<Debt>, ApiError> {
    Ok(Json(state.engine.get_debt(debt_id).await?))
}

/// POST /debts/:debt_id/payment-request
///
/// active → payment_requested, 채무자에게 payment_request 알림
pub async fn request_payment(
    State(state): State<AppState>,
    Path(debt_id): Path<Uuid>,
    Json(req): Json<RequestPaymentRequest>,
) -> Result<Json<CommandOutcome>, ApiError> {
    let outcome = state
        .engine
        .request_payment(debt_id, &req.payment_description)
        .await?;
    Ok(Json(outcome))
}

/// POST /payments/accept
pub async fn accept_payment(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<CommandOutcome>, ApiError> {
    let outcome = state
        .engine
        .accept_payment(req.notification_id, req.debt_id)
        .await?;
    Ok(Json(outcome))
}

/// POST /payments/reject
///
/// 채무자에게 target 표시 (`targetMarked`)
pub async fn reject_payment(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<CommandOutcome>, ApiError> {
    let outcome = state
        .engine
        .reject_payment(req.notification_id, req.debt_id)
        .await?;
    Ok(Json(outcome))
}

/// POST /debts/:debt_id/completion
///
/// 채권자에게 completion_request 알림. debt 상태는 in_progress 유지
pub async fn mark_completed(
    State(state): State<AppState>,
    Path(debt_id): Path<Uuid>,
) -> Result<Json<CommandOutcome>, ApiError> {
    Ok(Json(state.engine.mark_as_completed(debt_id).await?))
}

/// POST /completions/confirm
pub async fn confirm_completion(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<CommandOutcome>, ApiError> {
    let outcome = state
        .engine
        .confirm_completion(req.notification_id, req.debt_id)
        .await?;
    Ok(Json(outcome))
}

/// POST /completions/reject
pub async fn reject_completion(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<CommandOutcome>, ApiError> {
    let outcome = state
        .engine
        .reject_completion(req.notification_id, req.debt_id)
        .await?;
    Ok(Json(outcome))
}
