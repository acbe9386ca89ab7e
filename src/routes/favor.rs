//! Favor Request Endpoints
//!
//! 부탁 요청 생성과 채권자의 수락/거부

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::{AppState, error::ApiError, ledger::CommandOutcome};

use super::ResolveRequest;

// ============ Request Types ============

/// 부탁 요청
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFavorRequest {
    /// 부탁하는 쪽 (빚지게 될 사람)
    pub debtor_id: String,
    /// 부탁 받는 쪽
    pub creditor_id: String,
    /// 10~500자
    pub description: String,
}

// ============ Handlers ============

/// POST /favors
///
/// # Response
///
/// `201 Created` + CommandOutcome
///
/// ```json
/// {
///   "updatedDebt": { "id": "...", "status": "pending", ... },
///   "emittedNotification": { "type": "favor_request", "recipientId": "B", ... },
///   "resolvedNotification": null
/// }
/// ```
pub async fn request_favor(
    State(state): State<AppState>,
    Json(req): Json<RequestFavorRequest>,
) -> Result<(StatusCode, Json<CommandOutcome>), ApiError> {
    let outcome = state
        .engine
        .request_favor(&req.debtor_id, &req.creditor_id, &req.description)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /favors/accept
pub async fn accept_favor(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<CommandOutcome>, ApiError> {
    let outcome = state
        .engine
        .accept_favor_request(req.notification_id, req.debt_id)
        .await?;
    Ok(Json(outcome))
}

/// POST /favors/reject
///
/// debt 레코드는 삭제됨 (`removedDebt`로 마지막 상태 반환)
pub async fn reject_favor(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<CommandOutcome>, ApiError> {
    let outcome = state
        .engine
        .reject_favor_request(req.notification_id, req.debt_id)
        .await?;
    Ok(Json(outcome))
}
