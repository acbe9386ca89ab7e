//! Actor View Endpoints
//!
//! actor별 파생 뷰 조회 (빚 목록, 알림, target 상태)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    AppState,
    error::ApiError,
    ledger::{ActorDebts, Debt, Notification, TargetInfo},
};

/// 알림 쿼리 파라미터
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// pending (기본값) | all
    pub status: Option<String>,
}

/// GET /actors/:actor_id/debts
pub async fn get_debts(
    State(state): State<AppState>,
    Path(actor_id): Path<String>,
) -> Result<Json<ActorDebts>, ApiError> {
    Ok(Json(state.engine.get_debts_for_actor(&actor_id).await?))
}

/// GET /actors/:actor_id/debts/completed
pub async fn get_completed_debts(
    State(state): State<AppState>,
    Path(actor_id): Path<String>,
) -> Result<Json<Vec<Debt>>, ApiError> {
    Ok(Json(state.engine.get_completed_debts(&actor_id).await?))
}

/// GET /actors/:actor_id/notifications?status=pending|all
pub async fn get_notifications(
    State(state): State<AppState>,
    Path(actor_id): Path<String>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = match query.status.as_deref().unwrap_or("pending") {
        "pending" => state.engine.get_pending_notifications(&actor_id).await?,
        "all" => state.engine.get_notifications(&actor_id).await?,
        other => {
            return Err(ApiError::BadRequest(format!(
                "status must be pending or all, got {}",
                other
            )))
        }
    };

    Ok(Json(notifications))
}

/// GET /actors/:actor_id/target
pub async fn get_target(
    State(state): State<AppState>,
    Path(actor_id): Path<String>,
) -> Result<Json<TargetInfo>, ApiError> {
    Ok(Json(state.engine.get_target_info(&actor_id).await?))
}
