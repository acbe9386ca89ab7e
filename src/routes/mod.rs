//! API Routes Module
//!
//! 모든 HTTP 엔드포인트 정의
//!
//! # Routes
//!
//! ```text
//! GET  /health                            - 헬스 체크
//!
//! POST /favors                            - 부탁 요청
//! POST /favors/accept                     - 부탁 수락
//! POST /favors/reject                     - 부탁 거부
//!
//! GET  /debts/:debt_id                    - debt 조회
//! POST /debts/:debt_id/payment-request    - 상환 요청
//! POST /debts/:debt_id/completion         - 완료 제출
//! POST /payments/accept                   - 상환 수락
//! POST /payments/reject                   - 상환 거부 (target 표시)
//! POST /completions/confirm               - 완료 확인
//! POST /completions/reject                - 완료 거부
//!
//! GET  /actors/:actor_id/debts            - 내가 진 빚 / 나에게 진 빚
//! GET  /actors/:actor_id/debts/completed  - 완료된 빚
//! GET  /actors/:actor_id/notifications    - 알림 (?status=pending|all)
//! GET  /actors/:actor_id/target           - target 상태
//!
//! GET  /ws/:actor_id                      - WebSocket 실시간 이벤트
//! ```

pub mod actor;
pub mod debt;
pub mod favor;
pub mod health;
pub mod ws;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;

/// 알림 처리(accept/reject) 요청 공통 body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub notification_id: Uuid,
    pub debt_id: Uuid,
}

/// 라우터 생성 (미들웨어는 main에서 추가)
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))

        // Favor
        .route("/favors", post(favor::request_favor))
        .route("/favors/accept", post(favor::accept_favor))
        .route("/favors/reject", post(favor::reject_favor))

        // Debt
        .route("/debts/:debt_id", get(debt::get_debt))
        .route("/debts/:debt_id/payment-request", post(debt::request_payment))
        .route("/debts/:debt_id/completion", post(debt::mark_completed))
        .route("/payments/accept", post(debt::accept_payment))
        .route("/payments/reject", post(debt::reject_payment))
        .route("/completions/confirm", post(debt::confirm_completion))
        .route("/completions/reject", post(debt::reject_completion))

        // Actor views
        .route("/actors/:actor_id/debts", get(actor::get_debts))
        .route("/actors/:actor_id/debts/completed", get(actor::get_completed_debts))
        .route("/actors/:actor_id/notifications", get(actor::get_notifications))
        .route("/actors/:actor_id/target", get(actor::get_target))

        // WebSocket
        .route("/ws/:actor_id", get(ws::ws_handler))

        // 상태 주입
        .with_state(state)
}
