//! Health Check Endpoint
//!
//! 프로세스 상태 + 저장소 연결 상태 (deep health check)

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{db::LedgerStore, AppState};

/// Health check 응답
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: StoreStatus,
    pub ws_connections: usize,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct StoreStatus {
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// GET /health
///
/// 서버 및 저장소 상태 확인
pub async fn health_check(
    State(state): State<AppState>,
) -> Json<HealthResponse> {
    let store_start = std::time::Instant::now();
    let store_status = match state.engine.store().health_check().await {
        Ok(_) => StoreStatus {
            connected: true,
            latency_ms: Some(store_start.elapsed().as_millis() as u64),
        },
        Err(e) => {
            tracing::warn!("Store health check failed: {:#}", e);
            StoreStatus {
                connected: false,
                latency_ms: None,
            }
        }
    };

    Json(HealthResponse {
        status: if store_status.connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store_status,
        ws_connections: state.hub.active_connections().await,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
