//! Favor Ledger API Library
//!
//! # Overview
//!
//! actor 간 부탁(favor) → 빚(debt) → 상환 요청 → 완료 확인 워크플로를
//! 관리하는 ledger 백엔드.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                         API                              │
//! │                                                          │
//! │  ┌─────────┐  ┌──────────┐  ┌──────────┐  ┌─────────┐   │
//! │  │ Routes  │─▶│  Ledger  │─▶│    DB    │  │  Types  │   │
//! │  └────┬────┘  │  Engine  │  │ (Store)  │  └─────────┘   │
//! │       │       └────┬─────┘  └──────────┘                │
//! │       │            ▼                                     │
//! │       │     ┌──────────────┐                             │
//! │       └────▶│ Notification │──▶ WebSocket clients        │
//! │             │     Hub      │                             │
//! │             └──────────────┘                             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: HTTP 에러 매핑
//! - `ledger`: 워크플로 엔진, 레코드, 조회
//! - `routes`: HTTP 엔드포인트 핸들러
//! - `services`: 알림 허브
//! - `db`: 저장소 (memory / PostgreSQL)
//! - `types`: 검증된 값 타입
//!
//! ## Usage
//!
//! ```rust,ignore
//! use favor_ledger_api::{AppState, Config, MemoryStore};
//!
//! let state = AppState::new(Arc::new(MemoryStore::new()), Config::default());
//! let outcome = state.engine
//!     .request_favor("A", "B", "need an alibi for Tuesday")
//!     .await?;
//! ```

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod db;
pub mod ledger;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use error::ApiError;
pub use db::{Database, LedgerStore, MemoryStore};
pub use ledger::LedgerEngine;
pub use services::NotificationHub;

/// 애플리케이션 전역 상태
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LedgerEngine>,
    pub hub: Arc<NotificationHub>,
    pub config: Arc<Config>,
}

impl AppState {
    /// 저장소를 주입받아 허브와 엔진 구성
    pub fn new(store: Arc<dyn LedgerStore>, config: Config) -> Self {
        let hub = Arc::new(NotificationHub::new(config.ws_channel_capacity));
        let engine = Arc::new(LedgerEngine::new(store, hub.clone()));

        Self {
            engine,
            hub,
            config: Arc::new(config),
        }
    }
}
