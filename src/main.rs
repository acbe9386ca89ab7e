//! Favor Ledger API Server
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Client (Frontend)                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum Web Server                         │
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                      Routes Layer                        ││
//! │  │  /health  /favors/*  /debts/*  /actors/*  /ws/*         ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                    Ledger Layer                          ││
//! │  │  LedgerEngine (commands + queries)   NotificationHub    ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                    Data Layer                            ││
//! │  │  MemoryStore | PostgreSQL (sqlx)                         ││
//! │  └─────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{http::HeaderValue, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use favor_ledger_api::{
    config::StoreBackend,
    routes, AppState, Config, Database, LedgerStore, MemoryStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    // RUST_LOG=debug,sqlx=warn 형태로 레벨 제어 가능
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "favor_ledger_api=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Favor Ledger API Server");

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded ({:?}, {:?} store)", config.environment, config.store_backend);

    // 저장소 연결
    let store: Arc<dyn LedgerStore> = match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; ledger state is lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;
            let db = Database::connect(url).await?;
            tracing::info!("Database connected");

            db.run_migrations().await?;
            tracing::info!("Migrations completed");
            Arc::new(db)
        }
    };

    let port = config.port;
    let state = AppState::new(store, config);

    // 라우터 구성
    let app = create_app(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// 라우터 + 미들웨어
fn create_app(state: AppState) -> Router {
    // CORS 설정
    // 프로덕션: ALLOWED_ORIGINS만 허용, 개발: localhost 허용
    let cors = if state.config.is_production() {
        let origins: Vec<HeaderValue> = state
            .config
            .allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = [
            "http://localhost:5173",  // Vite dev server
            "http://localhost:3000",
            "http://127.0.0.1:5173",
        ]
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    routes::router(state)
        // 미들웨어
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
