//! Favor/Debt Ledger
//!
//! - `models`: Debt, Notification, TargetStatus 레코드
//! - `engine`: 상태 전이 커맨드 + 조회
//! - `queries`: actor별 뷰 계산
//! - `events`: 알림 발행 인터페이스
//! - `error`: 에러 분류

mod engine;
mod error;
mod events;
mod models;
pub mod queries;

pub use engine::LedgerEngine;
pub use error::{LedgerError, LedgerResult};
pub use events::{LedgerEvent, NotificationSink};
pub use models::*;
