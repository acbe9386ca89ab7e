//! Services Module
//!
//! 비즈니스 로직 외부의 지원 서비스
//!
//! # Services
//! - `NotificationHub`: actor별 실시간 이벤트 분배 (WebSocket)

mod notifier;

pub use notifier::{ConnectionInfo, NotificationHub, WsMessage};
