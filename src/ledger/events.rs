//! Notification emit interface
//!
//! 엔진은 저장 성공 후 부수효과를 `NotificationSink`로 발행.
//! 전달은 best-effort: 구독자가 없으면 버려짐.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::models::{Notification, TargetStatus};

/// 엔진이 발행하는 이벤트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LedgerEvent {
    /// 새 알림 (수신자에게)
    NotificationCreated(Notification),
    /// 알림 accepted/rejected (요청한 쪽에게)
    NotificationResolved(Notification),
    /// target 표시됨
    TargetMarked(TargetStatus),
    /// target 해제됨
    TargetCleared(TargetStatus),
}

impl LedgerEvent {
    /// 이벤트를 받아야 하는 actor
    pub fn audience(&self) -> &str {
        match self {
            LedgerEvent::NotificationCreated(n) => &n.recipient_id,
            LedgerEvent::NotificationResolved(n) => &n.sender_id,
            LedgerEvent::TargetMarked(t) | LedgerEvent::TargetCleared(t) => &t.assassin_id,
        }
    }
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, event: LedgerEvent);
}
