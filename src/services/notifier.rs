//! Notification Hub
//!
//! Ledger 이벤트를 actor별 broadcast 채널로 분배.
//!
//! # Architecture
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌─────────────┐
//! │ LedgerEngine │────▶│ NotificationHub  │────▶│ actor "A"   │──▶ WS client(s)
//! │  (publish)   │     │  (audience 라우팅) │     ├─────────────┤
//! └──────────────┘     │                  │────▶│ actor "B"   │──▶ WS client(s)
//!                      └──────────────────┘     └─────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

use crate::ledger::{LedgerEvent, NotificationSink};

/// WebSocket 메시지 (서버 → 클라이언트)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload")]
pub enum WsMessage {
    /// Ledger 이벤트
    Event(LedgerEvent),
    /// 구독 확인
    Subscribed { actor_id: String },
    /// 에러
    Error { code: i32, message: String },
    /// 클라이언트 Ping 응답
    Pong,
}

/// 연결 상태
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub id: String,
    pub actor_id: String,
    pub connected_at: DateTime<Utc>,
}

pub struct NotificationHub {
    /// actor별 채널
    actor_channels: Arc<RwLock<HashMap<String, broadcast::Sender<WsMessage>>>>,
    /// 연결 정보
    connections: Arc<RwLock<HashMap<String, ConnectionInfo>>>,
    /// 채널 버퍼 크기
    capacity: usize,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            actor_channels: Arc::new(RwLock::new(HashMap::new())),
            connections: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// actor 채널 구독 (없으면 생성)
    pub async fn subscribe(&self, actor_id: &str) -> broadcast::Receiver<WsMessage> {
        let mut channels = self.actor_channels.write().await;

        let tx = channels.entry(actor_id.to_string()).or_insert_with(|| {
            let (tx, _) = broadcast::channel(self.capacity);
            tx
        });

        tx.subscribe()
    }

    /// 특정 actor에게 전송. 구독자 수 반환
    pub async fn send_to(&self, actor_id: &str, message: WsMessage) -> usize {
        let channels = self.actor_channels.read().await;
        match channels.get(actor_id) {
            Some(tx) => tx.send(message).unwrap_or(0),
            None => 0,
        }
    }

    /// 연결 등록
    pub async fn register_connection(&self, info: ConnectionInfo) {
        let mut conns = self.connections.write().await;
        conns.insert(info.id.clone(), info);
    }

    /// 연결 해제
    ///
    /// 해당 actor의 마지막 연결이고 남은 구독자도 없으면 채널 정리.
    /// 연결 목록 lock을 잡은 채 판단해야 동시에 들어온 register와 엇갈리지 않음.
    pub async fn unregister_connection(&self, id: &str) {
        let mut conns = self.connections.write().await;
        let Some(info) = conns.remove(id) else {
            return;
        };

        let still_connected = conns.values().any(|c| c.actor_id == info.actor_id);
        if still_connected {
            return;
        }

        let mut channels = self.actor_channels.write().await;
        let idle = channels
            .get(&info.actor_id)
            .map_or(false, |tx| tx.receiver_count() == 0);
        if idle {
            channels.remove(&info.actor_id);
        }
    }

    /// 활성 연결 수
    pub async fn active_connections(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl NotificationSink for NotificationHub {
    async fn publish(&self, event: LedgerEvent) {
        let audience = event.audience().to_string();
        let delivered = self.send_to(&audience, WsMessage::Event(event)).await;
        tracing::debug!(actor_id = %audience, delivered, "ledger event published");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Notification, NotificationType};
    use uuid::Uuid;

    fn favor_request(recipient: &str) -> Notification {
        Notification::new(
            NotificationType::FavorRequest,
            Uuid::new_v4(),
            "A",
            recipient,
            "need an alibi for Tuesday".to_string(),
        )
    }

    #[tokio::test]
    async fn test_hub_creation() {
        let hub = NotificationHub::default();
        assert_eq!(hub.active_connections().await, 0);
    }

    #[tokio::test]
    async fn test_event_routed_to_audience() {
        let hub = NotificationHub::new(16);
        let mut rx_b = hub.subscribe("B").await;
        let mut rx_c = hub.subscribe("C").await;

        let note = favor_request("B");
        hub.publish(LedgerEvent::NotificationCreated(note.clone())).await;

        match rx_b.recv().await {
            Ok(WsMessage::Event(LedgerEvent::NotificationCreated(received))) => {
                assert_eq!(received.id, note.id);
            }
            other => panic!("Expected NotificationCreated, got {:?}", other),
        }
        assert!(rx_c.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_is_dropped() {
        let hub = NotificationHub::new(16);
        let delivered = hub.send_to("nobody", WsMessage::Pong).await;
        assert_eq!(delivered, 0);
    }

    fn connection(id: &str, actor_id: &str) -> ConnectionInfo {
        ConnectionInfo {
            id: id.to_string(),
            actor_id: actor_id.to_string(),
            connected_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_last_connection_cleans_channel() {
        let hub = NotificationHub::new(16);
        hub.register_connection(connection("conn-1", "B")).await;
        let rx = hub.subscribe("B").await;
        assert_eq!(hub.active_connections().await, 1);

        drop(rx);
        hub.unregister_connection("conn-1").await;
        assert_eq!(hub.active_connections().await, 0);
        assert!(hub.actor_channels.read().await.get("B").is_none());
    }

    #[tokio::test]
    async fn test_channel_survives_while_other_socket_subscribed() {
        let hub = NotificationHub::new(16);
        hub.register_connection(connection("conn-1", "B")).await;
        let first = hub.subscribe("B").await;

        // 두 번째 소켓: 구독은 했지만 아직 등록 전
        let mut second = hub.subscribe("B").await;

        drop(first);
        hub.unregister_connection("conn-1").await;

        assert_eq!(hub.send_to("B", WsMessage::Pong).await, 1);
        assert!(matches!(second.recv().await, Ok(WsMessage::Pong)));
    }

    #[tokio::test]
    async fn test_channel_survives_while_other_connection_registered() {
        let hub = NotificationHub::new(16);
        hub.register_connection(connection("conn-1", "B")).await;
        hub.register_connection(connection("conn-2", "B")).await;

        hub.unregister_connection("conn-1").await;
        let mut rx = hub.subscribe("B").await;

        assert_eq!(hub.active_connections().await, 1);
        assert_eq!(hub.send_to("B", WsMessage::Pong).await, 1);
        assert!(matches!(rx.recv().await, Ok(WsMessage::Pong)));
    }

    #[test]
    fn test_message_serialization() {
        let msg = WsMessage::Subscribed { actor_id: "B".to_string() };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("Subscribed"));
        assert!(json.contains("\"actor_id\":\"B\""));
    }
}
