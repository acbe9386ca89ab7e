//! Repository Pattern Implementation
//!
//! 엔진은 `LedgerStore` trait만 알고, 실제 저장소는 주입됨.
//!
//! ```text
//!   LedgerEngine ──▶ Arc<dyn LedgerStore>
//!                         ├── MemoryStore  (기본값, 테스트)
//!                         └── Database     (PostgreSQL)
//! ```
//!
//! # Contract
//!
//! - `load_*`: 컬렉션 전체 읽기
//! - `save_*`: 컬렉션 전체 교체 (last write wins)
//! - load와 save 사이에 다른 writer가 끼어들지 않도록 하는 것은 호출자 책임
//!   (엔진의 전역 Mutex)

use async_trait::async_trait;
use anyhow::Result;
use tokio::sync::RwLock;

use crate::ledger::{Debt, Notification, TargetStatus};

/// Ledger 저장소 인터페이스
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn load_debts(&self) -> Result<Vec<Debt>>;
    async fn save_debts(&self, debts: &[Debt]) -> Result<()>;

    async fn load_notifications(&self) -> Result<Vec<Notification>>;
    async fn save_notifications(&self, notifications: &[Notification]) -> Result<()>;

    async fn load_targets(&self) -> Result<Vec<TargetStatus>>;
    async fn save_targets(&self, targets: &[TargetStatus]) -> Result<()>;

    /// 특정 수신자의 알림 조회
    ///
    /// 기본 구현은 전체 로드 후 필터링. 인덱스가 있는 저장소는 override.
    async fn load_notifications_for(&self, recipient_id: &str) -> Result<Vec<Notification>> {
        let all = self.load_notifications().await?;
        Ok(all
            .into_iter()
            .filter(|n| n.recipient_id == recipient_id)
            .collect())
    }

    /// 저장소 연결 상태 확인
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// 인메모리 저장소
#[derive(Default)]
pub struct MemoryStore {
    debts: RwLock<Vec<Debt>>,
    notifications: RwLock<Vec<Notification>>,
    targets: RwLock<Vec<TargetStatus>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn load_debts(&self) -> Result<Vec<Debt>> {
        Ok(self.debts.read().await.clone())
    }

    async fn save_debts(&self, debts: &[Debt]) -> Result<()> {
        *self.debts.write().await = debts.to_vec();
        Ok(())
    }

    async fn load_notifications(&self) -> Result<Vec<Notification>> {
        Ok(self.notifications.read().await.clone())
    }

    async fn save_notifications(&self, notifications: &[Notification]) -> Result<()> {
        *self.notifications.write().await = notifications.to_vec();
        Ok(())
    }

    async fn load_targets(&self) -> Result<Vec<TargetStatus>> {
        Ok(self.targets.read().await.clone())
    }

    async fn save_targets(&self, targets: &[TargetStatus]) -> Result<()> {
        *self.targets.write().await = targets.to_vec();
        Ok(())
    }
}

#[cfg(test)]
pub mod mock {
    //! 실패 주입 / 지연 주입용 저장소

    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// save 실패 주입
    ///
    /// `fail_writes`는 모든 save, 나머지는 해당 컬렉션 save만 실패
    #[derive(Default)]
    pub struct FlakyStore {
        inner: MemoryStore,
        pub fail_writes: AtomicBool,
        pub fail_debt_writes: AtomicBool,
        pub fail_notification_writes: AtomicBool,
    }

    impl FlakyStore {
        fn check(&self, collection: &AtomicBool) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) || collection.load(Ordering::SeqCst) {
                anyhow::bail!("connection reset by peer");
            }
            Ok(())
        }
    }

    #[async_trait]
    impl LedgerStore for FlakyStore {
        async fn load_debts(&self) -> Result<Vec<Debt>> {
            self.inner.load_debts().await
        }

        async fn save_debts(&self, debts: &[Debt]) -> Result<()> {
            self.check(&self.fail_debt_writes)?;
            self.inner.save_debts(debts).await
        }

        async fn load_notifications(&self) -> Result<Vec<Notification>> {
            self.inner.load_notifications().await
        }

        async fn save_notifications(&self, notifications: &[Notification]) -> Result<()> {
            self.check(&self.fail_notification_writes)?;
            self.inner.save_notifications(notifications).await
        }

        async fn load_targets(&self) -> Result<Vec<TargetStatus>> {
            self.inner.load_targets().await
        }

        async fn save_targets(&self, targets: &[TargetStatus]) -> Result<()> {
            self.check(&self.fail_writes)?;
            self.inner.save_targets(targets).await
        }
    }

    /// 매 호출마다 스케줄러에 양보하는 저장소
    ///
    /// 실제 DB처럼 load와 save 사이에 다른 태스크가 끼어들 틈을 만듦
    #[derive(Default)]
    pub struct YieldingStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl LedgerStore for YieldingStore {
        async fn load_debts(&self) -> Result<Vec<Debt>> {
            tokio::task::yield_now().await;
            let debts = self.inner.load_debts().await;
            tokio::task::yield_now().await;
            debts
        }

        async fn save_debts(&self, debts: &[Debt]) -> Result<()> {
            tokio::task::yield_now().await;
            self.inner.save_debts(debts).await
        }

        async fn load_notifications(&self) -> Result<Vec<Notification>> {
            tokio::task::yield_now().await;
            self.inner.load_notifications().await
        }

        async fn save_notifications(&self, notifications: &[Notification]) -> Result<()> {
            tokio::task::yield_now().await;
            self.inner.save_notifications(notifications).await
        }

        async fn load_targets(&self) -> Result<Vec<TargetStatus>> {
            tokio::task::yield_now().await;
            self.inner.load_targets().await
        }

        async fn save_targets(&self, targets: &[TargetStatus]) -> Result<()> {
            tokio::task::yield_now().await;
            self.inner.save_targets(targets).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::NotificationType;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_save_replaces_whole_collection() {
        let store = MemoryStore::new();
        let first = Debt::new("A", "B", "need an alibi for Tuesday".to_string());
        let second = Debt::new("C", "D", "hide a package for a week".to_string());

        store.save_debts(&[first.clone(), second]).await.unwrap();
        store.save_debts(&[first.clone()]).await.unwrap();

        let loaded = store.load_debts().await.unwrap();
        assert_eq!(loaded, vec![first]);
    }

    #[tokio::test]
    async fn test_notifications_for_recipient() {
        let store = MemoryStore::new();
        let debt_id = Uuid::new_v4();
        let to_b = Notification::new(NotificationType::FavorRequest, debt_id, "A", "B", "x".repeat(10));
        let to_a = Notification::new(NotificationType::PaymentRequest, debt_id, "B", "A", "y".repeat(10));
        store.save_notifications(&[to_b.clone(), to_a]).await.unwrap();

        let for_b = store.load_notifications_for("B").await.unwrap();
        assert_eq!(for_b, vec![to_b]);
    }
}
