//! Database Module
//!
//! # Interview Q&A
//!
//! Q: 컬렉션 전체 교체(full replace)를 PostgreSQL에서 어떻게 구현하는가?
//! A: 트랜잭션 안에서 DELETE + INSERT
//!
//!    ```text
//!    BEGIN
//!      DELETE FROM debts
//!      INSERT INTO debts ... (레코드마다)
//!    COMMIT
//!    ```
//!
//!    - 중간 실패 시 롤백 → 컬렉션이 반쯤 비는 일 없음
//!    - 컬렉션 간(debts ↔ notifications) 원자성은 없음: 부분 실패 복구는 엔진이
//!      load 시점 스냅샷으로 되돌려서 처리 (`LedgerEngine::commit`)
//!
//! Q: 수신자별 알림 조회는?
//! A: `notifications(recipient_id, status)` 인덱스 + WHERE 절
//!    - trait 기본 구현(전체 로드 후 필터)을 override

mod models;
mod repository;

pub use models::*;
pub use repository::{LedgerStore, MemoryStore};
#[cfg(test)]
pub use repository::mock;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::ledger::{Debt, Notification, TargetStatus};

/// PostgreSQL 저장소
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 데이터베이스 연결
    ///
    /// # Connection Pool Settings
    ///
    /// - max_connections: 10
    /// - min_connections: 1
    /// - acquire_timeout: 3초
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// 마이그레이션 실행
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for Database {
    async fn load_debts(&self) -> Result<Vec<Debt>> {
        let rows = sqlx::query_as::<_, DebtRow>(
            r#"
            SELECT
                id, debtor_id, creditor_id, favor_description,
                payment_description, status, created_at, updated_at
            FROM debts
            ORDER BY created_at
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Debt::try_from(row).map_err(anyhow::Error::from))
            .collect()
    }

    async fn save_debts(&self, debts: &[Debt]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM debts")
            .execute(&mut *tx)
            .await?;

        for debt in debts {
            sqlx::query(
                r#"
                INSERT INTO debts (
                    id, debtor_id, creditor_id, favor_description,
                    payment_description, status, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#
            )
            .bind(debt.id)
            .bind(&debt.debtor_id)
            .bind(&debt.creditor_id)
            .bind(&debt.favor_description)
            .bind(&debt.payment_description)
            .bind(debt.status.as_str())
            .bind(debt.created_at)
            .bind(debt.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn load_notifications(&self) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT
                id, recipient_id, sender_id, debt_id, kind,
                description, status, created_at, resolved_at
            FROM notifications
            ORDER BY created_at
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Notification::try_from(row).map_err(anyhow::Error::from))
            .collect()
    }

    async fn save_notifications(&self, notifications: &[Notification]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM notifications")
            .execute(&mut *tx)
            .await?;

        for note in notifications {
            sqlx::query(
                r#"
                INSERT INTO notifications (
                    id, recipient_id, sender_id, debt_id, kind,
                    description, status, created_at, resolved_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#
            )
            .bind(note.id)
            .bind(&note.recipient_id)
            .bind(&note.sender_id)
            .bind(note.debt_id)
            .bind(note.kind.as_str())
            .bind(&note.description)
            .bind(note.status.as_str())
            .bind(note.created_at)
            .bind(note.resolved_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn load_targets(&self) -> Result<Vec<TargetStatus>> {
        let rows = sqlx::query_as::<_, TargetRow>(
            r#"
            SELECT id, assassin_id, debt_id, marked_at, reason
            FROM target_statuses
            ORDER BY marked_at
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TargetStatus::from).collect())
    }

    async fn save_targets(&self, targets: &[TargetStatus]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM target_statuses")
            .execute(&mut *tx)
            .await?;

        for target in targets {
            sqlx::query(
                r#"
                INSERT INTO target_statuses (id, assassin_id, debt_id, marked_at, reason)
                VALUES ($1, $2, $3, $4, $5)
                "#
            )
            .bind(target.id)
            .bind(&target.assassin_id)
            .bind(target.debt_id)
            .bind(target.marked_at)
            .bind(&target.reason)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn load_notifications_for(&self, recipient_id: &str) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT
                id, recipient_id, sender_id, debt_id, kind,
                description, status, created_at, resolved_at
            FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at
            "#
        )
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Notification::try_from(row).map_err(anyhow::Error::from))
            .collect()
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
