//! Database Models
//!
//! 테이블 row 타입과 도메인 레코드 간 변환.
//! 상태 enum은 TEXT 컬럼으로 저장 (`as_str` / `FromStr`).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::ledger::{Debt, LedgerError, Notification, TargetStatus};

/// debts 테이블
#[derive(Debug, Clone, FromRow)]
pub struct DebtRow {
    pub id: Uuid,
    pub debtor_id: String,
    pub creditor_id: String,
    pub favor_description: String,
    pub payment_description: Option<String>,
    /// pending | active | payment_requested | in_progress | rejected | completed
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DebtRow> for Debt {
    type Error = LedgerError;

    fn try_from(row: DebtRow) -> Result<Self, Self::Error> {
        Ok(Debt {
            id: row.id,
            debtor_id: row.debtor_id,
            creditor_id: row.creditor_id,
            favor_description: row.favor_description,
            payment_description: row.payment_description,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// notifications 테이블
#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: Uuid,
    pub recipient_id: String,
    pub sender_id: String,
    pub debt_id: Uuid,
    /// favor_request | payment_request | completion_request
    pub kind: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = LedgerError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: row.id,
            recipient_id: row.recipient_id,
            sender_id: row.sender_id,
            debt_id: row.debt_id,
            kind: row.kind.parse()?,
            description: row.description,
            status: row.status.parse()?,
            created_at: row.created_at,
            resolved_at: row.resolved_at,
        })
    }
}

/// target_statuses 테이블
#[derive(Debug, Clone, FromRow)]
pub struct TargetRow {
    pub id: Uuid,
    pub assassin_id: String,
    pub debt_id: Uuid,
    pub marked_at: DateTime<Utc>,
    pub reason: String,
}

impl From<TargetRow> for TargetStatus {
    fn from(row: TargetRow) -> Self {
        TargetStatus {
            id: row.id,
            assassin_id: row.assassin_id,
            debt_id: row.debt_id,
            marked_at: row.marked_at,
            reason: row.reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{DebtStatus, NotificationStatus, NotificationType};

    fn debt_row(status: &str) -> DebtRow {
        DebtRow {
            id: Uuid::new_v4(),
            debtor_id: "A".to_string(),
            creditor_id: "B".to_string(),
            favor_description: "need an alibi for Tuesday".to_string(),
            payment_description: None,
            status: status.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_debt_row_conversion() {
        let debt = Debt::try_from(debt_row("payment_requested")).unwrap();
        assert_eq!(debt.status, DebtStatus::PaymentRequested);
    }

    #[test]
    fn test_unknown_status_is_store_error() {
        let err = Debt::try_from(debt_row("archived")).unwrap_err();
        assert!(matches!(err, LedgerError::Store(_)));
    }

    #[test]
    fn test_notification_row_conversion() {
        let row = NotificationRow {
            id: Uuid::new_v4(),
            recipient_id: "B".to_string(),
            sender_id: "A".to_string(),
            debt_id: Uuid::new_v4(),
            kind: "completion_request".to_string(),
            description: "job is done, check it".to_string(),
            status: "accepted".to_string(),
            created_at: Utc::now(),
            resolved_at: Some(Utc::now()),
        };
        let note = Notification::try_from(row).unwrap();
        assert_eq!(note.kind, NotificationType::CompletionRequest);
        assert_eq!(note.status, NotificationStatus::Accepted);
    }
}
