//! Ledger Records
//!
//! Debt, Notification, TargetStatus 레코드와 상태 enum 정의.
//! 모든 레코드는 camelCase JSON으로 직렬화됨 (UI 레이어와 동일한 필드명).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::LedgerError;

// ============ Debt ============

/// Debt 상태
///
/// ```text
/// pending → active → payment_requested → in_progress → completed
///                                      ↘ rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    /// 부탁 요청됨 (채권자 응답 대기)
    Pending,
    /// 부탁 수락됨 → 빚 성립
    Active,
    /// 채권자가 상환 요청
    PaymentRequested,
    /// 채무자가 상환 수락, 작업 중
    InProgress,
    /// 채무자가 상환 거부 (종료 상태)
    Rejected,
    /// 완료 확인됨 (종료 상태, 감사 기록용으로 보존)
    Completed,
}

impl DebtStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtStatus::Pending => "pending",
            DebtStatus::Active => "active",
            DebtStatus::PaymentRequested => "payment_requested",
            DebtStatus::InProgress => "in_progress",
            DebtStatus::Rejected => "rejected",
            DebtStatus::Completed => "completed",
        }
    }

    /// 더 이상 전이가 없는 상태인지
    pub fn is_terminal(&self) -> bool {
        matches!(self, DebtStatus::Rejected | DebtStatus::Completed)
    }
}

impl fmt::Display for DebtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebtStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DebtStatus::Pending),
            "active" => Ok(DebtStatus::Active),
            "payment_requested" => Ok(DebtStatus::PaymentRequested),
            "in_progress" => Ok(DebtStatus::InProgress),
            "rejected" => Ok(DebtStatus::Rejected),
            "completed" => Ok(DebtStatus::Completed),
            other => Err(LedgerError::Store(format!("unknown debt status: {}", other))),
        }
    }
}

/// 부탁/빚 레코드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: Uuid,
    /// 부탁한 쪽 (빚진 사람)
    pub debtor_id: String,
    /// 부탁 받은 쪽 (빚 받을 사람)
    pub creditor_id: String,
    /// 생성 시 고정, 이후 변경 불가
    pub favor_description: String,
    /// requestPayment 시에만 설정
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_description: Option<String>,
    pub status: DebtStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Debt {
    pub(crate) fn new(debtor_id: &str, creditor_id: &str, favor_description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            debtor_id: debtor_id.to_string(),
            creditor_id: creditor_id.to_string(),
            favor_description,
            payment_description: None,
            status: DebtStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// 상태 전이 + updated_at 갱신
    pub(crate) fn transition(&mut self, status: DebtStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// actor가 채무자 또는 채권자인지
    pub fn involves(&self, actor_id: &str) -> bool {
        self.debtor_id == actor_id || self.creditor_id == actor_id
    }
}

// ============ Notification ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    FavorRequest,
    PaymentRequest,
    CompletionRequest,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::FavorRequest => "favor_request",
            NotificationType::PaymentRequest => "payment_request",
            NotificationType::CompletionRequest => "completion_request",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "favor_request" => Ok(NotificationType::FavorRequest),
            "payment_request" => Ok(NotificationType::PaymentRequest),
            "completion_request" => Ok(NotificationType::CompletionRequest),
            other => Err(LedgerError::Store(format!("unknown notification type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Pending => "pending",
            NotificationStatus::Accepted => "accepted",
            NotificationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(NotificationStatus::Pending),
            "accepted" => Ok(NotificationStatus::Accepted),
            "rejected" => Ok(NotificationStatus::Rejected),
            other => Err(LedgerError::Store(format!("unknown notification status: {}", other))),
        }
    }
}

/// 상태 전이의 부수효과로만 생성되는 알림
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: String,
    pub sender_id: String,
    pub debt_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub description: String,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
    /// pending을 벗어난 시각
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub(crate) fn new(
        kind: NotificationType,
        debt_id: Uuid,
        sender_id: &str,
        recipient_id: &str,
        description: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id: recipient_id.to_string(),
            sender_id: sender_id.to_string(),
            debt_id,
            kind,
            description,
            status: NotificationStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == NotificationStatus::Pending
    }

    pub(crate) fn resolve(&mut self, status: NotificationStatus) {
        self.status = status;
        self.resolved_at = Some(Utc::now());
    }
}

// ============ TargetStatus ============

/// 상환 거부에 대한 징벌 표시
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetStatus {
    pub id: Uuid,
    /// 상환을 거부한 채무자
    pub assassin_id: String,
    pub debt_id: Uuid,
    pub marked_at: DateTime<Utc>,
    pub reason: String,
}

impl TargetStatus {
    pub(crate) fn for_rejected_payment(debt: &Debt) -> Self {
        Self {
            id: Uuid::new_v4(),
            assassin_id: debt.debtor_id.clone(),
            debt_id: debt.id,
            marked_at: Utc::now(),
            reason: format!(
                "Rejected payment request from {} for favor: {}",
                debt.creditor_id, debt.favor_description
            ),
        }
    }
}

// ============ Command / Query outputs ============

/// 커맨드 실행 결과
///
/// 부수효과(알림 생성/처리, target 표시)를 동기적으로 반환하므로
/// 호출자가 별도 폴링 없이 결과를 알 수 있음
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    /// 전이 후 Debt (삭제된 경우 None)
    pub updated_debt: Option<Debt>,
    /// 삭제된 Debt의 마지막 상태 (rejectFavorRequest)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_debt: Option<Debt>,
    /// 새로 생성된 알림
    pub emitted_notification: Option<Notification>,
    /// accepted/rejected 처리된 알림
    pub resolved_notification: Option<Notification>,
    /// rejectPayment로 생성된 target 표시
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_marked: Option<TargetStatus>,
    /// confirmCompletion으로 해제된 target 표시
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub targets_cleared: Vec<TargetStatus>,
}

/// getDebtsForActor 결과
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorDebts {
    pub debts_i_owe: Vec<Debt>,
    pub debts_owed_to_me: Vec<Debt>,
}

/// getTargetInfo 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub actor_id: String,
    pub is_target: bool,
    pub marks: Vec<TargetStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            DebtStatus::Pending,
            DebtStatus::Active,
            DebtStatus::PaymentRequested,
            DebtStatus::InProgress,
            DebtStatus::Rejected,
            DebtStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<DebtStatus>().unwrap(), status);
        }
        assert!("settled".parse::<DebtStatus>().is_err());
    }

    #[test]
    fn test_debt_serializes_camel_case() {
        let debt = Debt::new("A", "B", "need an alibi for Tuesday".to_string());
        let json = serde_json::to_value(&debt).unwrap();

        assert_eq!(json["debtorId"], "A");
        assert_eq!(json["creditorId"], "B");
        assert_eq!(json["status"], "pending");
        // 상환 요청 전에는 필드 자체가 없음
        assert!(json.get("paymentDescription").is_none());
    }

    #[test]
    fn test_notification_type_field_name() {
        let note = Notification::new(
            NotificationType::PaymentRequest,
            Uuid::new_v4(),
            "B",
            "A",
            "eliminate target X".to_string(),
        );
        let json = serde_json::to_value(&note).unwrap();

        assert_eq!(json["type"], "payment_request");
        assert_eq!(json["recipientId"], "A");
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn test_terminal_states() {
        assert!(DebtStatus::Rejected.is_terminal());
        assert!(DebtStatus::Completed.is_terminal());
        assert!(!DebtStatus::InProgress.is_terminal());
    }
}
