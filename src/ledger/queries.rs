//! Query Layer
//!
//! 원본 컬렉션에서 actor별 뷰를 계산하는 순수 함수.
//! 저장소 접근은 `LedgerEngine`의 query 메서드가 담당.

use super::models::{ActorDebts, Debt, DebtStatus, Notification, TargetInfo, TargetStatus};

/// 빚 목록 뷰에 나타나는 상태인지
///
/// pending은 아직 빚이 아님 (알림으로만 노출), completed는 감사 뷰로 분리
fn is_open(debt: &Debt) -> bool {
    !matches!(debt.status, DebtStatus::Pending | DebtStatus::Completed)
}

/// 내가 진 빚 / 나에게 진 빚
pub fn debts_for_actor(debts: &[Debt], actor_id: &str) -> ActorDebts {
    let mut view = ActorDebts::default();

    for debt in debts.iter().filter(|d| is_open(d)) {
        if debt.debtor_id == actor_id {
            view.debts_i_owe.push(debt.clone());
        }
        if debt.creditor_id == actor_id {
            view.debts_owed_to_me.push(debt.clone());
        }
    }

    view
}

/// actor가 당사자인 완료된 빚 (최근 순)
pub fn completed_debts(debts: &[Debt], actor_id: &str) -> Vec<Debt> {
    let mut completed: Vec<Debt> = debts
        .iter()
        .filter(|d| d.status == DebtStatus::Completed && d.involves(actor_id))
        .cloned()
        .collect();
    completed.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    completed
}

/// 처리 대기 중인 알림
pub fn pending_notifications(notifications: &[Notification], actor_id: &str) -> Vec<Notification> {
    notifications
        .iter()
        .filter(|n| n.recipient_id == actor_id && n.is_pending())
        .cloned()
        .collect()
}

/// 알림 히스토리 (최근 순)
pub fn notification_history(notifications: &[Notification], actor_id: &str) -> Vec<Notification> {
    let mut history: Vec<Notification> = notifications
        .iter()
        .filter(|n| n.recipient_id == actor_id)
        .cloned()
        .collect();
    history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    history
}

pub fn is_target(targets: &[TargetStatus], actor_id: &str) -> bool {
    targets.iter().any(|t| t.assassin_id == actor_id)
}

pub fn target_info(targets: &[TargetStatus], actor_id: &str) -> TargetInfo {
    let marks: Vec<TargetStatus> = targets
        .iter()
        .filter(|t| t.assassin_id == actor_id)
        .cloned()
        .collect();

    TargetInfo {
        actor_id: actor_id.to_string(),
        is_target: !marks.is_empty(),
        marks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{NotificationStatus, NotificationType};

    fn debt(debtor: &str, creditor: &str, status: DebtStatus) -> Debt {
        let mut d = Debt::new(debtor, creditor, "need an alibi for Tuesday".to_string());
        d.status = status;
        d
    }

    #[test]
    fn test_pending_and_completed_excluded_from_debt_views() {
        let debts = vec![
            debt("A", "B", DebtStatus::Pending),
            debt("A", "B", DebtStatus::Active),
            debt("A", "C", DebtStatus::Completed),
            debt("C", "A", DebtStatus::Rejected),
        ];

        let view = debts_for_actor(&debts, "A");
        assert_eq!(view.debts_i_owe.len(), 1);
        assert_eq!(view.debts_i_owe[0].status, DebtStatus::Active);
        assert_eq!(view.debts_owed_to_me.len(), 1);
        assert_eq!(view.debts_owed_to_me[0].status, DebtStatus::Rejected);
    }

    #[test]
    fn test_completed_view_covers_both_sides() {
        let debts = vec![
            debt("A", "B", DebtStatus::Completed),
            debt("C", "A", DebtStatus::Completed),
            debt("C", "D", DebtStatus::Completed),
            debt("A", "D", DebtStatus::InProgress),
        ];
        assert_eq!(completed_debts(&debts, "A").len(), 2);
    }

    #[test]
    fn test_pending_notifications_filter() {
        let debt_id = uuid::Uuid::new_v4();
        let pending = Notification::new(NotificationType::FavorRequest, debt_id, "A", "B", "x".repeat(12));
        let mut accepted = Notification::new(NotificationType::FavorRequest, debt_id, "C", "B", "y".repeat(12));
        accepted.resolve(NotificationStatus::Accepted);
        let other = Notification::new(NotificationType::PaymentRequest, debt_id, "B", "A", "z".repeat(12));

        let notes = vec![pending.clone(), accepted, other];
        assert_eq!(pending_notifications(&notes, "B"), vec![pending]);
        assert_eq!(notification_history(&notes, "B").len(), 2);
    }

    #[test]
    fn test_target_info() {
        let d = debt("A", "B", DebtStatus::Rejected);
        let targets = vec![TargetStatus::for_rejected_payment(&d)];

        assert!(is_target(&targets, "A"));
        assert!(!is_target(&targets, "B"));

        let info = target_info(&targets, "A");
        assert!(info.is_target);
        assert_eq!(info.marks[0].debt_id, d.id);
        assert!(!target_info(&targets, "B").is_target);
    }
}
