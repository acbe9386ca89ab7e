//! Favor/Debt Workflow Engine
//!
//! # State Machine
//!
//! ```text
//!             requestFavor
//!   (none) ────────────────► pending
//!                               │ accept           │ reject
//!                               ▼                  ▼
//!                             active          (debt 삭제)
//!                               │ requestPayment
//!                               ▼
//!                       payment_requested
//!                      /                  \
//!               acceptPayment        rejectPayment
//!                    │                     │
//!                    ▼                     ▼
//!               in_progress             rejected  (+ TargetStatus)
//!                    │ markAsCompleted
//!                    ▼
//!            (completion_request 대기)
//!              /                          \
//!      confirmCompletion            rejectCompletion
//!            │                             │
//!            ▼                             ▼
//!        completed                    in_progress 유지
//! ```
//!
//! # Concurrency
//!
//! 모든 커맨드는 `write_lock`을 잡은 채 load → 검증 → save를 수행.
//! 같은 debt에 대한 동시 `requestPayment`는 하나만 성공하고
//! 나머지는 `payment_requested` 상태를 보고 `InvalidState`로 실패.
//! 조회는 lock 없이 저장소를 직접 읽음.
//!
//! # Persistence
//!
//! 커맨드는 바뀐 컬렉션만 하나씩 저장하고, 중간 저장이 실패하면 이미 쓴
//! 컬렉션을 load 시점 스냅샷으로 되돌림.
//!
//! 되돌리기마저 실패할 때를 대비해 저장 순서를 정함:
//!
//! - 알림을 만드는 커맨드: notifications → debts
//!   (남는 것은 debt 없는 알림 → 처리 시 `NotFound`)
//! - 알림을 처리하는 커맨드: debts → notifications → targets
//!   (남는 것은 이미 진행된 debt의 pending 알림 → 처리 시 `InvalidState`)
//!
//! 어느 쪽도 debt를 빠져나갈 수 없는 상태로 두지 않음.

use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::LedgerStore;
use crate::types::{ActorId, Description};

use super::error::{LedgerError, LedgerResult};
use super::events::{LedgerEvent, NotificationSink};
use super::models::{
    ActorDebts, CommandOutcome, Debt, DebtStatus, Notification, NotificationStatus,
    NotificationType, TargetInfo, TargetStatus,
};
use super::queries;

/// 알림을 처리(accept/reject)하는 커맨드의 규칙
struct Resolution {
    command: &'static str,
    kind: NotificationType,
    required: DebtStatus,
    verdict: NotificationStatus,
    effect: DebtEffect,
}

enum DebtEffect {
    MoveTo(DebtStatus),
    Delete,
    Unchanged,
}

impl Resolution {
    const ACCEPT_FAVOR: Resolution = Resolution {
        command: "acceptFavorRequest",
        kind: NotificationType::FavorRequest,
        required: DebtStatus::Pending,
        verdict: NotificationStatus::Accepted,
        effect: DebtEffect::MoveTo(DebtStatus::Active),
    };

    const REJECT_FAVOR: Resolution = Resolution {
        command: "rejectFavorRequest",
        kind: NotificationType::FavorRequest,
        required: DebtStatus::Pending,
        verdict: NotificationStatus::Rejected,
        effect: DebtEffect::Delete,
    };

    const ACCEPT_PAYMENT: Resolution = Resolution {
        command: "acceptPayment",
        kind: NotificationType::PaymentRequest,
        required: DebtStatus::PaymentRequested,
        verdict: NotificationStatus::Accepted,
        effect: DebtEffect::MoveTo(DebtStatus::InProgress),
    };

    const REJECT_PAYMENT: Resolution = Resolution {
        command: "rejectPayment",
        kind: NotificationType::PaymentRequest,
        required: DebtStatus::PaymentRequested,
        verdict: NotificationStatus::Rejected,
        effect: DebtEffect::MoveTo(DebtStatus::Rejected),
    };

    const CONFIRM_COMPLETION: Resolution = Resolution {
        command: "confirmCompletion",
        kind: NotificationType::CompletionRequest,
        required: DebtStatus::InProgress,
        verdict: NotificationStatus::Accepted,
        effect: DebtEffect::MoveTo(DebtStatus::Completed),
    };

    const REJECT_COMPLETION: Resolution = Resolution {
        command: "rejectCompletion",
        kind: NotificationType::CompletionRequest,
        required: DebtStatus::InProgress,
        verdict: NotificationStatus::Rejected,
        effect: DebtEffect::Unchanged,
    };
}

/// 커맨드가 바꾼 컬렉션: load 시점 스냅샷 + 저장할 값
struct Staged<T> {
    before: Vec<T>,
    after: Vec<T>,
}

impl<T: Clone> Staged<T> {
    fn from_loaded(loaded: Vec<T>) -> Self {
        Self {
            before: loaded.clone(),
            after: loaded,
        }
    }
}

impl<T> Staged<T> {
    fn values(&self, restore: bool) -> &[T] {
        if restore {
            &self.before
        } else {
            &self.after
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Collection {
    Debts,
    Notifications,
    Targets,
}

#[derive(Default)]
struct Changes {
    notifications: Option<Staged<Notification>>,
    debts: Option<Staged<Debt>>,
    targets: Option<Staged<TargetStatus>>,
    /// 알림 처리 커맨드면 true
    debts_first: bool,
}

impl Changes {
    fn write_order(&self) -> [Collection; 3] {
        if self.debts_first {
            [Collection::Debts, Collection::Notifications, Collection::Targets]
        } else {
            [Collection::Notifications, Collection::Debts, Collection::Targets]
        }
    }
}

/// Ledger 워크플로 엔진
pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    sink: Arc<dyn NotificationSink>,
    /// 커맨드 직렬화용 전역 lock
    write_lock: Mutex<()>,
}

impl LedgerEngine {
    pub fn new(store: Arc<dyn LedgerStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            sink,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    // ============ Commands ============

    /// 부탁 요청 → pending debt + creditor에게 favor_request 알림
    pub async fn request_favor(
        &self,
        debtor_id: &str,
        creditor_id: &str,
        description: &str,
    ) -> LedgerResult<CommandOutcome> {
        let debtor = parse_actor(debtor_id)?;
        let creditor = parse_actor(creditor_id)?;

        if debtor == creditor {
            return Err(LedgerError::InvalidArgument(
                "Cannot request a favor from yourself".to_string(),
            ));
        }

        let description = Description::new(description).map_err(LedgerError::Validation)?;

        let guard = self.write_lock.lock().await;

        let mut debts = Staged::from_loaded(self.store.load_debts().await?);

        let duplicate = debts.after.iter().any(|d| {
            d.status == DebtStatus::Pending
                && d.debtor_id == debtor.as_str()
                && d.creditor_id == creditor.as_str()
        });
        if duplicate {
            return Err(LedgerError::Conflict(format!(
                "A favor request from {} to {} is already pending",
                debtor.as_str(),
                creditor.as_str()
            )));
        }

        let debt = Debt::new(debtor.as_str(), creditor.as_str(), description.into_inner());
        let notification = Notification::new(
            NotificationType::FavorRequest,
            debt.id,
            debtor.as_str(),
            creditor.as_str(),
            debt.favor_description.clone(),
        );

        let mut notifications = Staged::from_loaded(self.store.load_notifications().await?);
        debts.after.push(debt.clone());
        notifications.after.push(notification.clone());

        self.commit(Changes {
            notifications: Some(notifications),
            debts: Some(debts),
            ..Default::default()
        })
        .await?;
        drop(guard);

        tracing::info!(
            debt_id = %debt.id,
            debtor = %debt.debtor_id,
            creditor = %debt.creditor_id,
            "favor requested"
        );

        self.sink
            .publish(LedgerEvent::NotificationCreated(notification.clone()))
            .await;

        Ok(CommandOutcome {
            updated_debt: Some(debt),
            emitted_notification: Some(notification),
            ..Default::default()
        })
    }

    /// pending → active
    pub async fn accept_favor_request(
        &self,
        notification_id: Uuid,
        debt_id: Uuid,
    ) -> LedgerResult<CommandOutcome> {
        self.resolve(notification_id, debt_id, &Resolution::ACCEPT_FAVOR).await
    }

    /// pending → (삭제)
    pub async fn reject_favor_request(
        &self,
        notification_id: Uuid,
        debt_id: Uuid,
    ) -> LedgerResult<CommandOutcome> {
        self.resolve(notification_id, debt_id, &Resolution::REJECT_FAVOR).await
    }

    /// active → payment_requested + debtor에게 payment_request 알림
    pub async fn request_payment(
        &self,
        debt_id: Uuid,
        payment_description: &str,
    ) -> LedgerResult<CommandOutcome> {
        let description =
            Description::new(payment_description).map_err(LedgerError::Validation)?;

        let guard = self.write_lock.lock().await;

        let mut debts = Staged::from_loaded(self.store.load_debts().await?);
        let debt = find_debt(&mut debts.after, debt_id)?;
        require_status(debt, DebtStatus::Active, "requestPayment")?;

        debt.payment_description = Some(description.into_inner());
        debt.transition(DebtStatus::PaymentRequested);
        let debt = debt.clone();

        let notification = Notification::new(
            NotificationType::PaymentRequest,
            debt.id,
            &debt.creditor_id,
            &debt.debtor_id,
            debt.payment_description.clone().unwrap_or_default(),
        );

        let mut notifications = Staged::from_loaded(self.store.load_notifications().await?);
        notifications.after.push(notification.clone());

        self.commit(Changes {
            notifications: Some(notifications),
            debts: Some(debts),
            ..Default::default()
        })
        .await?;
        drop(guard);

        tracing::info!(debt_id = %debt.id, debtor = %debt.debtor_id, "payment requested");

        self.sink
            .publish(LedgerEvent::NotificationCreated(notification.clone()))
            .await;

        Ok(CommandOutcome {
            updated_debt: Some(debt),
            emitted_notification: Some(notification),
            ..Default::default()
        })
    }

    /// payment_requested → in_progress
    pub async fn accept_payment(
        &self,
        notification_id: Uuid,
        debt_id: Uuid,
    ) -> LedgerResult<CommandOutcome> {
        self.resolve(notification_id, debt_id, &Resolution::ACCEPT_PAYMENT).await
    }

    /// payment_requested → rejected + debtor에 TargetStatus
    pub async fn reject_payment(
        &self,
        notification_id: Uuid,
        debt_id: Uuid,
    ) -> LedgerResult<CommandOutcome> {
        self.resolve(notification_id, debt_id, &Resolution::REJECT_PAYMENT).await
    }

    /// in_progress 유지, creditor에게 completion_request 알림
    pub async fn mark_as_completed(&self, debt_id: Uuid) -> LedgerResult<CommandOutcome> {
        let guard = self.write_lock.lock().await;

        let mut debts = self.store.load_debts().await?;
        let debt = find_debt(&mut debts, debt_id)?;
        require_status(debt, DebtStatus::InProgress, "markAsCompleted")?;
        let debt = debt.clone();

        let mut notifications = Staged::from_loaded(self.store.load_notifications().await?);

        let awaiting = notifications.after.iter().any(|n| {
            n.debt_id == debt.id && n.kind == NotificationType::CompletionRequest && n.is_pending()
        });
        if awaiting {
            return Err(LedgerError::Conflict(format!(
                "Debt {} already has a completion request awaiting confirmation",
                debt.id
            )));
        }

        let summary = debt
            .payment_description
            .as_deref()
            .unwrap_or(&debt.favor_description);
        let notification = Notification::new(
            NotificationType::CompletionRequest,
            debt.id,
            &debt.debtor_id,
            &debt.creditor_id,
            format!("Marked as completed: {}", summary),
        );
        notifications.after.push(notification.clone());

        self.commit(Changes {
            notifications: Some(notifications),
            ..Default::default()
        })
        .await?;
        drop(guard);

        tracing::info!(debt_id = %debt.id, creditor = %debt.creditor_id, "completion submitted");

        self.sink
            .publish(LedgerEvent::NotificationCreated(notification.clone()))
            .await;

        Ok(CommandOutcome {
            updated_debt: Some(debt),
            emitted_notification: Some(notification),
            ..Default::default()
        })
    }

    /// in_progress → completed, 해당 debt의 target 표시 해제
    pub async fn confirm_completion(
        &self,
        notification_id: Uuid,
        debt_id: Uuid,
    ) -> LedgerResult<CommandOutcome> {
        self.resolve(notification_id, debt_id, &Resolution::CONFIRM_COMPLETION).await
    }

    /// 알림만 rejected, debt는 in_progress 유지 (재제출 가능)
    pub async fn reject_completion(
        &self,
        notification_id: Uuid,
        debt_id: Uuid,
    ) -> LedgerResult<CommandOutcome> {
        self.resolve(notification_id, debt_id, &Resolution::REJECT_COMPLETION).await
    }

    /// 알림 accept/reject 공통 처리
    ///
    /// 검증 순서: 존재(NotFound) → 알림-debt 일치(InvalidArgument)
    /// → debt 상태(InvalidState) → 알림 pending 여부(InvalidState)
    async fn resolve(
        &self,
        notification_id: Uuid,
        debt_id: Uuid,
        rule: &Resolution,
    ) -> LedgerResult<CommandOutcome> {
        let guard = self.write_lock.lock().await;

        let mut debts = Staged::from_loaded(self.store.load_debts().await?);
        let mut notifications = Staged::from_loaded(self.store.load_notifications().await?);

        let debt_idx = debts
            .after
            .iter()
            .position(|d| d.id == debt_id)
            .ok_or_else(|| LedgerError::NotFound(format!("Debt {}", debt_id)))?;
        let note_idx = notifications
            .after
            .iter()
            .position(|n| n.id == notification_id)
            .ok_or_else(|| LedgerError::NotFound(format!("Notification {}", notification_id)))?;

        let notification = &mut notifications.after[note_idx];
        if notification.debt_id != debt_id {
            return Err(LedgerError::InvalidArgument(format!(
                "Notification {} does not belong to debt {}",
                notification_id, debt_id
            )));
        }
        if notification.kind != rule.kind {
            return Err(LedgerError::InvalidArgument(format!(
                "{} expects a {} notification, got {}",
                rule.command, rule.kind, notification.kind
            )));
        }
        require_status(&debts.after[debt_idx], rule.required, rule.command)?;
        if !notification.is_pending() {
            return Err(LedgerError::InvalidState(format!(
                "Notification {} was already {}",
                notification_id, notification.status
            )));
        }

        notification.resolve(rule.verdict);
        let resolved = notification.clone();

        let mut outcome = CommandOutcome {
            resolved_notification: Some(resolved.clone()),
            ..Default::default()
        };

        let mut debts_changed = true;
        match rule.effect {
            DebtEffect::MoveTo(status) => {
                debts.after[debt_idx].transition(status);
                outcome.updated_debt = Some(debts.after[debt_idx].clone());
            }
            DebtEffect::Delete => {
                outcome.removed_debt = Some(debts.after.remove(debt_idx));
            }
            DebtEffect::Unchanged => {
                debts_changed = false;
                outcome.updated_debt = Some(debts.after[debt_idx].clone());
            }
        }

        // target 표시/해제
        let mut new_targets: Option<Staged<TargetStatus>> = None;
        if let Some(debt) = &outcome.updated_debt {
            match debt.status {
                DebtStatus::Rejected => {
                    let mut targets = Staged::from_loaded(self.store.load_targets().await?);
                    let already_marked = targets
                        .after
                        .iter()
                        .any(|t| t.assassin_id == debt.debtor_id && t.debt_id == debt.id);
                    if !already_marked {
                        let mark = TargetStatus::for_rejected_payment(debt);
                        targets.after.push(mark.clone());
                        outcome.target_marked = Some(mark);
                        new_targets = Some(targets);
                    }
                }
                DebtStatus::Completed => {
                    let mut targets = Staged::from_loaded(self.store.load_targets().await?);
                    let (cleared, kept): (Vec<TargetStatus>, Vec<TargetStatus>) = targets
                        .after
                        .drain(..)
                        .partition(|t| t.assassin_id == debt.debtor_id && t.debt_id == debt.id);
                    if !cleared.is_empty() {
                        outcome.targets_cleared = cleared;
                        targets.after = kept;
                        new_targets = Some(targets);
                    }
                }
                _ => {}
            }
        }

        self.commit(Changes {
            notifications: Some(notifications),
            debts: debts_changed.then_some(debts),
            targets: new_targets,
            debts_first: true,
        })
        .await?;
        drop(guard);

        tracing::info!(
            command = rule.command,
            debt_id = %debt_id,
            notification_id = %notification_id,
            verdict = %rule.verdict,
            "notification resolved"
        );

        self.sink
            .publish(LedgerEvent::NotificationResolved(resolved))
            .await;

        if let Some(mark) = &outcome.target_marked {
            tracing::warn!(assassin = %mark.assassin_id, debt_id = %mark.debt_id, "target marked");
            self.sink.publish(LedgerEvent::TargetMarked(mark.clone())).await;
        }
        for cleared in &outcome.targets_cleared {
            tracing::info!(assassin = %cleared.assassin_id, debt_id = %cleared.debt_id, "target cleared");
            self.sink.publish(LedgerEvent::TargetCleared(cleared.clone())).await;
        }

        Ok(outcome)
    }

    /// 바뀐 컬렉션 저장
    ///
    /// 실패 시 그 전에 저장한 컬렉션을 역순으로 되돌리고 원래 에러 반환
    async fn commit(&self, changes: Changes) -> LedgerResult<()> {
        let mut written = Vec::with_capacity(3);

        for collection in changes.write_order() {
            match self.write(&changes, collection, false).await {
                Ok(true) => written.push(collection),
                Ok(false) => {}
                Err(e) => {
                    for done in written.into_iter().rev() {
                        if let Err(restore_err) = self.write(&changes, done, true).await {
                            tracing::error!(
                                ?done,
                                "Failed to restore after partial write: {:#}",
                                restore_err
                            );
                        }
                    }
                    tracing::warn!(?collection, "Write failed, earlier writes rolled back");
                    return Err(e.into());
                }
            }
        }

        Ok(())
    }

    /// 컬렉션 하나 저장 (`restore`면 load 시점 값). 변경 없으면 `Ok(false)`
    async fn write(
        &self,
        changes: &Changes,
        collection: Collection,
        restore: bool,
    ) -> anyhow::Result<bool> {
        match collection {
            Collection::Debts => match &changes.debts {
                Some(debts) => self.store.save_debts(debts.values(restore)).await?,
                None => return Ok(false),
            },
            Collection::Notifications => match &changes.notifications {
                Some(notes) => self.store.save_notifications(notes.values(restore)).await?,
                None => return Ok(false),
            },
            Collection::Targets => match &changes.targets {
                Some(targets) => self.store.save_targets(targets.values(restore)).await?,
                None => return Ok(false),
            },
        }
        Ok(true)
    }

    // ============ Queries ============

    pub async fn get_debt(&self, debt_id: Uuid) -> LedgerResult<Debt> {
        let debts = self.store.load_debts().await?;
        debts
            .into_iter()
            .find(|d| d.id == debt_id)
            .ok_or_else(|| LedgerError::NotFound(format!("Debt {}", debt_id)))
    }

    pub async fn get_debts_for_actor(&self, actor_id: &str) -> LedgerResult<ActorDebts> {
        let actor = parse_actor(actor_id)?;
        let debts = self.store.load_debts().await?;
        Ok(queries::debts_for_actor(&debts, actor.as_str()))
    }

    pub async fn get_completed_debts(&self, actor_id: &str) -> LedgerResult<Vec<Debt>> {
        let actor = parse_actor(actor_id)?;
        let debts = self.store.load_debts().await?;
        Ok(queries::completed_debts(&debts, actor.as_str()))
    }

    pub async fn get_pending_notifications(&self, actor_id: &str) -> LedgerResult<Vec<Notification>> {
        let actor = parse_actor(actor_id)?;
        let notifications = self.store.load_notifications_for(actor.as_str()).await?;
        Ok(queries::pending_notifications(&notifications, actor.as_str()))
    }

    pub async fn get_notifications(&self, actor_id: &str) -> LedgerResult<Vec<Notification>> {
        let actor = parse_actor(actor_id)?;
        let notifications = self.store.load_notifications_for(actor.as_str()).await?;
        Ok(queries::notification_history(&notifications, actor.as_str()))
    }

    pub async fn is_target(&self, actor_id: &str) -> LedgerResult<bool> {
        let actor = parse_actor(actor_id)?;
        let targets = self.store.load_targets().await?;
        Ok(queries::is_target(&targets, actor.as_str()))
    }

    pub async fn get_target_info(&self, actor_id: &str) -> LedgerResult<TargetInfo> {
        let actor = parse_actor(actor_id)?;
        let targets = self.store.load_targets().await?;
        Ok(queries::target_info(&targets, actor.as_str()))
    }
}

/// 커맨드와 같은 규칙(trim, 공백 불가)으로 actor id 정규화
fn parse_actor(actor_id: &str) -> LedgerResult<ActorId> {
    ActorId::new(actor_id).map_err(LedgerError::Validation)
}

fn find_debt(debts: &mut [Debt], debt_id: Uuid) -> LedgerResult<&mut Debt> {
    debts
        .iter_mut()
        .find(|d| d.id == debt_id)
        .ok_or_else(|| LedgerError::NotFound(format!("Debt {}", debt_id)))
}

fn require_status(debt: &Debt, required: DebtStatus, command: &str) -> LedgerResult<()> {
    if debt.status == required {
        return Ok(());
    }
    if debt.status.is_terminal() {
        return Err(LedgerError::InvalidState(format!(
            "Debt {} is closed ({}); {} is no longer possible",
            debt.id, debt.status, command
        )));
    }
    Err(LedgerError::InvalidState(format!(
        "{} requires debt {} to be {}, but it is {}",
        command, debt.id, required, debt.status
    )))
}
