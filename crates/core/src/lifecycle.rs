//! Appointment status lifecycle.
//!
//! A status change is committed first; everything that follows (refund,
//! notifications, payment bookkeeping, loyalty credit, waitlist release,
//! audit rows) runs as an ordered list of independent tasks. A failing task
//! is recorded in the returned [`StatusUpdate`] and logged, and never rolls
//! back the committed status.

use std::sync::Arc;

use serde::Serialize;

use crate::appointment::AppointmentDetails;
use crate::context::RequestContext;
use crate::error::CoreError;
use crate::ports::{
    AccountStore, AppointmentStore, AuditLog, Clock, Notice, Notifier, PaymentProvider,
};
use crate::status::{
    payment_status, promote_after_refund, refund_status, transition, AppointmentStatus,
    Transition,
};
use crate::types::DbId;
use crate::waitlist::WaitlistRelease;

/// Share of the amount credited to the wallet on completion.
pub const CASHBACK_RATE: f64 = 0.05;

/// Amount per loyalty point.
pub const POINTS_DIVISOR: f64 = 100.0;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Side effects run after a status commit, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostTransitionTask {
    /// Refund a captured payment through the gateway.
    Refund,
    /// Tell the customer about an admin rejection or cancellation.
    NotifyDecision,
    /// Bookkeeping-only payment reversal for cancelled revenue.
    ReconcilePayment,
    CreditCashback,
    NotifyCashback,
    ReleaseWaitlist,
    FinalSave,
    RecordHistory,
    RecordTimeline,
}

/// Tasks that apply to a transition into `requested`.
pub fn plan_tasks(requested: AppointmentStatus, record_history: bool) -> Vec<PostTransitionTask> {
    use PostTransitionTask::*;

    let mut tasks = Vec::new();
    if requested.is_admin_decision() {
        tasks.extend([Refund, NotifyDecision]);
    }
    if requested.is_cancellation() {
        tasks.push(ReconcilePayment);
    }
    if requested == AppointmentStatus::Completed {
        tasks.extend([CreditCashback, NotifyCashback]);
    }
    if requested.releases_slot() {
        tasks.push(ReleaseWaitlist);
    }
    tasks.push(FinalSave);
    if record_history {
        tasks.push(RecordHistory);
    }
    tasks.push(RecordTimeline);
    tasks
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum TaskOutcome {
    Applied,
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    pub task: PostTransitionTask,
    pub outcome: TaskOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// The appointment was already terminal; nothing changed.
    NoOpTerminal,
    /// The new status was persisted and the tasks ran.
    Committed,
    /// Persisting the new status failed; the snapshot is the stored state.
    CommitFailed(String),
}

/// Result of [`Lifecycle::update_status`].
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    /// Best-known state of the appointment after the update.
    pub details: AppointmentDetails,
    pub previous: AppointmentStatus,
    pub requested: AppointmentStatus,
    pub outcome: UpdateOutcome,
    pub tasks: Vec<TaskReport>,
}

impl StatusUpdate {
    pub fn outcome_of(&self, task: PostTransitionTask) -> Option<&TaskOutcome> {
        self.tasks
            .iter()
            .find(|r| r.task == task)
            .map(|r| &r.outcome)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Collaborators of the lifecycle engine.
#[derive(Clone)]
pub struct LifecyclePorts {
    pub appointments: Arc<dyn AppointmentStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub audit: Arc<dyn AuditLog>,
    pub payments: Arc<dyn PaymentProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub waitlist: Arc<WaitlistRelease>,
    pub clock: Arc<dyn Clock>,
}

pub struct Lifecycle {
    ports: LifecyclePorts,
    record_history: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefundAttempt {
    NotAttempted,
    Failed,
    Settled { processed: bool },
}

/// Mutable state threaded through one task run.
struct Run {
    details: AppointmentDetails,
    previous: AppointmentStatus,
    requested: AppointmentStatus,
    refund: RefundAttempt,
    cashback_credited: bool,
}

impl Lifecycle {
    pub fn new(ports: LifecyclePorts, record_history: bool) -> Self {
        Self {
            ports,
            record_history,
        }
    }

    /// Move an appointment to `status` and run the post-transition tasks.
    ///
    /// Only a missing appointment or a caller who may not touch it is an
    /// error. Terminal appointments are returned unchanged.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        appointment_id: DbId,
        status: AppointmentStatus,
    ) -> Result<StatusUpdate, CoreError> {
        let details = self.load(appointment_id).await?;
        ctx.ensure_owner_or_admin(details.appointment.user_id)?;

        let previous = details.appointment.status;
        if let Transition::Frozen { current } = transition(previous, status) {
            tracing::info!(
                appointment_id,
                status = %current,
                requested = %status,
                "Appointment is terminal, status unchanged",
            );
            return Ok(StatusUpdate {
                details,
                previous,
                requested: status,
                outcome: UpdateOutcome::NoOpTerminal,
                tasks: Vec::new(),
            });
        }

        let mut committed = details.clone();
        committed.appointment.status = status;
        if let Err(e) = self.ports.appointments.save(&committed.appointment).await {
            tracing::error!(appointment_id, error = %e, "Failed to persist status change");
            return Ok(StatusUpdate {
                details,
                previous,
                requested: status,
                outcome: UpdateOutcome::CommitFailed(e.to_string()),
                tasks: Vec::new(),
            });
        }
        tracing::info!(
            appointment_id,
            actor_id = ctx.actor_id,
            from = %previous,
            to = %status,
            "Appointment status changed",
        );

        let mut run = Run {
            details: committed,
            previous,
            requested: status,
            refund: RefundAttempt::NotAttempted,
            cashback_credited: false,
        };

        let mut reports = Vec::new();
        for task in plan_tasks(status, self.record_history) {
            let outcome = self.execute(task, &mut run).await;
            if let TaskOutcome::Failed(reason) = &outcome {
                tracing::warn!(appointment_id, ?task, %reason, "Post-transition task failed");
            }
            reports.push(TaskReport { task, outcome });
        }

        Ok(StatusUpdate {
            details: run.details,
            previous,
            requested: status,
            outcome: UpdateOutcome::Committed,
            tasks: reports,
        })
    }

    /// Record a captured gateway payment and complete the appointment.
    pub async fn settle_payment(
        &self,
        ctx: &RequestContext,
        appointment_id: DbId,
        payment_id: &str,
    ) -> Result<StatusUpdate, CoreError> {
        let details = self.load(appointment_id).await?;
        ctx.ensure_owner_or_admin(details.appointment.user_id)?;
        self.settle(ctx, details, payment_id).await
    }

    /// Settle one checkout covering several appointments.
    ///
    /// Every id is loaded and ownership-checked before anything is written,
    /// so a foreign id rejects the whole batch. Unknown ids are skipped.
    pub async fn settle_payments(
        &self,
        ctx: &RequestContext,
        appointment_ids: &[DbId],
        payment_id: &str,
    ) -> Result<Vec<StatusUpdate>, CoreError> {
        let mut found = Vec::with_capacity(appointment_ids.len());
        for &id in appointment_ids {
            match self.ports.appointments.find_details(id).await? {
                Some(details) => {
                    ctx.ensure_owner_or_admin(details.appointment.user_id)?;
                    found.push(details);
                }
                None => tracing::warn!(appointment_id = id, "Skipping unknown appointment in payment"),
            }
        }

        let mut updates = Vec::with_capacity(found.len());
        for details in found {
            updates.push(self.settle(ctx, details, payment_id).await?);
        }
        Ok(updates)
    }

    async fn settle(
        &self,
        ctx: &RequestContext,
        details: AppointmentDetails,
        payment_id: &str,
    ) -> Result<StatusUpdate, CoreError> {
        let appointment_id = details.appointment.id;
        let previous = details.appointment.status;
        let requested = AppointmentStatus::Completed;
        if let Transition::Frozen { current } = transition(previous, requested) {
            tracing::info!(
                appointment_id,
                status = %current,
                "Appointment is terminal, payment not recorded",
            );
            return Ok(StatusUpdate {
                details,
                previous,
                requested,
                outcome: UpdateOutcome::NoOpTerminal,
                tasks: Vec::new(),
            });
        }

        let mut appointment = details.appointment;
        appointment.payment_status = payment_status::PAID.to_string();
        appointment.razorpay_payment_id = Some(payment_id.to_string());
        self.ports.appointments.save(&appointment).await?;
        tracing::info!(appointment_id, "Payment recorded");

        self.update_status(ctx, appointment_id, requested).await
    }

    async fn load(&self, appointment_id: DbId) -> Result<AppointmentDetails, CoreError> {
        self.ports
            .appointments
            .find_details(appointment_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "appointment",
                id: appointment_id,
            })
    }

    async fn execute(&self, task: PostTransitionTask, run: &mut Run) -> TaskOutcome {
        use PostTransitionTask::*;

        match task {
            Refund => self.refund(run).await,
            NotifyDecision => self.notify_decision(run).await,
            ReconcilePayment => reconcile_payment(run),
            CreditCashback => self.credit_cashback(run).await,
            NotifyCashback => {
                if !run.cashback_credited {
                    return TaskOutcome::Skipped;
                }
                let notice = Notice::new(
                    "Cashback credited",
                    "Congratulations! You earned cashback.",
                );
                self.notify(run, &notice).await
            }
            ReleaseWaitlist => match self.ports.waitlist.release(&run.details).await {
                Err(e) => TaskOutcome::Failed(format!("waitlist lookup failed: {e}")),
                Ok(summary) if summary.failed > 0 => TaskOutcome::Failed(format!(
                    "{} of {} waitlist notifications failed",
                    summary.failed, summary.matched
                )),
                Ok(_) => TaskOutcome::Applied,
            },
            FinalSave => match self.ports.appointments.save(&run.details.appointment).await {
                Ok(()) => TaskOutcome::Applied,
                Err(e) => TaskOutcome::Failed(e.to_string()),
            },
            RecordHistory => {
                let a = &run.details.appointment;
                match self
                    .ports
                    .audit
                    .append_history(a.id, a.status, self.ports.clock.now())
                    .await
                {
                    Ok(()) => TaskOutcome::Applied,
                    Err(e) => TaskOutcome::Failed(e.to_string()),
                }
            }
            RecordTimeline => self.record_timeline(run).await,
        }
    }

    async fn refund(&self, run: &mut Run) -> TaskOutcome {
        let a = &mut run.details.appointment;
        let Some(payment_id) = a.payment_reference().map(str::to_owned) else {
            return TaskOutcome::Skipped;
        };
        if !a.is_paid() {
            return TaskOutcome::Skipped;
        }

        match self.ports.payments.refund(&payment_id).await {
            Ok(refund) => {
                if let Some(id) = refund.id {
                    a.refund_id = Some(id);
                }
                if let Some(status) = refund.status.as_ref() {
                    a.refund_status = Some(status.clone());
                }
                let processed = refund
                    .status
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(refund_status::PROCESSED));
                a.payment_status = if processed {
                    payment_status::REFUNDED
                } else {
                    payment_status::REFUND_INITIATED
                }
                .to_string();
                a.status = promote_after_refund(run.requested, refund.status.as_deref());
                run.refund = RefundAttempt::Settled { processed };
                tracing::info!(
                    appointment_id = a.id,
                    refund_id = a.refund_id.as_deref().unwrap_or_default(),
                    processed,
                    "Refund issued",
                );
                TaskOutcome::Applied
            }
            Err(e) => {
                a.refund_status = Some(refund_status::FAILED.to_string());
                run.refund = RefundAttempt::Failed;
                TaskOutcome::Failed(e.to_string())
            }
        }
    }

    async fn notify_decision(&self, run: &mut Run) -> TaskOutcome {
        let verb = if run.requested == AppointmentStatus::Rejected {
            "rejected"
        } else {
            "cancelled"
        };
        let notice = match run.refund {
            RefundAttempt::Settled { processed } => Notice::new(
                "Appointment Refund Update",
                format!(
                    "Your appointment has been {verb} by admin. Refund {}.",
                    if processed { "completed" } else { "initiated" }
                ),
            ),
            // A failed refund is left for manual follow-up.
            RefundAttempt::Failed => return TaskOutcome::Skipped,
            RefundAttempt::NotAttempted if run.details.appointment.is_paid() => {
                return TaskOutcome::Skipped
            }
            RefundAttempt::NotAttempted => Notice::new(
                "Appointment Update",
                format!("Your appointment has been {verb} by admin."),
            ),
        };
        self.notify(run, &notice).await
    }

    async fn credit_cashback(&self, run: &mut Run) -> TaskOutcome {
        if run.previous == AppointmentStatus::Completed {
            return TaskOutcome::Skipped;
        }
        let Some(amount) = run.details.appointment.amount else {
            return TaskOutcome::Skipped;
        };
        let (cashback, points) = rewards_for(amount);
        let user_id = run.details.appointment.user_id;

        match self
            .ports
            .accounts
            .credit_rewards(user_id, cashback, points)
            .await
        {
            Ok(balance) => {
                run.cashback_credited = true;
                tracing::info!(
                    user_id,
                    cashback,
                    points,
                    wallet_balance = balance.wallet_balance,
                    "Cashback credited",
                );
                TaskOutcome::Applied
            }
            Err(e) => TaskOutcome::Failed(e.to_string()),
        }
    }

    /// Append the requested status to the timeline, followed by the final
    /// status when a processed refund promoted it (so a promoted admin
    /// cancellation writes `CANCELLED_BY_ADMIN` then `REFUNDED`).
    async fn record_timeline(&self, run: &Run) -> TaskOutcome {
        let id = run.details.appointment.id;
        let now = self.ports.clock.now();
        let mut statuses = vec![run.requested];
        if run.details.appointment.status != run.requested {
            statuses.push(run.details.appointment.status);
        }
        for status in statuses {
            if let Err(e) = self.ports.audit.append_timeline(id, status, now).await {
                return TaskOutcome::Failed(e.to_string());
            }
        }
        TaskOutcome::Applied
    }

    async fn notify(&self, run: &Run, notice: &Notice) -> TaskOutcome {
        match self
            .ports
            .notifier
            .notify(&run.details.customer, notice)
            .await
        {
            Ok(()) => TaskOutcome::Applied,
            Err(e) => TaskOutcome::Failed(e.to_string()),
        }
    }
}

/// Wallet cashback and loyalty points earned by completing an appointment.
pub fn rewards_for(amount: f64) -> (f64, i32) {
    (amount * CASHBACK_RATE, (amount / POINTS_DIVISOR).floor() as i32)
}

/// Mark cancelled revenue as reversed without calling the gateway.
///
/// Runs after a failed gateway refund too: the payment is booked as
/// `REFUNDED` while `refund_status` stays `FAILED` for manual follow-up.
fn reconcile_payment(run: &mut Run) -> TaskOutcome {
    let a = &mut run.details.appointment;
    if a.is_refunded_or_refunding() {
        return TaskOutcome::Skipped;
    }
    if a.is_paid() || run.previous == AppointmentStatus::Completed {
        a.payment_status = payment_status::REFUNDED.to_string();
        TaskOutcome::Applied
    } else {
        TaskOutcome::Skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FixedClock;
    use crate::roles::{ROLE_ADMIN, ROLE_USER};
    use crate::testing::{details, InMemoryStore, RecordingNotifier, ScriptedPayments, CUSTOMER_ID};
    use crate::types::WallTime;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use AppointmentStatus::*;

    fn at(h: u32, m: u32) -> WallTime {
        NaiveDate::from_ymd_opt(2026, 5, 11)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    struct Harness {
        store: Arc<InMemoryStore>,
        notifier: Arc<RecordingNotifier>,
        payments: Arc<ScriptedPayments>,
        lifecycle: Lifecycle,
    }

    fn harness(payments: ScriptedPayments) -> Harness {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let payments = Arc::new(payments);
        let ports = LifecyclePorts {
            appointments: store.clone(),
            accounts: store.clone(),
            audit: store.clone(),
            payments: payments.clone(),
            notifier: notifier.clone(),
            waitlist: Arc::new(WaitlistRelease::new(store.clone(), notifier.clone())),
            clock: Arc::new(FixedClock(at(8, 0))),
        };
        Harness {
            store,
            notifier,
            payments,
            lifecycle: Lifecycle::new(ports, true),
        }
    }

    fn admin() -> RequestContext {
        RequestContext::new(1, ROLE_ADMIN)
    }

    fn paid(id: DbId, status: AppointmentStatus, amount: f64) -> AppointmentDetails {
        let mut d = details(id, Some(1), at(14, 0), at(14, 30), status);
        d.appointment.amount = Some(amount);
        d.appointment.payment_status = "PAID".into();
        d.appointment.razorpay_payment_id = Some("pay_123".into());
        d
    }

    // ---------------------------------------------------------------------------
    // Planning
    // ---------------------------------------------------------------------------

    #[test]
    fn plan_for_admin_cancel_runs_refund_first_and_timeline_last() {
        let plan = plan_tasks(CancelledByAdmin, true);
        assert_eq!(plan.first(), Some(&PostTransitionTask::Refund));
        assert_eq!(plan.last(), Some(&PostTransitionTask::RecordTimeline));
        assert!(plan.contains(&PostTransitionTask::ReleaseWaitlist));
        assert!(!plan.contains(&PostTransitionTask::CreditCashback));
    }

    #[test]
    fn plan_without_history_omits_history_task() {
        assert!(!plan_tasks(Confirmed, false).contains(&PostTransitionTask::RecordHistory));
        assert_eq!(
            plan_tasks(Confirmed, true),
            vec![
                PostTransitionTask::FinalSave,
                PostTransitionTask::RecordHistory,
                PostTransitionTask::RecordTimeline
            ]
        );
    }

    #[test]
    fn rewards_use_five_percent_and_floored_points() {
        assert_eq!(rewards_for(1000.0), (50.0, 10));
        assert_eq!(rewards_for(250.0), (12.5, 2));
        assert_eq!(rewards_for(99.0).1, 0);
    }

    // ---------------------------------------------------------------------------
    // Terminal guard and commit
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn terminal_appointment_is_left_unchanged() {
        for terminal in [Refunded, CancelledByAdmin] {
            for requested in AppointmentStatus::ALL {
                let h = harness(ScriptedPayments::processed());
                let original = paid(1, terminal, 800.0);
                h.store.insert_details(original.clone());

                let update = h.lifecycle.update_status(&admin(), 1, requested).await.unwrap();

                assert_eq!(update.outcome, UpdateOutcome::NoOpTerminal, "{terminal} -> {requested}");
                assert!(update.tasks.is_empty());
                assert_eq!(update.details, original);
                assert_eq!(h.store.appointment(1).unwrap(), original.appointment);
                assert!(h.store.timeline_statuses(1).is_empty());
                assert!(h.store.history_statuses(1).is_empty());
                assert!(h.notifier.sent().is_empty());
                assert!(h.payments.refunded().is_empty());
            }
        }
    }

    #[tokio::test]
    async fn unknown_appointment_is_not_found() {
        let h = harness(ScriptedPayments::processed());
        assert_matches!(
            h.lifecycle.update_status(&admin(), 77, Completed).await,
            Err(CoreError::NotFound { entity: "appointment", id: 77 })
        );
    }

    #[tokio::test]
    async fn customer_cannot_change_foreign_appointment() {
        let h = harness(ScriptedPayments::processed());
        h.store.insert_details(paid(1, Booked, 100.0));
        let stranger = RequestContext::new(CUSTOMER_ID + 1, ROLE_USER);
        assert_matches!(
            h.lifecycle.update_status(&stranger, 1, Cancelled).await,
            Err(CoreError::Forbidden(_))
        );
    }

    #[tokio::test]
    async fn failed_commit_returns_stored_snapshot() {
        let h = harness(ScriptedPayments::processed());
        h.store.insert_details(paid(1, Booked, 100.0));
        h.store.fail_saves(true);

        let update = h.lifecycle.update_status(&admin(), 1, Confirmed).await.unwrap();

        assert_matches!(update.outcome, UpdateOutcome::CommitFailed(_));
        assert_eq!(update.details.appointment.status, Booked);
        assert!(update.tasks.is_empty());
    }

    // ---------------------------------------------------------------------------
    // Refunds
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn processed_refund_promotes_to_refunded_and_releases_waitlist() {
        let h = harness(ScriptedPayments::processed());
        h.store.insert_details(paid(1, Booked, 1000.0));
        let entry = h.store.add_waitlist(50, 1, at(14, 0).date(), "14:00");

        let update = h
            .lifecycle
            .update_status(&admin(), 1, CancelledByAdmin)
            .await
            .unwrap();

        let stored = h.store.appointment(1).unwrap();
        assert_eq!(stored.status, Refunded);
        assert_eq!(stored.payment_status, "REFUNDED");
        assert_eq!(stored.refund_id.as_deref(), Some("rfnd_1"));
        assert_eq!(stored.refund_status.as_deref(), Some("processed"));
        assert_eq!(update.details.appointment, stored);
        assert!(h.store.waitlist_notified(entry));
        assert_eq!(h.payments.refunded(), vec!["pay_123".to_string()]);

        let customer_messages = h.notifier.sent_to(CUSTOMER_ID);
        assert_eq!(
            customer_messages[0].body,
            "Your appointment has been cancelled by admin. Refund completed."
        );
        assert_eq!(h.store.timeline_statuses(1), vec![CancelledByAdmin, Refunded]);
        assert_eq!(h.store.history_statuses(1), vec![Refunded]);
    }

    #[tokio::test]
    async fn pending_refund_marks_initiated_and_keeps_requested_status() {
        let h = harness(ScriptedPayments::pending());
        h.store.insert_details(paid(1, Booked, 1000.0));

        h.lifecycle.update_status(&admin(), 1, Rejected).await.unwrap();

        let stored = h.store.appointment(1).unwrap();
        assert_eq!(stored.status, Rejected);
        assert_eq!(stored.payment_status, "REFUND_INITIATED");
        assert_eq!(
            h.notifier.sent_to(CUSTOMER_ID)[0].body,
            "Your appointment has been rejected by admin. Refund initiated."
        );
    }

    #[tokio::test]
    async fn failed_refund_is_recorded_for_manual_follow_up() {
        let h = harness(ScriptedPayments::failing());
        h.store.insert_details(paid(1, Booked, 1000.0));

        let update = h
            .lifecycle
            .update_status(&admin(), 1, CancelledByAdmin)
            .await
            .unwrap();

        let stored = h.store.appointment(1).unwrap();
        assert_eq!(update.outcome, UpdateOutcome::Committed);
        assert_eq!(stored.status, CancelledByAdmin);
        assert_eq!(stored.refund_status.as_deref(), Some("FAILED"));
        assert_eq!(stored.payment_status, "REFUNDED");
        assert_matches!(
            update.outcome_of(PostTransitionTask::Refund),
            Some(TaskOutcome::Failed(_))
        );
        assert_eq!(
            update.outcome_of(PostTransitionTask::ReconcilePayment),
            Some(&TaskOutcome::Applied)
        );
        assert!(h.notifier.sent_to(CUSTOMER_ID).is_empty());
    }

    #[tokio::test]
    async fn unpaid_admin_rejection_sends_plain_notice() {
        let h = harness(ScriptedPayments::processed());
        h.store.insert_details(details(1, Some(1), at(14, 0), at(14, 30), Booked));

        let update = h.lifecycle.update_status(&admin(), 1, Rejected).await.unwrap();

        assert_eq!(update.outcome_of(PostTransitionTask::Refund), Some(&TaskOutcome::Skipped));
        assert!(h.payments.refunded().is_empty());
        assert_eq!(
            h.notifier.sent_to(CUSTOMER_ID)[0].body,
            "Your appointment has been rejected by admin."
        );
        assert_eq!(h.store.appointment(1).unwrap().payment_status, "PENDING");
    }

    #[tokio::test]
    async fn notification_failure_does_not_undo_the_refund() {
        let h = harness(ScriptedPayments::processed());
        h.notifier.set_failing(true);
        h.store.insert_details(paid(1, Booked, 1000.0));

        let update = h
            .lifecycle
            .update_status(&admin(), 1, CancelledByAdmin)
            .await
            .unwrap();

        assert_matches!(
            update.outcome_of(PostTransitionTask::NotifyDecision),
            Some(TaskOutcome::Failed(_))
        );
        assert_eq!(h.store.appointment(1).unwrap().status, Refunded);
    }

    #[tokio::test]
    async fn waitlist_lookup_failure_is_reported() {
        let h = harness(ScriptedPayments::processed());
        h.store.insert_details(details(1, Some(1), at(14, 0), at(14, 30), Booked));
        h.store.add_waitlist(50, 1, at(14, 0).date(), "14:00");
        h.store.fail_waitlist_lookups(true);

        let update = h.lifecycle.update_status(&admin(), 1, Cancelled).await.unwrap();

        assert_eq!(update.outcome, UpdateOutcome::Committed);
        assert_matches!(
            update.outcome_of(PostTransitionTask::ReleaseWaitlist),
            Some(TaskOutcome::Failed(_))
        );
        assert!(h.notifier.sent_to(50).is_empty());
        assert_eq!(h.store.appointment(1).unwrap().status, Cancelled);
    }

    #[tokio::test]
    async fn partial_waitlist_delivery_is_reported() {
        let h = harness(ScriptedPayments::processed());
        h.store.insert_details(details(1, Some(1), at(14, 0), at(14, 30), Booked));
        h.store.add_waitlist(50, 1, at(14, 0).date(), "14:00");
        let reached = h.store.add_waitlist(51, 1, at(14, 0).date(), "14:00");
        h.notifier.fail_for(50);

        let update = h.lifecycle.update_status(&admin(), 1, Cancelled).await.unwrap();

        assert_matches!(
            update.outcome_of(PostTransitionTask::ReleaseWaitlist),
            Some(TaskOutcome::Failed(reason)) if reason.contains("1 of 2")
        );
        assert!(h.store.waitlist_notified(reached));
    }

    // ---------------------------------------------------------------------------
    // Reconciliation
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn cancelling_completed_revenue_marks_refunded_without_gateway() {
        let h = harness(ScriptedPayments::processed());
        let mut d = details(1, Some(1), at(14, 0), at(14, 30), Completed);
        d.appointment.amount = Some(300.0);
        h.store.insert_details(d);

        h.lifecycle.update_status(&admin(), 1, Cancelled).await.unwrap();

        let stored = h.store.appointment(1).unwrap();
        assert_eq!(stored.status, Cancelled);
        assert_eq!(stored.payment_status, "REFUNDED");
        assert!(h.payments.refunded().is_empty());
    }

    #[tokio::test]
    async fn customer_cancel_of_unpaid_booking_keeps_payment_pending() {
        let h = harness(ScriptedPayments::processed());
        h.store.insert_details(details(1, Some(1), at(14, 0), at(14, 30), Booked));
        let ctx = RequestContext::new(CUSTOMER_ID, ROLE_USER);

        let update = h.lifecycle.update_status(&ctx, 1, Cancelled).await.unwrap();

        assert_eq!(
            update.outcome_of(PostTransitionTask::ReconcilePayment),
            Some(&TaskOutcome::Skipped)
        );
        assert_eq!(h.store.appointment(1).unwrap().payment_status, "PENDING");
    }

    // ---------------------------------------------------------------------------
    // Cashback
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn completing_credits_cashback_once() {
        let h = harness(ScriptedPayments::processed());
        let mut d = details(1, Some(1), at(14, 0), at(14, 30), Booked);
        d.appointment.amount = Some(1000.0);
        h.store.insert_details(d);

        h.lifecycle.update_status(&admin(), 1, Completed).await.unwrap();
        let again = h.lifecycle.update_status(&admin(), 1, Completed).await.unwrap();

        let balance = h.store.wallet(CUSTOMER_ID);
        assert_eq!(balance.wallet_balance, 50.0);
        assert_eq!(balance.loyalty_points, 10);
        assert_eq!(
            again.outcome_of(PostTransitionTask::CreditCashback),
            Some(&TaskOutcome::Skipped)
        );
        assert_eq!(
            h.notifier
                .sent_to(CUSTOMER_ID)
                .iter()
                .filter(|n| n.body == "Congratulations! You earned cashback.")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn completion_without_amount_skips_cashback() {
        let h = harness(ScriptedPayments::processed());
        h.store.insert_details(details(1, Some(1), at(14, 0), at(14, 30), Booked));

        let update = h.lifecycle.update_status(&admin(), 1, Completed).await.unwrap();

        assert_eq!(
            update.outcome_of(PostTransitionTask::NotifyCashback),
            Some(&TaskOutcome::Skipped)
        );
        assert_eq!(h.store.wallet(CUSTOMER_ID).wallet_balance, 0.0);
    }

    // ---------------------------------------------------------------------------
    // Audit trail and payment settlement
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn every_committed_change_is_audited() {
        let h = harness(ScriptedPayments::processed());
        h.store.insert_details(details(1, Some(1), at(14, 0), at(14, 30), Booked));

        h.lifecycle.update_status(&admin(), 1, Confirmed).await.unwrap();
        h.lifecycle.update_status(&admin(), 1, InProgress).await.unwrap();

        assert_eq!(h.store.timeline_statuses(1), vec![Confirmed, InProgress]);
        assert_eq!(h.store.history_statuses(1), vec![Confirmed, InProgress]);
    }

    #[tokio::test]
    async fn settling_a_payment_completes_the_appointment() {
        let h = harness(ScriptedPayments::processed());
        let mut d = details(1, Some(1), at(14, 0), at(14, 30), Booked);
        d.appointment.amount = Some(200.0);
        h.store.insert_details(d);
        let ctx = RequestContext::new(CUSTOMER_ID, ROLE_USER);

        let update = h.lifecycle.settle_payment(&ctx, 1, "pay_777").await.unwrap();

        let stored = h.store.appointment(1).unwrap();
        assert_eq!(update.outcome, UpdateOutcome::Committed);
        assert_eq!(stored.status, Completed);
        assert_eq!(stored.payment_status, "PAID");
        assert_eq!(stored.razorpay_payment_id.as_deref(), Some("pay_777"));
        assert_eq!(h.store.wallet(CUSTOMER_ID).wallet_balance, 10.0);
    }

    #[tokio::test]
    async fn settling_a_refunded_appointment_changes_nothing() {
        let h = harness(ScriptedPayments::processed());
        let mut original = paid(1, Refunded, 800.0);
        original.appointment.payment_status = "REFUNDED".into();
        h.store.insert_details(original.clone());
        let ctx = RequestContext::new(CUSTOMER_ID, ROLE_USER);

        let update = h.lifecycle.settle_payment(&ctx, 1, "pay_replay").await.unwrap();

        assert_eq!(update.outcome, UpdateOutcome::NoOpTerminal);
        assert!(update.tasks.is_empty());
        assert_eq!(h.store.appointment(1).unwrap(), original.appointment);
        assert_eq!(h.store.wallet(CUSTOMER_ID).wallet_balance, 0.0);
        assert!(h.store.timeline_statuses(1).is_empty());
    }

    #[tokio::test]
    async fn settling_several_skips_unknown_ids() {
        let h = harness(ScriptedPayments::processed());
        h.store.insert_details(details(1, Some(1), at(14, 0), at(14, 30), Booked));
        let ctx = RequestContext::new(CUSTOMER_ID, ROLE_USER);

        let updates = h
            .lifecycle
            .settle_payments(&ctx, &[1, 999], "pay_888")
            .await
            .unwrap();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].details.appointment.id, 1);
        let stored = h.store.appointment(1).unwrap();
        assert_eq!(stored.status, Completed);
        assert_eq!(stored.payment_status, "PAID");
    }

    #[tokio::test]
    async fn settling_several_rejects_a_foreign_id_before_writing() {
        let h = harness(ScriptedPayments::processed());
        h.store.insert_details(details(1, Some(1), at(14, 0), at(14, 30), Booked));
        let mut foreign = details(2, Some(1), at(15, 0), at(15, 30), Booked);
        foreign.customer.id = CUSTOMER_ID + 1;
        foreign.appointment.user_id = CUSTOMER_ID + 1;
        h.store.insert_details(foreign);
        let ctx = RequestContext::new(CUSTOMER_ID, ROLE_USER);

        assert_matches!(
            h.lifecycle.settle_payments(&ctx, &[1, 2], "pay_888").await,
            Err(CoreError::Forbidden(_))
        );

        let untouched = h.store.appointment(1).unwrap();
        assert_eq!(untouched.status, Booked);
        assert_eq!(untouched.payment_status, "PENDING");
        assert!(untouched.razorpay_payment_id.is_none());
    }
}
