//! In-memory implementations of every port, for engine tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

use crate::appointment::{
    Appointment, AppointmentDetails, AppointmentDraft, CustomerRef, ServiceItem, StylistRef,
};
use crate::capacity::Stylist;
use crate::dashboard::{most_frequent, HistoryRow, TimeWindow};
use crate::overlap::{blocks_booking, intervals_overlap};
use crate::ports::{
    AccountStore, AppointmentStore, AuditLog, CatalogStore, HistoryQueries, Notice, Notifier,
    NotifyError, Order, PaymentError, PaymentProvider, Refund, RewardBalance, StoreError,
    WaitlistMatch, WaitlistStore,
};
use crate::reminders::is_due;
use crate::status::AppointmentStatus;
use crate::types::{DbId, WallTime};

/// Customer every [`details`] fixture belongs to.
pub const CUSTOMER_ID: DbId = 1;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn appointment(
    id: DbId,
    stylist_id: Option<DbId>,
    start: WallTime,
    end: WallTime,
    status: AppointmentStatus,
) -> Appointment {
    Appointment {
        id,
        service_id: 1,
        user_id: CUSTOMER_ID,
        stylist_id,
        appointment_date: start,
        start_time: start,
        end_time: end,
        status,
        amount: None,
        payment_status: "PENDING".into(),
        razorpay_payment_id: None,
        refund_status: None,
        refund_id: None,
        reminder_sent: false,
        reminder_minutes: 60,
        created_at: start - Duration::days(1),
    }
}

fn customer(id: DbId) -> CustomerRef {
    CustomerRef {
        id,
        name: format!("Customer {id}"),
        email: Some(format!("customer{id}@example.com")),
    }
}

fn haircut() -> ServiceItem {
    ServiceItem {
        id: 1,
        name: "Haircut".into(),
        category: Some("Hair".into()),
        price: Some("500".into()),
        duration_minutes: 30,
    }
}

pub fn details(
    id: DbId,
    stylist_id: Option<DbId>,
    start: WallTime,
    end: WallTime,
    status: AppointmentStatus,
) -> AppointmentDetails {
    AppointmentDetails {
        appointment: appointment(id, stylist_id, start, end, status),
        customer: customer(CUSTOMER_ID),
        service: haircut(),
        stylist: stylist_id.map(|id| StylistRef {
            id,
            name: format!("Stylist {id}"),
        }),
    }
}

pub fn stylist(id: DbId, capacity: i32) -> Stylist {
    Stylist {
        id,
        name: format!("Stylist {id}"),
        specialization: None,
        active: true,
        capacity,
    }
}

// ---------------------------------------------------------------------------
// InMemoryStore
// ---------------------------------------------------------------------------

struct WaitlistRow {
    id: DbId,
    user_id: DbId,
    stylist_id: DbId,
    day: NaiveDate,
    time: String,
    notified: bool,
}

#[derive(Default)]
struct State {
    next_id: DbId,
    appointments: BTreeMap<DbId, AppointmentDetails>,
    services: HashMap<DbId, ServiceItem>,
    stylists: BTreeMap<DbId, Stylist>,
    customers: HashMap<DbId, (CustomerRef, RewardBalance)>,
    waitlist: Vec<WaitlistRow>,
    history: Vec<(DbId, AppointmentStatus, WallTime)>,
    timeline: Vec<(DbId, AppointmentStatus, WallTime)>,
    fail_saves: bool,
    fail_history_queries: bool,
    fail_waitlist_lookups: bool,
}

impl State {
    fn ensure_customer(&mut self, c: CustomerRef) {
        self.customers.entry(c.id).or_insert((
            c,
            RewardBalance {
                wallet_balance: 0.0,
                loyalty_points: 0,
            },
        ));
    }

    fn allocate_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn history_rows(&self, window: &TimeWindow) -> Vec<(AppointmentStatus, &AppointmentDetails, WallTime)> {
        self.history
            .iter()
            .filter(|(_, _, at)| window.contains(*at))
            .filter_map(|(id, status, at)| self.appointments.get(id).map(|d| (*status, d, *at)))
            .collect()
    }
}

/// Single-process stand-in for every store port. Check-and-insert runs under
/// one lock, like the database store's advisory lock.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_service(&self, id: DbId, name: &str, duration_minutes: i32) {
        self.lock().services.insert(
            id,
            ServiceItem {
                id,
                name: name.into(),
                category: None,
                price: None,
                duration_minutes,
            },
        );
    }

    pub fn add_customer(&self, id: DbId, name: &str) {
        self.lock().ensure_customer(CustomerRef {
            id,
            name: name.into(),
            email: None,
        });
    }

    pub fn add_stylist(&self, stylist: Stylist) {
        self.lock().stylists.insert(stylist.id, stylist);
    }

    pub fn insert_details(&self, details: AppointmentDetails) {
        let mut state = self.lock();
        state.next_id = state.next_id.max(details.appointment.id);
        state.ensure_customer(details.customer.clone());
        state.appointments.insert(details.appointment.id, details);
    }

    pub fn add_waitlist(&self, user_id: DbId, stylist_id: DbId, day: NaiveDate, time: &str) -> DbId {
        let mut state = self.lock();
        state.ensure_customer(customer(user_id));
        let id = state.allocate_id();
        state.waitlist.push(WaitlistRow {
            id,
            user_id,
            stylist_id,
            day,
            time: time.into(),
            notified: false,
        });
        id
    }

    pub fn push_history(&self, appointment_id: DbId, status: AppointmentStatus, at: WallTime) {
        self.lock().history.push((appointment_id, status, at));
    }

    pub fn fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    pub fn fail_history_queries(&self, fail: bool) {
        self.lock().fail_history_queries = fail;
    }

    pub fn fail_waitlist_lookups(&self, fail: bool) {
        self.lock().fail_waitlist_lookups = fail;
    }

    pub fn appointment(&self, id: DbId) -> Option<Appointment> {
        self.lock().appointments.get(&id).map(|d| d.appointment.clone())
    }

    pub fn waitlist_notified(&self, entry_id: DbId) -> bool {
        self.lock()
            .waitlist
            .iter()
            .any(|w| w.id == entry_id && w.notified)
    }

    pub fn wallet(&self, user_id: DbId) -> RewardBalance {
        self.lock()
            .customers
            .get(&user_id)
            .map(|(_, balance)| *balance)
            .unwrap_or(RewardBalance {
                wallet_balance: 0.0,
                loyalty_points: 0,
            })
    }

    pub fn history_statuses(&self, appointment_id: DbId) -> Vec<AppointmentStatus> {
        self.lock()
            .history
            .iter()
            .filter(|(id, _, _)| *id == appointment_id)
            .map(|(_, s, _)| *s)
            .collect()
    }

    pub fn timeline_statuses(&self, appointment_id: DbId) -> Vec<AppointmentStatus> {
        self.lock()
            .timeline
            .iter()
            .filter(|(id, _, _)| *id == appointment_id)
            .map(|(_, s, _)| *s)
            .collect()
    }

    /// No stylist has two overlapping `BOOKED` appointments.
    pub fn no_booked_overlaps(&self) -> bool {
        let state = self.lock();
        let booked: Vec<&Appointment> = state
            .appointments
            .values()
            .map(|d| &d.appointment)
            .filter(|a| a.status == AppointmentStatus::Booked)
            .collect();
        booked.iter().enumerate().all(|(i, a)| {
            booked[i + 1..].iter().all(|b| {
                a.stylist_id != b.stylist_id
                    || !intervals_overlap(a.start_time, a.end_time, b.start_time, b.end_time)
            })
        })
    }
}

#[async_trait]
impl AppointmentStore for InMemoryStore {
    async fn find_details(&self, id: DbId) -> Result<Option<AppointmentDetails>, StoreError> {
        Ok(self.lock().appointments.get(&id).cloned())
    }

    async fn exists_booked_at(&self, at: WallTime) -> Result<bool, StoreError> {
        Ok(self.lock().appointments.values().any(|d| {
            d.appointment.status == AppointmentStatus::Booked && d.appointment.appointment_date == at
        }))
    }

    async fn has_overlap(
        &self,
        stylist_id: DbId,
        start: WallTime,
        end: WallTime,
    ) -> Result<bool, StoreError> {
        Ok(self
            .lock()
            .appointments
            .values()
            .any(|d| blocks_booking(&d.appointment, stylist_id, start, end)))
    }

    async fn insert_booked(&self, draft: &AppointmentDraft) -> Result<Appointment, StoreError> {
        let mut state = self.lock();
        if let Some(stylist_id) = draft.stylist_id {
            let taken = state.appointments.values().any(|d| {
                blocks_booking(&d.appointment, stylist_id, draft.start_time, draft.end_time)
            });
            if taken {
                return Err(StoreError::Conflict("stylist interval already booked".into()));
            }
        }

        let id = state.allocate_id();
        let appointment = Appointment {
            id,
            service_id: draft.service_id,
            user_id: draft.user_id,
            stylist_id: draft.stylist_id,
            appointment_date: draft.appointment_date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            status: draft.status,
            amount: draft.amount,
            payment_status: draft.payment_status.clone(),
            razorpay_payment_id: None,
            refund_status: None,
            refund_id: None,
            reminder_sent: false,
            reminder_minutes: draft.reminder_minutes,
            created_at: draft.appointment_date - Duration::days(1),
        };
        let service = state
            .services
            .get(&draft.service_id)
            .cloned()
            .unwrap_or_else(haircut);
        let customer = state
            .customers
            .get(&draft.user_id)
            .map(|(c, _)| c.clone())
            .unwrap_or_else(|| customer(draft.user_id));
        let stylist = draft.stylist_id.map(|id| StylistRef {
            id,
            name: state
                .stylists
                .get(&id)
                .map(|s| s.name.clone())
                .unwrap_or_default(),
        });
        state.appointments.insert(
            id,
            AppointmentDetails {
                appointment: appointment.clone(),
                customer,
                service,
                stylist,
            },
        );
        Ok(appointment)
    }

    async fn save(&self, appointment: &Appointment) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.fail_saves {
            return Err(StoreError::Backend("connection reset".into()));
        }
        let stored = state
            .appointments
            .get_mut(&appointment.id)
            .ok_or_else(|| StoreError::Backend(format!("appointment {} missing", appointment.id)))?;
        let created_at = stored.appointment.created_at;
        stored.appointment = appointment.clone();
        stored.appointment.created_at = created_at;
        Ok(())
    }

    async fn list_between(
        &self,
        start: WallTime,
        end: WallTime,
    ) -> Result<Vec<AppointmentDetails>, StoreError> {
        let mut rows: Vec<AppointmentDetails> = self
            .lock()
            .appointments
            .values()
            .filter(|d| d.appointment.appointment_date >= start && d.appointment.appointment_date < end)
            .cloned()
            .collect();
        rows.sort_by_key(|d| d.appointment.appointment_date);
        Ok(rows)
    }

    async fn reminder_candidates(
        &self,
        now: WallTime,
    ) -> Result<Vec<AppointmentDetails>, StoreError> {
        Ok(self
            .lock()
            .appointments
            .values()
            .filter(|d| is_due(&d.appointment, now))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn find_service(&self, id: DbId) -> Result<Option<ServiceItem>, StoreError> {
        Ok(self.lock().services.get(&id).cloned())
    }

    async fn find_stylist(&self, id: DbId) -> Result<Option<Stylist>, StoreError> {
        Ok(self.lock().stylists.get(&id).cloned())
    }

    async fn list_stylists(&self) -> Result<Vec<Stylist>, StoreError> {
        Ok(self.lock().stylists.values().cloned().collect())
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn find_customer(&self, id: DbId) -> Result<Option<CustomerRef>, StoreError> {
        Ok(self.lock().customers.get(&id).map(|(c, _)| c.clone()))
    }

    async fn credit_rewards(
        &self,
        user_id: DbId,
        cashback: f64,
        points: i32,
    ) -> Result<RewardBalance, StoreError> {
        let mut state = self.lock();
        let (_, balance) = state
            .customers
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::Backend(format!("user {user_id} missing")))?;
        balance.wallet_balance += cashback;
        balance.loyalty_points += points;
        Ok(*balance)
    }
}

#[async_trait]
impl WaitlistStore for InMemoryStore {
    async fn pending_for_slot(
        &self,
        stylist_id: DbId,
        day: NaiveDate,
        time_key: &str,
    ) -> Result<Vec<WaitlistMatch>, StoreError> {
        let state = self.lock();
        if state.fail_waitlist_lookups {
            return Err(StoreError::Backend("db down".into()));
        }
        Ok(state
            .waitlist
            .iter()
            .filter(|w| !w.notified && w.stylist_id == stylist_id && w.day == day && w.time == time_key)
            .map(|w| WaitlistMatch {
                entry_id: w.id,
                customer: state
                    .customers
                    .get(&w.user_id)
                    .map(|(c, _)| c.clone())
                    .unwrap_or_else(|| customer(w.user_id)),
                preferred_time: w.time.clone(),
            })
            .collect())
    }

    async fn mark_notified(&self, entry_id: DbId) -> Result<(), StoreError> {
        if let Some(row) = self.lock().waitlist.iter_mut().find(|w| w.id == entry_id) {
            row.notified = true;
        }
        Ok(())
    }
}

#[async_trait]
impl AuditLog for InMemoryStore {
    async fn append_history(
        &self,
        appointment_id: DbId,
        status: AppointmentStatus,
        changed_at: WallTime,
    ) -> Result<(), StoreError> {
        self.lock().history.push((appointment_id, status, changed_at));
        Ok(())
    }

    async fn append_timeline(
        &self,
        appointment_id: DbId,
        status: AppointmentStatus,
        at: WallTime,
    ) -> Result<(), StoreError> {
        self.lock().timeline.push((appointment_id, status, at));
        Ok(())
    }
}

#[async_trait]
impl HistoryQueries for InMemoryStore {
    async fn count_with_status(
        &self,
        status: AppointmentStatus,
        window: &TimeWindow,
    ) -> Result<i64, StoreError> {
        let state = self.lock();
        if state.fail_history_queries {
            return Err(StoreError::Backend("history unavailable".into()));
        }
        Ok(state
            .history_rows(window)
            .iter()
            .filter(|(s, _, _)| *s == status)
            .count() as i64)
    }

    async fn completed_revenue(&self, window: &TimeWindow) -> Result<Option<f64>, StoreError> {
        let state = self.lock();
        if state.fail_history_queries {
            return Err(StoreError::Backend("history unavailable".into()));
        }
        let amounts: Vec<f64> = state
            .history_rows(window)
            .iter()
            .filter(|(s, d, _)| {
                *s == AppointmentStatus::Completed
                    && d.appointment.status == AppointmentStatus::Completed
            })
            .filter_map(|(_, d, _)| d.appointment.amount)
            .collect();
        Ok((!amounts.is_empty()).then(|| amounts.iter().sum()))
    }

    async fn top_service(
        &self,
        status: AppointmentStatus,
        window: &TimeWindow,
    ) -> Result<Option<String>, StoreError> {
        let state = self.lock();
        if state.fail_history_queries {
            return Err(StoreError::Backend("history unavailable".into()));
        }
        let rows = state.history_rows(window);
        Ok(most_frequent(
            rows.iter()
                .filter(|(s, _, _)| *s == status)
                .map(|(_, d, _)| d.service.name.as_str()),
        ))
    }

    async fn top_customer(
        &self,
        status: AppointmentStatus,
        window: &TimeWindow,
    ) -> Result<Option<String>, StoreError> {
        let state = self.lock();
        if state.fail_history_queries {
            return Err(StoreError::Backend("history unavailable".into()));
        }
        let rows = state.history_rows(window);
        Ok(most_frequent(
            rows.iter()
                .filter(|(s, _, _)| *s == status)
                .map(|(_, d, _)| d.customer.name.as_str()),
        ))
    }

    async fn rows_with_statuses(
        &self,
        statuses: &[AppointmentStatus],
        window: &TimeWindow,
    ) -> Result<Vec<HistoryRow>, StoreError> {
        let state = self.lock();
        if state.fail_history_queries {
            return Err(StoreError::Backend("history unavailable".into()));
        }
        Ok(state
            .history_rows(window)
            .into_iter()
            .filter(|(s, _, _)| statuses.contains(s))
            .map(|(status, d, at)| HistoryRow {
                appointment_id: d.appointment.id,
                status,
                changed_at: Some(at),
                appointment_date: Some(d.appointment.appointment_date),
                amount: d.appointment.amount,
                service_name: Some(d.service.name.clone()),
                customer_name: Some(d.customer.name.clone()),
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Notifier and payment fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(DbId, Notice)>>,
    fail: AtomicBool,
    unreachable: Mutex<Vec<DbId>>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.set_failing(true);
        notifier
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Fail every send to `user_id` only.
    pub fn fail_for(&self, user_id: DbId) {
        self.unreachable.lock().unwrap().push(user_id);
    }

    pub fn sent(&self) -> Vec<(DbId, Notice)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, user_id: DbId) -> Vec<Notice> {
        self.sent()
            .into_iter()
            .filter(|(id, _)| *id == user_id)
            .map(|(_, n)| n)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, recipient: &CustomerRef, notice: &Notice) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst)
            || self.unreachable.lock().unwrap().contains(&recipient.id)
        {
            return Err(NotifyError::Email("smtp unavailable".into()));
        }
        self.sent.lock().unwrap().push((recipient.id, notice.clone()));
        Ok(())
    }
}

/// Gateway fake answering every refund with a fixed result.
pub struct ScriptedPayments {
    refund_status: Option<&'static str>,
    refunded: Mutex<Vec<String>>,
}

impl ScriptedPayments {
    pub fn processed() -> Self {
        Self::answering(Some("processed"))
    }

    pub fn pending() -> Self {
        Self::answering(Some("pending"))
    }

    /// Every refund call fails with a gateway rejection.
    pub fn failing() -> Self {
        Self::answering(None)
    }

    fn answering(refund_status: Option<&'static str>) -> Self {
        Self {
            refund_status,
            refunded: Mutex::new(Vec::new()),
        }
    }

    pub fn refunded(&self) -> Vec<String> {
        self.refunded.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProvider for ScriptedPayments {
    async fn create_order(&self, amount_minor: i64) -> Result<Order, PaymentError> {
        Ok(Order {
            id: "order_test".into(),
            amount: amount_minor,
            currency: "INR".into(),
        })
    }

    async fn refund(&self, payment_id: &str) -> Result<Refund, PaymentError> {
        let status = self.refund_status.ok_or_else(|| PaymentError::Rejected {
            status: 400,
            message: "payment already refunded".into(),
        })?;
        let mut refunded = self.refunded.lock().unwrap();
        refunded.push(payment_id.to_string());
        Ok(Refund {
            id: Some(format!("rfnd_{}", refunded.len())),
            status: Some(status.into()),
        })
    }
}
