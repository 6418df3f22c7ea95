//! Collaborator capabilities the scheduling engines are written against.
//!
//! Production implementations live in `salon-db` (stores), `salon-payments`
//! (gateway) and `salon-events` (notifications). Each trait is object-safe
//! and shared as `Arc<dyn Trait>`.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::appointment::{
    Appointment, AppointmentDetails, AppointmentDraft, CustomerRef, ServiceItem,
};
use crate::capacity::Stylist;
use crate::dashboard::{HistoryRow, TimeWindow};
use crate::error::CoreError;
use crate::status::AppointmentStatus;
use crate::types::{DbId, WallTime};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure reported by a persistence capability.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A write was refused because it would break a uniqueness or
    /// non-overlap rule.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backing store failed (connection, query, decoding).
    #[error("Store failure: {0}")]
    Backend(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => CoreError::Conflict(msg),
            StoreError::Backend(msg) => CoreError::Internal(msg),
        }
    }
}

/// Failure reported by the payment gateway client.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment gateway is not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid payment request: {0}")]
    InvalidRequest(String),

    #[error("Payment gateway rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Payment gateway unreachable: {0}")]
    Transport(String),
}

/// Failure reported by a notification channel.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Failed to store notification: {0}")]
    Store(String),

    #[error("Failed to deliver email: {0}")]
    Email(String),
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Appointment persistence and the booking query shapes.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Appointment with customer, service and stylist joined.
    async fn find_details(&self, id: DbId) -> Result<Option<AppointmentDetails>, StoreError>;

    /// A `BOOKED` appointment exists with exactly this `appointment_date`,
    /// for any stylist.
    async fn exists_booked_at(&self, at: WallTime) -> Result<bool, StoreError>;

    /// A `BOOKED` appointment of `stylist_id` overlaps `[start, end)`.
    async fn has_overlap(
        &self,
        stylist_id: DbId,
        start: WallTime,
        end: WallTime,
    ) -> Result<bool, StoreError>;

    /// Insert a draft. Implementations must re-check the stylist overlap
    /// atomically with the insert and return [`StoreError::Conflict`] when
    /// another booking won the race.
    async fn insert_booked(&self, draft: &AppointmentDraft) -> Result<Appointment, StoreError>;

    /// Persist every mutable field of `appointment` (status, payment and
    /// refund fields, reminder flag). `created_at` is never written.
    async fn save(&self, appointment: &Appointment) -> Result<(), StoreError>;

    /// Appointments whose `appointment_date` lies in `[start, end)`,
    /// ordered by `appointment_date`.
    async fn list_between(
        &self,
        start: WallTime,
        end: WallTime,
    ) -> Result<Vec<AppointmentDetails>, StoreError>;

    /// `BOOKED` appointments without a reminder whose start is within their
    /// own `reminder_minutes` of `now` (or already past).
    async fn reminder_candidates(
        &self,
        now: WallTime,
    ) -> Result<Vec<AppointmentDetails>, StoreError>;
}

/// Read access to the service catalog and stylist roster.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_service(&self, id: DbId) -> Result<Option<ServiceItem>, StoreError>;

    async fn find_stylist(&self, id: DbId) -> Result<Option<Stylist>, StoreError>;

    /// Every stylist, active or not, ordered by id.
    async fn list_stylists(&self) -> Result<Vec<Stylist>, StoreError>;
}

/// Balances after a reward credit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardBalance {
    pub wallet_balance: f64,
    pub loyalty_points: i32,
}

/// Customer accounts: identity lookup and the wallet/loyalty fields.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_customer(&self, id: DbId) -> Result<Option<CustomerRef>, StoreError>;

    /// Add `cashback` to the wallet and `points` to the loyalty balance.
    async fn credit_rewards(
        &self,
        user_id: DbId,
        cashback: f64,
        points: i32,
    ) -> Result<RewardBalance, StoreError>;
}

/// A waitlist entry matched for release, with its customer joined.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitlistMatch {
    pub entry_id: DbId,
    pub customer: CustomerRef,
    pub preferred_time: String,
}

/// Waitlist lookup and the notified flag.
#[async_trait]
pub trait WaitlistStore: Send + Sync {
    /// Not-yet-notified entries for exactly this stylist, day and `HH:MM`.
    async fn pending_for_slot(
        &self,
        stylist_id: DbId,
        day: NaiveDate,
        time_key: &str,
    ) -> Result<Vec<WaitlistMatch>, StoreError>;

    async fn mark_notified(&self, entry_id: DbId) -> Result<(), StoreError>;
}

/// Append-only audit trails owned by an appointment.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append_history(
        &self,
        appointment_id: DbId,
        status: AppointmentStatus,
        changed_at: WallTime,
    ) -> Result<(), StoreError>;

    async fn append_timeline(
        &self,
        appointment_id: DbId,
        status: AppointmentStatus,
        at: WallTime,
    ) -> Result<(), StoreError>;
}

/// Aggregations over appointment history used by the dashboard.
#[async_trait]
pub trait HistoryQueries: Send + Sync {
    /// History rows with `status` changed inside `window`.
    async fn count_with_status(
        &self,
        status: AppointmentStatus,
        window: &TimeWindow,
    ) -> Result<i64, StoreError>;

    /// Sum of appointment amounts over `COMPLETED` history rows in `window`
    /// whose appointment is still `COMPLETED`. `None` when nothing matched.
    async fn completed_revenue(&self, window: &TimeWindow) -> Result<Option<f64>, StoreError>;

    /// Service name with the most history rows of `status` in `window`.
    async fn top_service(
        &self,
        status: AppointmentStatus,
        window: &TimeWindow,
    ) -> Result<Option<String>, StoreError>;

    /// Customer name with the most history rows of `status` in `window`.
    async fn top_customer(
        &self,
        status: AppointmentStatus,
        window: &TimeWindow,
    ) -> Result<Option<String>, StoreError>;

    /// History rows whose status is in `statuses`, changed inside `window`.
    async fn rows_with_statuses(
        &self,
        statuses: &[AppointmentStatus],
        window: &TimeWindow,
    ) -> Result<Vec<HistoryRow>, StoreError>;
}

// ---------------------------------------------------------------------------
// Payment gateway
// ---------------------------------------------------------------------------

/// A gateway order created before checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Amount in minor currency units (paise).
    pub amount: i64,
    pub currency: String,
}

/// Gateway response to a refund request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    pub id: Option<String>,
    /// `processed` once settled; other values mean in flight.
    pub status: Option<String>,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_order(&self, amount_minor: i64) -> Result<Order, PaymentError>;

    /// Full refund of a captured payment.
    async fn refund(&self, payment_id: &str) -> Result<Refund, PaymentError>;
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// A message for a customer: the subject is used for email, the body for
/// both the in-app notification and the email text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub subject: String,
    pub body: String,
}

impl Notice {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &CustomerRef, notice: &Notice) -> Result<(), NotifyError>;
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Source of the salon wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> WallTime;
}

/// Local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> WallTime {
        chrono::Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub WallTime);

impl Clock for FixedClock {
    fn now(&self) -> WallTime {
        self.0
    }
}
