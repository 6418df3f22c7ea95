//! Appointment entity, creation defaults, and the joined read model.

use chrono::Duration;
use serde::Serialize;

use crate::error::CoreError;
use crate::status::{payment_status, AppointmentStatus};
use crate::types::{DbId, WallTime};

/// Length of an appointment whose end time was not given, and of one
/// availability grid slot.
pub const DEFAULT_SLOT_MINUTES: i64 = 30;

/// Minutes before the start at which a reminder becomes due.
pub const DEFAULT_REMINDER_MINUTES: i32 = 60;

/// Placeholder used in views for missing names.
pub const NOT_AVAILABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row of the `appointments` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Appointment {
    pub id: DbId,
    pub service_id: DbId,
    pub user_id: DbId,
    pub stylist_id: Option<DbId>,
    pub appointment_date: WallTime,
    pub start_time: WallTime,
    pub end_time: WallTime,
    pub status: AppointmentStatus,
    pub amount: Option<f64>,
    pub payment_status: String,
    pub razorpay_payment_id: Option<String>,
    pub refund_status: Option<String>,
    pub refund_id: Option<String>,
    pub reminder_sent: bool,
    pub reminder_minutes: i32,
    pub created_at: WallTime,
}

impl Appointment {
    /// Payment was captured by the gateway.
    pub fn is_paid(&self) -> bool {
        self.payment_status
            .eq_ignore_ascii_case(payment_status::PAID)
    }

    /// Payment was already reversed or a reversal is in flight.
    pub fn is_refunded_or_refunding(&self) -> bool {
        self.payment_status
            .eq_ignore_ascii_case(payment_status::REFUNDED)
            || self
                .payment_status
                .eq_ignore_ascii_case(payment_status::REFUND_INITIATED)
    }

    /// Gateway payment reference, if one was recorded and is non-blank.
    pub fn payment_reference(&self) -> Option<&str> {
        self.razorpay_payment_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Input for a new appointment. Only `appointment_date` is required to fix
/// the interval; see [`NewAppointment::into_draft`] for the defaults.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub service_id: DbId,
    pub user_id: DbId,
    pub stylist_id: Option<DbId>,
    pub appointment_date: WallTime,
    pub start_time: Option<WallTime>,
    pub end_time: Option<WallTime>,
    pub amount: Option<f64>,
    pub reminder_minutes: Option<i32>,
}

/// A fully defaulted appointment ready to be inserted with status `BOOKED`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDraft {
    pub service_id: DbId,
    pub user_id: DbId,
    pub stylist_id: Option<DbId>,
    pub appointment_date: WallTime,
    pub start_time: WallTime,
    pub end_time: WallTime,
    pub status: AppointmentStatus,
    pub amount: Option<f64>,
    pub payment_status: String,
    pub reminder_minutes: i32,
}

impl NewAppointment {
    /// Apply creation defaults and validate the interval.
    ///
    /// - `start_time` defaults to `appointment_date`.
    /// - `end_time` defaults to `start_time` + 30 minutes.
    /// - status is `BOOKED`, payment status `PENDING`.
    pub fn into_draft(self) -> Result<AppointmentDraft, CoreError> {
        let start_time = self.start_time.unwrap_or(self.appointment_date);
        let end_time = self
            .end_time
            .unwrap_or(start_time + Duration::minutes(DEFAULT_SLOT_MINUTES));

        if end_time <= start_time {
            return Err(CoreError::Validation(
                "Appointment end time must be after its start time".into(),
            ));
        }
        if let Some(amount) = self.amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(CoreError::Validation(
                    "Appointment amount must be a non-negative number".into(),
                ));
            }
        }

        Ok(AppointmentDraft {
            service_id: self.service_id,
            user_id: self.user_id,
            stylist_id: self.stylist_id,
            appointment_date: self.appointment_date,
            start_time,
            end_time,
            status: AppointmentStatus::Booked,
            amount: self.amount,
            payment_status: payment_status::PENDING.to_string(),
            reminder_minutes: self.reminder_minutes.unwrap_or(DEFAULT_REMINDER_MINUTES),
        })
    }
}

// ---------------------------------------------------------------------------
// Referenced entities
// ---------------------------------------------------------------------------

/// Customer identity and contact details needed for notifications.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRef {
    pub id: DbId,
    pub name: String,
    pub email: Option<String>,
}

/// Catalog entry for a bookable service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceItem {
    pub id: DbId,
    pub name: String,
    pub category: Option<String>,
    pub price: Option<String>,
    pub duration_minutes: i32,
}

impl ServiceItem {
    /// Booked length; non-positive catalog durations fall back to one slot.
    pub fn effective_duration(&self) -> Duration {
        if self.duration_minutes > 0 {
            Duration::minutes(i64::from(self.duration_minutes))
        } else {
            Duration::minutes(DEFAULT_SLOT_MINUTES)
        }
    }
}

/// Minimal stylist identity carried on joined appointment rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StylistRef {
    pub id: DbId,
    pub name: String,
}

/// An appointment with its customer, service and stylist eagerly joined.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDetails {
    pub appointment: Appointment,
    pub customer: CustomerRef,
    pub service: ServiceItem,
    pub stylist: Option<StylistRef>,
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Serialized appointment shape returned to API clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentView {
    pub id: DbId,
    pub status: AppointmentStatus,
    pub payment_status: String,
    pub amount: Option<f64>,
    pub service_name: String,
    pub duration: i32,
    pub stylist_name: Option<String>,
    pub customer_name: String,
    /// Full ISO-8601 start (`2026-03-14T10:30:00`).
    pub appointment_date: String,
    /// `HH:MM` start.
    pub appointment_time: String,
    /// `HH:MM` end.
    pub end_time: String,
    pub refund_status: Option<String>,
    pub refund_id: Option<String>,
}

impl From<&AppointmentDetails> for AppointmentView {
    fn from(details: &AppointmentDetails) -> Self {
        let a = &details.appointment;
        Self {
            id: a.id,
            status: a.status,
            payment_status: a.payment_status.clone(),
            amount: a.amount,
            service_name: details.service.name.clone(),
            duration: details.service.duration_minutes,
            stylist_name: details.stylist.as_ref().map(|s| s.name.clone()),
            customer_name: details.customer.name.clone(),
            appointment_date: a.appointment_date.format("%Y-%m-%dT%H:%M:%S").to_string(),
            appointment_time: a.appointment_date.format("%H:%M").to_string(),
            end_time: a.end_time.format("%H:%M").to_string(),
            refund_status: a.refund_status.clone(),
            refund_id: a.refund_id.clone(),
        }
    }
}
