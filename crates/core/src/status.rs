//! Appointment status set, payment status labels, and the transition table.
//!
//! The lifecycle accepts any target from a non-terminal status; terminal
//! statuses (`CANCELLED_BY_ADMIN`, `REFUNDED`) accept nothing. The only
//! automatic move is the refund promotion rule in [`promote_after_refund`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// AppointmentStatus
// ---------------------------------------------------------------------------

/// Closed set of appointment statuses, stored as their upper-case names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Booked,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    Rejected,
    Pending,
    CancelledByAdmin,
    Refunded,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 9] = [
        Self::Booked,
        Self::Confirmed,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
        Self::Rejected,
        Self::Pending,
        Self::CancelledByAdmin,
        Self::Refunded,
    ];

    /// Database / wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Booked => "BOOKED",
            Self::Confirmed => "CONFIRMED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Rejected => "REJECTED",
            Self::Pending => "PENDING",
            Self::CancelledByAdmin => "CANCELLED_BY_ADMIN",
            Self::Refunded => "REFUNDED",
        }
    }

    /// No further transition is accepted once reached.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::CancelledByAdmin | Self::Refunded)
    }

    /// An admin decision against the booking. These trigger the refund path.
    pub fn is_admin_decision(self) -> bool {
        matches!(self, Self::Rejected | Self::CancelledByAdmin)
    }

    /// Statuses that reverse recognized revenue during payment reconciliation.
    pub fn is_cancellation(self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Rejected | Self::CancelledByAdmin
        )
    }

    /// Statuses that free the stylist's slot for waitlisted customers.
    pub fn releases_slot(self) -> bool {
        self.is_cancellation() || self == Self::Refunded
    }

    /// Whether an appointment in this status still occupies a stylist chair
    /// for capacity accounting.
    pub fn occupies_chair(self) -> bool {
        !self.releases_slot()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = CoreError;

    /// Case-insensitive parse of the upper-case status name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::Validation(format!("Unknown appointment status: {s}")))
    }
}

/// History statuses listed on the reporting dashboard.
pub const FINALIZED_STATUSES: [AppointmentStatus; 5] = [
    AppointmentStatus::Completed,
    AppointmentStatus::Refunded,
    AppointmentStatus::CancelledByAdmin,
    AppointmentStatus::Cancelled,
    AppointmentStatus::Rejected,
];

// ---------------------------------------------------------------------------
// Payment / refund labels
// ---------------------------------------------------------------------------

/// Values of `appointments.payment_status`.
pub mod payment_status {
    pub const PENDING: &str = "PENDING";
    pub const PAID: &str = "PAID";
    pub const REFUND_INITIATED: &str = "REFUND_INITIATED";
    pub const REFUNDED: &str = "REFUNDED";
}

/// Values of `appointments.refund_status`.
pub mod refund_status {
    /// Gateway status for a refund that has fully settled.
    pub const PROCESSED: &str = "processed";
    /// Recorded locally when the gateway call itself failed.
    pub const FAILED: &str = "FAILED";
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// Result of looking up a requested transition in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The source status is terminal; the request is a silent no-op.
    Frozen { current: AppointmentStatus },
    /// The status field may be moved to `to`.
    Accepted {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
}

/// Look up the transition `from -> to`.
pub fn transition(from: AppointmentStatus, to: AppointmentStatus) -> Transition {
    if from.is_terminal() {
        Transition::Frozen { current: from }
    } else {
        Transition::Accepted { from, to }
    }
}

/// Status after a gateway refund for an admin decision.
///
/// A refund the gateway reports as `processed` promotes the appointment to
/// `REFUNDED` regardless of which admin decision was requested; any other
/// refund status leaves the requested status in place.
pub fn promote_after_refund(
    requested: AppointmentStatus,
    gateway_status: Option<&str>,
) -> AppointmentStatus {
    match gateway_status {
        Some(s)
            if requested.is_admin_decision()
                && s.eq_ignore_ascii_case(refund_status::PROCESSED) =>
        {
            AppointmentStatus::Refunded
        }
        _ => requested,
    }
}
