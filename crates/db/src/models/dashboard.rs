//! Dashboard read models.

use salon_core::types::{DbId, WallTime};
use serde::Serialize;
use sqlx::FromRow;

/// Salon-wide counters for the admin overview card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardOverview {
    pub users: i64,
    pub appointments: i64,
    /// Appointments still `BOOKED`.
    pub pending: i64,
    pub completed: i64,
}

/// A history row joined with its appointment, customer and service.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryRecord {
    pub appointment_id: DbId,
    pub status: String,
    pub changed_at: Option<WallTime>,
    pub appointment_date: Option<WallTime>,
    pub amount: Option<f64>,
    pub service_name: Option<String>,
    pub customer_name: Option<String>,
}
