//! Waitlist rows and DTOs.

use chrono::NaiveDate;
use salon_core::types::{DbId, WallTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `waitlist_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WaitlistEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub service_id: Option<DbId>,
    pub stylist_id: DbId,
    pub preferred_date: NaiveDate,
    pub preferred_time: String,
    pub notified: bool,
    pub created_at: WallTime,
}

/// DTO for joining the waitlist.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWaitlistEntry {
    pub user_id: DbId,
    pub service_id: Option<DbId>,
    pub stylist_id: DbId,
    pub preferred_date: NaiveDate,
    /// `HH:MM`.
    pub preferred_time: String,
}

/// A pending entry joined with its customer.
#[derive(Debug, Clone, FromRow)]
pub struct WaitlistMatchRow {
    pub id: DbId,
    pub user_id: DbId,
    pub preferred_time: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
}
