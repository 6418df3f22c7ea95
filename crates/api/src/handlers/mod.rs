//! HTTP handlers, one module per resource.

pub mod admin;
pub mod appointments;
pub mod catalog;
pub mod notifications;
pub mod payments;
pub mod waitlist;

use chrono::NaiveTime;
use salon_core::appointment::AppointmentDetails;
use salon_core::error::CoreError;
use salon_db::models::appointment::AppointmentDetailsRow;

/// Parse `HH:MM` (seconds tolerated).
pub(crate) fn parse_clock_time(value: &str) -> Result<NaiveTime, CoreError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| CoreError::Validation(format!("Invalid time {value:?}, expected HH:MM")))
}

pub(crate) fn decode_rows(
    rows: Vec<AppointmentDetailsRow>,
) -> Result<Vec<AppointmentDetails>, CoreError> {
    rows.into_iter()
        .map(|row| salon_db::store::decode_details(row).map_err(CoreError::from))
        .collect()
}
