//! Half-open interval overlap test used by every booking check.

use crate::appointment::Appointment;
use crate::status::AppointmentStatus;
use crate::types::{DbId, WallTime};

/// `[a_start, a_end)` and `[b_start, b_end)` share at least one instant.
///
/// Touching endpoints (`a_end == b_start`) do not overlap.
pub fn intervals_overlap(
    a_start: WallTime,
    a_end: WallTime,
    b_start: WallTime,
    b_end: WallTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Whether `existing` blocks a new booking of `stylist_id` for
/// `[start, end)`: same stylist, still `BOOKED`, overlapping interval.
pub fn blocks_booking(
    existing: &Appointment,
    stylist_id: DbId,
    start: WallTime,
    end: WallTime,
) -> bool {
    existing.stylist_id == Some(stylist_id)
        && existing.status == AppointmentStatus::Booked
        && intervals_overlap(start, end, existing.start_time, existing.end_time)
}
