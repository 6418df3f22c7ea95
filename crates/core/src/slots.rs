//! Public availability grid.
//!
//! The salon day is shown as fixed 30-minute slots between opening and
//! closing. A slot is reported as blocked when a specific stylist is busy
//! during it, or, for the "any stylist" view, when every active stylist is.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::appointment::{Appointment, DEFAULT_SLOT_MINUTES};
use crate::overlap::intervals_overlap;
use crate::status::AppointmentStatus;
use crate::types::{DbId, WallTime};

/// First slot of the day starts at 09:00.
pub const OPENING_HOUR: u32 = 9;
/// No slot starts at or after 21:00.
pub const CLOSING_HOUR: u32 = 21;

/// One grid cell `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub start: WallTime,
    pub end: WallTime,
}

impl Slot {
    /// `HH:MM` label of the slot start.
    pub fn label(&self) -> String {
        self.start.format("%H:%M").to_string()
    }
}

/// All grid slots for `date`, in order.
pub fn day_grid(date: NaiveDate) -> Vec<Slot> {
    let step = Duration::minutes(DEFAULT_SLOT_MINUTES);
    let open = NaiveTime::from_hms_opt(OPENING_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    let close = NaiveTime::from_hms_opt(CLOSING_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    let closing = date.and_time(close);

    let mut slots = Vec::new();
    let mut start = date.and_time(open);
    while start < closing {
        slots.push(Slot {
            start,
            end: start + step,
        });
        start += step;
    }
    slots
}

/// Labels of the blocked slots on `date`.
///
/// `appointments` should cover the day; cancelled ones are ignored.
/// With `stylist_id`, a slot is blocked if any of that stylist's
/// appointments overlaps it. Without, a slot is blocked only when the number
/// of distinct busy stylists reaches `active_stylists` (and the salon has at
/// least one active stylist).
pub fn blocked_slots(
    date: NaiveDate,
    stylist_id: Option<DbId>,
    appointments: &[Appointment],
    active_stylists: usize,
) -> Vec<String> {
    let live: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| a.status != AppointmentStatus::Cancelled)
        .collect();

    day_grid(date)
        .into_iter()
        .filter(|slot| {
            let overlapping = live
                .iter()
                .filter(|a| intervals_overlap(a.start_time, a.end_time, slot.start, slot.end));

            match stylist_id {
                Some(wanted) => overlapping
                    .into_iter()
                    .any(|a| a.stylist_id == Some(wanted)),
                None => {
                    let busy: HashSet<DbId> =
                        overlapping.filter_map(|a| a.stylist_id).collect();
                    active_stylists > 0 && busy.len() >= active_stylists
                }
            }
        })
        .map(|slot| slot.label())
        .collect()
}
