//! Stylist capacity model: utilization, fleet summary and daily schedules.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::appointment::{AppointmentDetails, AppointmentView};
use crate::error::CoreError;
use crate::ports::{AppointmentStore, CatalogStore, Clock};
use crate::types::{DbId, WallTime};

/// Days ahead counted as "upcoming" on the schedule view.
pub const UPCOMING_DAYS: i64 = 7;

/// A row of the `stylists` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stylist {
    pub id: DbId,
    pub name: String,
    pub specialization: Option<String>,
    pub active: bool,
    /// Maximum number of appointments the stylist serves in parallel.
    pub capacity: i32,
}

/// Booked load of one stylist inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Utilization {
    pub booked_count: i64,
    pub capacity: i32,
    pub fully_booked: bool,
}

/// Compute utilization from the appointments of one stylist in a window.
///
/// Appointments in a cancellation-class status do not occupy a chair.
pub fn utilization(stylist: &Stylist, appointments: &[&AppointmentDetails]) -> Utilization {
    let booked_count = appointments
        .iter()
        .filter(|d| d.appointment.stylist_id == Some(stylist.id))
        .filter(|d| d.appointment.status.occupies_chair())
        .count() as i64;
    Utilization {
        booked_count,
        capacity: stylist.capacity,
        fully_booked: booked_count >= i64::from(stylist.capacity),
    }
}

/// Salon-wide availability for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    pub total_stylists: usize,
    pub active_stylists: usize,
    pub fully_booked: usize,
    pub available: usize,
}

/// Classify every active stylist as fully booked or available.
pub fn fleet_summary(stylists: &[Stylist], appointments: &[AppointmentDetails]) -> FleetSummary {
    let all: Vec<&AppointmentDetails> = appointments.iter().collect();
    let active: Vec<&Stylist> = stylists.iter().filter(|s| s.active).collect();
    let fully_booked = active
        .iter()
        .filter(|s| utilization(s, &all).fully_booked)
        .count();

    FleetSummary {
        total_stylists: stylists.len(),
        active_stylists: active.len(),
        fully_booked,
        available: active.len() - fully_booked,
    }
}

/// One stylist's card on the admin schedule view.
#[derive(Debug, Clone, Serialize)]
pub struct StylistSchedule {
    pub id: DbId,
    pub name: String,
    pub specialization: Option<String>,
    pub active: bool,
    pub capacity: i32,
    pub today_appointments: usize,
    pub upcoming_appointments: usize,
    pub todays_schedule: Vec<AppointmentView>,
}

/// Day boundaries `[00:00, next 00:00)` for `date`.
pub fn day_bounds(date: NaiveDate) -> (WallTime, WallTime) {
    let start = date.and_time(chrono::NaiveTime::MIN);
    (start, start + Duration::days(1))
}

/// Read-side service behind the stylist schedule and utilization views.
pub struct ScheduleService {
    appointments: Arc<dyn AppointmentStore>,
    catalog: Arc<dyn CatalogStore>,
    clock: Arc<dyn Clock>,
}

impl ScheduleService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        catalog: Arc<dyn CatalogStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            appointments,
            catalog,
            clock,
        }
    }

    /// Per-stylist schedule for `date` (defaults to today).
    ///
    /// The upcoming count covers the next [`UPCOMING_DAYS`] days from now.
    pub async fn schedule(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<Vec<StylistSchedule>, CoreError> {
        let now = self.clock.now();
        let (day_start, day_end) = day_bounds(date.unwrap_or(now.date()));

        let stylists = self.catalog.list_stylists().await?;
        let today = self.appointments.list_between(day_start, day_end).await?;
        let upcoming = self
            .appointments
            .list_between(now, now + Duration::days(UPCOMING_DAYS))
            .await?;

        Ok(stylists
            .into_iter()
            .map(|stylist| {
                let todays: Vec<&AppointmentDetails> = today
                    .iter()
                    .filter(|d| d.appointment.stylist_id == Some(stylist.id))
                    .filter(|d| d.appointment.status.occupies_chair())
                    .collect();
                let upcoming_count = upcoming
                    .iter()
                    .filter(|d| d.appointment.stylist_id == Some(stylist.id))
                    .filter(|d| d.appointment.status.occupies_chair())
                    .count();

                StylistSchedule {
                    id: stylist.id,
                    name: stylist.name,
                    specialization: stylist.specialization,
                    active: stylist.active,
                    capacity: stylist.capacity,
                    today_appointments: todays.len(),
                    upcoming_appointments: upcoming_count,
                    todays_schedule: todays.into_iter().map(AppointmentView::from).collect(),
                }
            })
            .collect())
    }

    /// Utilization of one stylist for the day containing `date`.
    pub async fn stylist_utilization(
        &self,
        stylist_id: DbId,
        date: Option<NaiveDate>,
    ) -> Result<Utilization, CoreError> {
        let stylist = self
            .catalog
            .find_stylist(stylist_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "stylist",
                id: stylist_id,
            })?;
        let (start, end) = day_bounds(date.unwrap_or(self.clock.now().date()));
        let day = self.appointments.list_between(start, end).await?;
        let refs: Vec<&AppointmentDetails> = day.iter().collect();
        Ok(utilization(&stylist, &refs))
    }

    /// Fleet-wide availability for today.
    pub async fn fleet_today(&self) -> Result<FleetSummary, CoreError> {
        let (start, end) = day_bounds(self.clock.now().date());
        let stylists = self.catalog.list_stylists().await?;
        let today = self.appointments.list_between(start, end).await?;
        Ok(fleet_summary(&stylists, &today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::AppointmentStatus;
    use crate::ports::FixedClock;
    use crate::testing::{details, stylist, InMemoryStore};

    fn at(d: u32, h: u32, m: u32) -> WallTime {
        NaiveDate::from_ymd_opt(2026, 7, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn two_booked_with_capacity_two_is_fully_booked() {
        let s = stylist(1, 2);
        let a = details(1, Some(1), at(10, 10, 0), at(10, 10, 30), AppointmentStatus::Booked);
        let b = details(2, Some(1), at(10, 11, 0), at(10, 11, 30), AppointmentStatus::Booked);
        let u = utilization(&s, &[&a, &b]);
        assert_eq!(u.booked_count, 2);
        assert_eq!(u.capacity, 2);
        assert!(u.fully_booked);
    }

    #[test]
    fn cancelled_appointments_free_capacity() {
        let s = stylist(1, 2);
        let a = details(1, Some(1), at(10, 10, 0), at(10, 10, 30), AppointmentStatus::Booked);
        let b = details(2, Some(1), at(10, 11, 0), at(10, 11, 30), AppointmentStatus::Cancelled);
        let u = utilization(&s, &[&a, &b]);
        assert_eq!(u.booked_count, 1);
        assert!(!u.fully_booked);
    }

    #[test]
    fn fleet_summary_counts_only_active_stylists() {
        let mut inactive = stylist(3, 1);
        inactive.active = false;
        let stylists = vec![stylist(1, 1), stylist(2, 1), inactive];
        let appts = vec![details(1, Some(1), at(10, 9, 0), at(10, 9, 30), AppointmentStatus::Booked)];
        let summary = fleet_summary(&stylists, &appts);
        assert_eq!(summary.total_stylists, 3);
        assert_eq!(summary.active_stylists, 2);
        assert_eq!(summary.fully_booked, 1);
        assert_eq!(summary.available, 1);
    }

    #[tokio::test]
    async fn schedule_lists_todays_appointments_per_stylist() {
        let store = Arc::new(InMemoryStore::new());
        store.add_stylist(stylist(1, 2));
        store.add_stylist(stylist(2, 1));
        store.insert_details(details(1, Some(1), at(10, 10, 0), at(10, 10, 30), AppointmentStatus::Booked));
        store.insert_details(details(2, Some(1), at(10, 12, 0), at(10, 12, 30), AppointmentStatus::Rejected));
        store.insert_details(details(3, Some(2), at(12, 9, 0), at(12, 9, 30), AppointmentStatus::Booked));

        let service = ScheduleService::new(
            store.clone(),
            store.clone(),
            Arc::new(FixedClock(at(10, 8, 0))),
        );
        let schedule = service.schedule(None).await.unwrap();

        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[0].today_appointments, 1);
        assert_eq!(schedule[0].todays_schedule[0].id, 1);
        assert_eq!(schedule[1].today_appointments, 0);
        assert_eq!(schedule[1].upcoming_appointments, 1);
    }

    #[tokio::test]
    async fn unknown_stylist_utilization_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let service = ScheduleService::new(
            store.clone(),
            store.clone(),
            Arc::new(FixedClock(at(10, 8, 0))),
        );
        assert!(matches!(
            service.stylist_utilization(9, None).await,
            Err(CoreError::NotFound { entity: "stylist", id: 9 })
        ));
    }
}
