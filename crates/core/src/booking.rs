//! Booking admission and the public availability grid.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use crate::appointment::{AppointmentDetails, NewAppointment, StylistRef};
use crate::capacity::day_bounds;
use crate::context::RequestContext;
use crate::error::CoreError;
use crate::ports::{AccountStore, AppointmentStore, CatalogStore};
use crate::slots::blocked_slots;
use crate::types::DbId;

/// Switches for the admission checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    /// Refuse any booking whose start equals the start of an existing
    /// `BOOKED` appointment, whatever the stylist.
    pub exact_timestamp_guard: bool,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            exact_timestamp_guard: true,
        }
    }
}

/// A customer's booking request.
#[derive(Debug, Clone)]
pub struct BookAppointment {
    pub service_id: DbId,
    /// Customer to book for; defaults to the caller. Only admins may book
    /// on behalf of someone else.
    pub user_id: Option<DbId>,
    pub stylist_id: Option<DbId>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub amount: Option<f64>,
}

pub struct BookingService {
    appointments: Arc<dyn AppointmentStore>,
    catalog: Arc<dyn CatalogStore>,
    accounts: Arc<dyn AccountStore>,
    policy: BookingPolicy,
}

impl BookingService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        catalog: Arc<dyn CatalogStore>,
        accounts: Arc<dyn AccountStore>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            appointments,
            catalog,
            accounts,
            policy,
        }
    }

    /// Admit and persist a booking.
    ///
    /// Checks run in a fixed order: service, customer, stylist, exact
    /// timestamp guard, stylist interval overlap. The store repeats the
    /// overlap check atomically with the insert, so a concurrent loser also
    /// gets [`CoreError::Conflict`].
    pub async fn book(
        &self,
        ctx: &RequestContext,
        req: BookAppointment,
    ) -> Result<AppointmentDetails, CoreError> {
        let user_id = req.user_id.unwrap_or(ctx.actor_id);
        ctx.ensure_owner_or_admin(user_id)?;

        let service = self
            .catalog
            .find_service(req.service_id)
            .await?
            .ok_or_else(|| CoreError::Validation("Service not found".into()))?;

        let customer = self
            .accounts
            .find_customer(user_id)
            .await?
            .ok_or_else(|| CoreError::Validation("User not found".into()))?;

        let stylist_id = req
            .stylist_id
            .ok_or_else(|| CoreError::Validation("Please select a stylist".into()))?;
        let stylist = self
            .catalog
            .find_stylist(stylist_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "stylist",
                id: stylist_id,
            })?;

        let start = req.date.and_time(req.time);
        let end = start + service.effective_duration();

        if self.policy.exact_timestamp_guard && self.appointments.exists_booked_at(start).await? {
            return Err(CoreError::Conflict("Slot already booked".into()));
        }
        if self.appointments.has_overlap(stylist.id, start, end).await? {
            return Err(CoreError::Conflict(
                "Stylist is already booked at this time".into(),
            ));
        }

        let draft = NewAppointment {
            service_id: service.id,
            user_id: customer.id,
            stylist_id: Some(stylist.id),
            appointment_date: start,
            start_time: Some(start),
            end_time: Some(end),
            amount: req.amount,
            reminder_minutes: None,
        }
        .into_draft()?;

        let appointment = self.appointments.insert_booked(&draft).await?;
        tracing::info!(
            appointment_id = appointment.id,
            user_id = customer.id,
            stylist_id = stylist.id,
            start = %start,
            "Appointment booked",
        );

        Ok(AppointmentDetails {
            appointment,
            customer,
            service,
            stylist: Some(StylistRef {
                id: stylist.id,
                name: stylist.name,
            }),
        })
    }

    /// Blocked `HH:MM` slot labels for `date`, for one stylist or for the
    /// salon as a whole.
    pub async fn booked_slots(
        &self,
        date: NaiveDate,
        stylist_id: Option<DbId>,
    ) -> Result<Vec<String>, CoreError> {
        let (start, end) = day_bounds(date);
        let day: Vec<_> = self
            .appointments
            .list_between(start, end)
            .await?
            .into_iter()
            .map(|d| d.appointment)
            .collect();
        let active = self
            .catalog
            .list_stylists()
            .await?
            .iter()
            .filter(|s| s.active)
            .count();
        Ok(blocked_slots(date, stylist_id, &day, active))
    }
}
