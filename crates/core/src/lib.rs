//! Salon scheduling core.
//!
//! Pure domain logic for appointment booking and the appointment status
//! lifecycle. Everything that touches the outside world (database, payment
//! gateway, mail, wall clock) is reached through the capability traits in
//! [`ports`], so the engines here can be exercised without infrastructure.
//!
//! - [`booking`] -- booking admission and the public availability grid.
//! - [`lifecycle`] -- status changes and their post-transition tasks.
//! - [`waitlist`] -- slot-opened notifications for waiting customers.
//! - [`capacity`] -- stylist utilization and daily schedules.
//! - [`dashboard`] -- ranged reporting over appointment history.
//! - [`reminders`] -- upcoming-appointment reminder sweep.

pub mod appointment;
pub mod booking;
pub mod capacity;
pub mod context;
pub mod dashboard;
pub mod error;
pub mod lifecycle;
pub mod overlap;
pub mod ports;
pub mod reminders;
pub mod roles;
pub mod slots;
pub mod status;
pub mod types;
pub mod waitlist;

#[cfg(test)]
pub(crate) mod testing;
