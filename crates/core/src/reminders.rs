//! Upcoming-appointment reminders.

use std::sync::Arc;

use chrono::Duration;

use crate::appointment::{Appointment, AppointmentDetails};
use crate::error::CoreError;
use crate::ports::{AppointmentStore, Clock, Notice, Notifier};
use crate::status::AppointmentStatus;
use crate::types::WallTime;

/// Shown when an appointment has no stylist assigned.
const UNASSIGNED_STYLIST: &str = "Assigned Specialist";

/// A reminder is due once the appointment is within its own reminder lead
/// time (or already started) and none was sent yet.
pub fn is_due(appointment: &Appointment, now: WallTime) -> bool {
    appointment.status == AppointmentStatus::Booked
        && !appointment.reminder_sent
        && appointment.appointment_date
            <= now + Duration::minutes(i64::from(appointment.reminder_minutes))
}

pub fn reminder_notice(details: &AppointmentDetails) -> Notice {
    let at = details.appointment.appointment_date;
    let stylist = details
        .stylist
        .as_ref()
        .map(|s| s.name.as_str())
        .unwrap_or(UNASSIGNED_STYLIST);

    Notice::new(
        "Appointment Reminder",
        format!(
            "Dear {},\n\n\
             This is a reminder of your upcoming appointment.\n\n\
             Specialist: {stylist}\n\
             Date: {}\n\
             Time: {}\n\
             Service: {}\n\n\
             Please arrive 10 minutes early. If you cannot attend, cancel or \
             reschedule through the app.",
            details.customer.name,
            at.format("%A, %d %b %Y"),
            at.format("%I:%M %p"),
            details.service.name,
        ),
    )
}

/// Counts for one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub due: usize,
    pub sent: usize,
    pub failed: usize,
}

pub struct ReminderSweep {
    appointments: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl ReminderSweep {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            appointments,
            notifier,
            clock,
        }
    }

    /// Send every due reminder once. Per-appointment failures are logged and
    /// skipped; only a failed candidate query is returned as an error.
    pub async fn run_once(&self) -> Result<SweepReport, CoreError> {
        let now = self.clock.now();
        let candidates = self.appointments.reminder_candidates(now).await?;

        let mut report = SweepReport::default();
        for details in candidates {
            if !is_due(&details.appointment, now) {
                continue;
            }
            report.due += 1;
            let id = details.appointment.id;

            if let Err(e) = self
                .notifier
                .notify(&details.customer, &reminder_notice(&details))
                .await
            {
                report.failed += 1;
                tracing::warn!(appointment_id = id, error = %e, "Reminder delivery failed");
                continue;
            }

            let mut appointment = details.appointment;
            appointment.reminder_sent = true;
            match self.appointments.save(&appointment).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(appointment_id = id, error = %e, "Failed to mark reminder sent");
                }
            }
        }
        Ok(report)
    }
}
