//! Waitlist release: tell waiting customers that their slot opened up.

use std::sync::Arc;

use serde::Serialize;

use crate::appointment::AppointmentDetails;
use crate::ports::{Notice, Notifier, StoreError, WaitlistStore};
use crate::types::WallTime;

/// Result of one release pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseSummary {
    pub matched: usize,
    pub notified: usize,
    pub failed: usize,
}

/// `HH:MM` key waitlist entries are matched on.
pub fn time_key(at: WallTime) -> String {
    at.format("%H:%M").to_string()
}

/// Message sent to a waiting customer.
pub fn slot_opened_notice(stylist_name: &str, at: WallTime, preferred_time: &str) -> Notice {
    Notice::new(
        "A slot just opened up",
        format!(
            "Good news! A slot with {stylist_name} on {} at {preferred_time} has just opened up. Book it now!",
            at.date().format("%Y-%m-%d"),
        ),
    )
}

pub struct WaitlistRelease {
    waitlist: Arc<dyn WaitlistStore>,
    notifier: Arc<dyn Notifier>,
}

impl WaitlistRelease {
    pub fn new(waitlist: Arc<dyn WaitlistStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { waitlist, notifier }
    }

    /// Notify every pending entry matching the appointment's stylist, day and
    /// start time, marking each notified. Failures on one entry do not stop
    /// the rest; only a failed lookup is returned as an error.
    pub async fn release(&self, details: &AppointmentDetails) -> Result<ReleaseSummary, StoreError> {
        let Some(stylist) = details.stylist.as_ref() else {
            return Ok(ReleaseSummary::default());
        };
        let at = details.appointment.appointment_date;
        let key = time_key(at);

        let entries = self
            .waitlist
            .pending_for_slot(stylist.id, at.date(), &key)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    appointment_id = details.appointment.id,
                    error = %e,
                    "Waitlist lookup failed",
                );
            })?;

        let mut summary = ReleaseSummary {
            matched: entries.len(),
            ..Default::default()
        };

        for entry in entries {
            let notice = slot_opened_notice(&stylist.name, at, &entry.preferred_time);
            let result = match self.notifier.notify(&entry.customer, &notice).await {
                Ok(()) => self
                    .waitlist
                    .mark_notified(entry.entry_id)
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            match result {
                Ok(()) => summary.notified += 1,
                Err(error) => {
                    summary.failed += 1;
                    tracing::warn!(entry_id = entry.entry_id, %error, "Waitlist notification failed");
                }
            }
        }

        if summary.matched > 0 {
            tracing::info!(
                appointment_id = details.appointment.id,
                stylist_id = stylist.id,
                notified = summary.notified,
                failed = summary.failed,
                "Waitlist released",
            );
        }
        Ok(summary)
    }
}
