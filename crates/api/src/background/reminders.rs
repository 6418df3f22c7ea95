//! Periodic appointment reminder sweep.

use std::sync::Arc;
use std::time::Duration;

use salon_core::reminders::ReminderSweep;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Run the reminder sweep every `every` until `cancel` is triggered.
pub async fn run(sweep: Arc<ReminderSweep>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Reminder job started");

    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reminder job stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep.run_once().await {
                    Ok(report) if report.due > 0 => {
                        tracing::info!(
                            due = report.due,
                            sent = report.sent,
                            failed = report.failed,
                            "Reminder sweep finished",
                        );
                    }
                    Ok(_) => tracing::debug!("Reminder sweep: nothing due"),
                    Err(e) => tracing::error!(error = %e, "Reminder sweep failed"),
                }
            }
        }
    }
}
