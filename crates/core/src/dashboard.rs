//! Ranged reporting over appointment history.
//!
//! Every statistic is computed by its own query; a failing query degrades
//! to its neutral value ("—", 0, empty list) instead of failing the report.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::appointment::NOT_AVAILABLE;
use crate::ports::{Clock, HistoryQueries};
use crate::status::{AppointmentStatus, FINALIZED_STATUSES};
use crate::types::{DbId, WallTime};

/// Placeholder for a top-N name that could not be determined.
pub const NO_NAME: &str = "—";

/// Reporting window selected on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardRange {
    Today,
    Month,
    Year,
}

impl DashboardRange {
    /// Case-insensitive; anything other than `TODAY` or `MONTH` is `YEAR`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "TODAY" => Self::Today,
            "MONTH" => Self::Month,
            _ => Self::Year,
        }
    }

    /// `[start of range, now]`.
    pub fn window(self, now: WallTime) -> TimeWindow {
        let today = now.date();
        let first_day = match self {
            Self::Today => today,
            Self::Month => today.with_day(1).unwrap_or(today),
            Self::Year => NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
        };
        TimeWindow {
            start: first_day.and_time(NaiveTime::MIN),
            end: now,
        }
    }
}

/// Inclusive time window for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: WallTime,
    pub end: WallTime,
}

impl TimeWindow {
    pub fn contains(&self, at: WallTime) -> bool {
        at >= self.start && at <= self.end
    }
}

/// A history row joined with its appointment, as read by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub appointment_id: DbId,
    pub status: AppointmentStatus,
    pub changed_at: Option<WallTime>,
    pub appointment_date: Option<WallTime>,
    pub amount: Option<f64>,
    pub service_name: Option<String>,
    pub customer_name: Option<String>,
}

/// One line of the dashboard history list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryItem {
    pub appointment_id: DbId,
    pub service_name: String,
    pub customer_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: AppointmentStatus,
    pub amount: Option<f64>,
    pub changed_at: Option<String>,
}

impl From<HistoryRow> for HistoryItem {
    fn from(row: HistoryRow) -> Self {
        let (date, time) = match row.appointment_date {
            Some(at) => (
                at.format("%Y-%m-%d").to_string(),
                at.format("%H:%M").to_string(),
            ),
            None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
        };
        Self {
            appointment_id: row.appointment_id,
            service_name: row.service_name.unwrap_or_else(|| NOT_AVAILABLE.into()),
            customer_name: row.customer_name.unwrap_or_else(|| NOT_AVAILABLE.into()),
            appointment_date: date,
            appointment_time: time,
            status: row.status,
            amount: row.amount,
            changed_at: row
                .changed_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

/// Dashboard history report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total_completed: i64,
    pub total_revenue: f64,
    pub top_service: String,
    pub top_customer: String,
    pub items: Vec<HistoryItem>,
}

pub struct DashboardAggregator {
    history: Arc<dyn HistoryQueries>,
    clock: Arc<dyn Clock>,
}

impl DashboardAggregator {
    pub fn new(history: Arc<dyn HistoryQueries>, clock: Arc<dyn Clock>) -> Self {
        Self { history, clock }
    }

    /// Build the history report for `range`.
    pub async fn history_stats(&self, range: DashboardRange) -> HistoryStats {
        let window = range.window(self.clock.now());
        let completed = AppointmentStatus::Completed;

        let total_completed = match self.history.count_with_status(completed, &window).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "Dashboard completed count failed");
                0
            }
        };

        let total_revenue = match self.history.completed_revenue(&window).await {
            Ok(sum) => sum.unwrap_or(0.0),
            Err(e) => {
                tracing::warn!(error = %e, "Dashboard revenue failed");
                0.0
            }
        };

        let top_service = match self.history.top_service(completed, &window).await {
            Ok(name) => name.unwrap_or_else(|| NO_NAME.into()),
            Err(e) => {
                tracing::warn!(error = %e, "Dashboard top service failed");
                NO_NAME.into()
            }
        };

        let top_customer = match self.history.top_customer(completed, &window).await {
            Ok(name) => name.unwrap_or_else(|| NO_NAME.into()),
            Err(e) => {
                tracing::warn!(error = %e, "Dashboard top customer failed");
                NO_NAME.into()
            }
        };

        let items = match self
            .history
            .rows_with_statuses(&FINALIZED_STATUSES, &window)
            .await
        {
            Ok(mut rows) => {
                // Stable; rows without a timestamp sink to the end.
                rows.sort_by_key(|r| Reverse(r.changed_at));
                rows.into_iter().map(HistoryItem::from).collect()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dashboard history items failed");
                Vec::new()
            }
        };

        HistoryStats {
            total_completed,
            total_revenue,
            top_service,
            top_customer,
            items,
        }
    }
}

/// Most frequent name; ties resolve to any of the maximal names.
pub fn most_frequent<'a, I>(names: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|(_, n)| *n)
        .map(|(name, _)| name.to_string())
}
