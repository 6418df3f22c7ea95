//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!({ "data": ... })`.

use salon_core::appointment::AppointmentView;
use salon_core::lifecycle::{StatusUpdate, TaskReport, UpdateOutcome};
use salon_core::status::AppointmentStatus;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Body returned for a lifecycle status change.
#[derive(Debug, Serialize)]
pub struct StatusUpdateView {
    pub appointment: AppointmentView,
    pub previous: AppointmentStatus,
    pub requested: AppointmentStatus,
    pub outcome: UpdateOutcome,
    pub tasks: Vec<TaskReport>,
}

impl From<StatusUpdate> for StatusUpdateView {
    fn from(update: StatusUpdate) -> Self {
        Self {
            appointment: AppointmentView::from(&update.details),
            previous: update.previous,
            requested: update.requested,
            outcome: update.outcome,
            tasks: update.tasks,
        }
    }
}
