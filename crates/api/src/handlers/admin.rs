//! Admin handlers: appointment management, dashboard and stylist views.
//!
//! Every endpoint requires [`RequireAdmin`].

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::Json;
use salon_core::appointment::AppointmentView;
use salon_core::capacity::{FleetSummary, StylistSchedule, Utilization};
use salon_core::dashboard::{DashboardRange, HistoryStats};
use salon_core::status::AppointmentStatus;
use salon_core::types::DbId;
use salon_db::models::dashboard::DashboardOverview;
use salon_db::repositories::{AppointmentRepo, DashboardRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::decode_rows;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{DateParams, RangeParams};
use crate::response::{DataResponse, StatusUpdateView};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    #[validate(length(min = 1))]
    pub status: String,
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/appointments
pub async fn list_appointments(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<AppointmentView>>>> {
    let rows = AppointmentRepo::list_all(&state.pool).await?;
    let data = decode_rows(rows)?.iter().map(AppointmentView::from).collect();
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/admin/appointments/{id}/status
///
/// Drive the lifecycle. Terminal appointments come back unchanged with
/// outcome `no_op_terminal`; side-effect failures are reported per task.
pub async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<Json<DataResponse<StatusUpdateView>>> {
    input.validate()?;
    let status = AppointmentStatus::from_str(&input.status)
        .map_err(|_| AppError::BadRequest(format!("Unknown status {:?}", input.status)))?;

    let update = state
        .lifecycle
        .update_status(&admin.context(), id, status)
        .await?;
    Ok(Json(DataResponse {
        data: StatusUpdateView::from(update),
    }))
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/dashboard/overview
pub async fn overview(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DashboardOverview>>> {
    let data = DashboardRepo::overview(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/dashboard/history?range=today|month|year
///
/// Unknown or missing ranges report the current year.
pub async fn history(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Json<DataResponse<HistoryStats>> {
    let range = DashboardRange::parse(params.range.as_deref().unwrap_or_default());
    Json(DataResponse {
        data: state.dashboard.history_stats(range).await,
    })
}

// ---------------------------------------------------------------------------
// Stylists
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/stylists/schedule?date=
pub async fn schedule(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> AppResult<Json<DataResponse<Vec<StylistSchedule>>>> {
    let data = state.schedule.schedule(params.date).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/stylists/utilization
pub async fn fleet_utilization(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<FleetSummary>>> {
    let data = state.schedule.fleet_today().await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/stylists/{id}/utilization?date=
pub async fn stylist_utilization(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<DateParams>,
) -> AppResult<Json<DataResponse<Utilization>>> {
    let data = state.schedule.stylist_utilization(id, params.date).await?;
    Ok(Json(DataResponse { data }))
}
