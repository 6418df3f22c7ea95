//! Handlers for the `/appointments` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use salon_core::appointment::{AppointmentDetails, AppointmentView};
use salon_core::booking::BookAppointment;
use salon_core::dashboard::HistoryItem;
use salon_core::error::CoreError;
use salon_core::types::DbId;
use salon_db::models::appointment::TimelineEntry;
use salon_db::repositories::{AppointmentRepo, AuditRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::{decode_rows, parse_clock_time};
use crate::middleware::auth::AuthUser;
use crate::query::BookedSlotsParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct BookRequest {
    #[validate(range(min = 1))]
    pub service_id: DbId,
    /// Admins may book on behalf of a customer.
    pub user_id: Option<DbId>,
    pub stylist_id: Option<DbId>,
    pub date: NaiveDate,
    /// `HH:MM`.
    #[validate(length(min = 4, max = 8))]
    pub time: String,
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
}

/// Load one appointment the caller may see.
async fn load_visible(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
) -> AppResult<AppointmentDetails> {
    let row = AppointmentRepo::find_details(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "appointment",
            id,
        })?;
    let details = salon_db::store::decode_details(row)?;
    auth.context()
        .ensure_owner_or_admin(details.appointment.user_id)?;
    Ok(details)
}

/// POST /api/v1/appointments
pub async fn book(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<BookRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AppointmentView>>)> {
    input.validate()?;
    let request = BookAppointment {
        service_id: input.service_id,
        user_id: input.user_id,
        stylist_id: input.stylist_id,
        date: input.date,
        time: parse_clock_time(&input.time)?,
        amount: input.amount,
    };

    let booked = state.booking.book(&auth.context(), request).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: AppointmentView::from(&booked),
        }),
    ))
}

/// GET /api/v1/appointments/mine
pub async fn list_mine(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<AppointmentView>>>> {
    let rows = AppointmentRepo::list_for_user(&state.pool, auth.user_id).await?;
    let data = decode_rows(rows)?.iter().map(AppointmentView::from).collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/appointments/{id}
pub async fn get_appointment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AppointmentView>>> {
    let details = load_visible(&state, &auth, id).await?;
    Ok(Json(DataResponse {
        data: AppointmentView::from(&details),
    }))
}

/// GET /api/v1/appointments/{id}/timeline
pub async fn timeline(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TimelineEntry>>>> {
    load_visible(&state, &auth, id).await?;
    let data = AuditRepo::timeline_for(&state.pool, id).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/appointments/booked-slots?date=&stylist_id=
///
/// Public: blocked `HH:MM` slot labels for the day.
pub async fn booked_slots(
    State(state): State<AppState>,
    Query(params): Query<BookedSlotsParams>,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let data = state
        .booking
        .booked_slots(params.date, params.stylist_id)
        .await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/appointments/history/mine
pub async fn my_history(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<HistoryItem>>>> {
    let records = AuditRepo::history_for_user(&state.pool, auth.user_id).await?;
    let data = records
        .into_iter()
        .map(|r| salon_db::store::decode_history(r).map(HistoryItem::from))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(DataResponse { data }))
}
