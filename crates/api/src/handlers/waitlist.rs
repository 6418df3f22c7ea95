//! Handlers for the `/waitlist` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use salon_core::types::DbId;
use salon_db::models::waitlist::{CreateWaitlistEntry, WaitlistEntry};
use salon_db::repositories::WaitlistRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::parse_clock_time;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct JoinWaitlistRequest {
    pub service_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub stylist_id: DbId,
    pub preferred_date: NaiveDate,
    /// `HH:MM`, matched against the start time of released slots.
    #[validate(length(min = 4, max = 8))]
    pub preferred_time: String,
}

/// POST /api/v1/waitlist
///
/// Queue the caller for a stylist, day and start time.
pub async fn join(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<JoinWaitlistRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<WaitlistEntry>>)> {
    input.validate()?;
    // Stored in canonical `HH:MM` form so release matching is exact.
    let preferred_time = parse_clock_time(&input.preferred_time)?
        .format("%H:%M")
        .to_string();

    let entry = WaitlistRepo::create(
        &state.pool,
        &CreateWaitlistEntry {
            user_id: auth.user_id,
            service_id: input.service_id,
            stylist_id: input.stylist_id,
            preferred_date: input.preferred_date,
            preferred_time,
        },
    )
    .await?;

    tracing::info!(
        entry_id = entry.id,
        user_id = auth.user_id,
        stylist_id = entry.stylist_id,
        "Joined waitlist",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}
