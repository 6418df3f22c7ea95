//! Handlers for `/stylists` and `/services`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use salon_core::appointment::ServiceItem;
use salon_core::capacity::Stylist;
use salon_db::models::stylist::CreateStylist;
use salon_db::repositories::{ServiceRepo, StylistRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStylistRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub specialization: Option<String>,
    pub active: Option<bool>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
}

/// GET /api/v1/stylists -- active stylists only.
pub async fn list_stylists(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Stylist>>>> {
    let data = StylistRepo::list_active(&state.pool)
        .await?
        .into_iter()
        .map(Stylist::from)
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/stylists
pub async fn create_stylist(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateStylistRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Stylist>>)> {
    input.validate()?;
    let row = StylistRepo::create(
        &state.pool,
        &CreateStylist {
            name: input.name.trim().to_string(),
            specialization: input.specialization,
            active: input.active,
            capacity: input.capacity,
        },
    )
    .await?;

    tracing::info!(stylist_id = row.id, admin_id = admin.user_id, "Stylist added");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: Stylist::from(row),
        }),
    ))
}

/// GET /api/v1/services
pub async fn list_services(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ServiceItem>>>> {
    let data = ServiceRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(ServiceItem::from)
        .collect();
    Ok(Json(DataResponse { data }))
}
