//! Handlers for the `/notifications` resource.

use axum::extract::{Query, State};
use axum::Json;
use salon_db::models::notification::Notification;
use salon_db::repositories::NotificationRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/notifications
///
/// The caller's in-app notifications, newest first.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let (limit, offset) = params.clamped();
    let data = NotificationRepo::list_for_user(&state.pool, auth.user_id, limit, offset).await?;
    Ok(Json(DataResponse { data }))
}
