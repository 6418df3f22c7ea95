//! Route definitions for the `/appointments` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::appointments;
use crate::state::AppState;

/// Routes mounted at `/appointments`.
///
/// ```text
/// POST   /                    -> book
/// GET    /mine                -> list_mine
/// GET    /booked-slots        -> booked_slots (public)
/// GET    /history/mine        -> my_history
/// GET    /{id}                -> get_appointment
/// GET    /{id}/timeline       -> timeline
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(appointments::book))
        .route("/mine", get(appointments::list_mine))
        .route("/booked-slots", get(appointments::booked_slots))
        .route("/history/mine", get(appointments::my_history))
        .route("/{id}", get(appointments::get_appointment))
        .route("/{id}/timeline", get(appointments::timeline))
}
