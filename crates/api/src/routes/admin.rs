//! Route definitions for `/admin`. All endpoints require the admin role.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /appointments                  -> list_appointments
/// PUT    /appointments/{id}/status      -> update_status
/// GET    /dashboard/overview            -> overview
/// GET    /dashboard/history             -> history
/// GET    /stylists/schedule             -> schedule
/// GET    /stylists/utilization          -> fleet_utilization
/// GET    /stylists/{id}/utilization     -> stylist_utilization
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(admin::list_appointments))
        .route("/appointments/{id}/status", put(admin::update_status))
        .route("/dashboard/overview", get(admin::overview))
        .route("/dashboard/history", get(admin::history))
        .route("/stylists/schedule", get(admin::schedule))
        .route("/stylists/utilization", get(admin::fleet_utilization))
        .route("/stylists/{id}/utilization", get(admin::stylist_utilization))
}
