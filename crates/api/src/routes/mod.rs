pub mod admin;
pub mod appointments;
pub mod health;
pub mod notifications;
pub mod payments;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{catalog, waitlist};
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /appointments                                    book (POST)
/// /appointments/mine                               own appointments
/// /appointments/booked-slots                       availability grid (public)
/// /appointments/history/mine                       own history
/// /appointments/{id}                               view (owner or admin)
/// /appointments/{id}/timeline                      timeline (owner or admin)
///
/// /waitlist                                        join (POST)
/// /stylists                                        list active (public), add (admin)
/// /services                                        catalog (public)
/// /notifications                                   own in-app notifications
///
/// /payments/orders                                 create gateway order (POST)
/// /payments/verify                                 verify and settle (POST)
///
/// /admin/appointments                              all appointments
/// /admin/appointments/{id}/status                  lifecycle update (PUT)
/// /admin/dashboard/overview                        counters
/// /admin/dashboard/history                         history report
/// /admin/stylists/schedule                         per-stylist schedule
/// /admin/stylists/utilization                      fleet summary for today
/// /admin/stylists/{id}/utilization                 one stylist for a day
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/appointments", appointments::router())
        .route("/waitlist", post(waitlist::join))
        .route(
            "/stylists",
            get(catalog::list_stylists).post(catalog::create_stylist),
        )
        .route("/services", get(catalog::list_services))
        .nest("/notifications", notifications::router())
        .nest("/payments", payments::router())
        .nest("/admin", admin::router())
}
