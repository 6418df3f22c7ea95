use axum::routing::post;
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Routes mounted at `/payments`.
///
/// ```text
/// POST   /orders              -> create_order
/// POST   /verify              -> verify
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(payments::create_order))
        .route("/verify", post(payments::verify))
}
