//! Handlers for the `/payments` resource.
//!
//! Checkout runs in two steps: the client creates a gateway order, pays in
//! the gateway widget, then posts the signed result to `/payments/verify`.

use axum::extract::State;
use axum::Json;
use salon_core::ports::PaymentError;
use salon_core::types::DbId;
use salon_payments::verify_signature;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, StatusUpdateView};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    /// Amount in paise.
    #[validate(range(min = 1))]
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    /// Public key the checkout widget needs.
    pub key_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyPaymentRequest {
    #[validate(length(min = 1))]
    pub razorpay_order_id: String,
    #[validate(length(min = 1))]
    pub razorpay_payment_id: String,
    #[validate(length(min = 1))]
    pub razorpay_signature: String,
    #[serde(default)]
    pub appointment_ids: Vec<DbId>,
    /// Single-appointment form; merged with `appointment_ids`.
    pub appointment_id: Option<DbId>,
}

impl VerifyPaymentRequest {
    /// Every appointment id in the request, deduplicated, in order.
    pub fn target_ids(&self) -> Vec<DbId> {
        let mut ids = Vec::with_capacity(self.appointment_ids.len() + 1);
        for id in self.appointment_ids.iter().copied().chain(self.appointment_id) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

/// POST /api/v1/payments/orders
pub async fn create_order(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateOrderRequest>,
) -> AppResult<Json<DataResponse<OrderResponse>>> {
    input.validate()?;
    let order = state.payments.create_order(input.amount).await?;
    tracing::info!(user_id = auth.user_id, order_id = %order.id, "Checkout order created");

    Ok(Json(DataResponse {
        data: OrderResponse {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id: state.config.payments.as_ref().map(|p| p.key_id.clone()),
        },
    }))
}

/// POST /api/v1/payments/verify
///
/// Check the checkout signature, then record the payment on each listed
/// appointment and complete it through the lifecycle.
pub async fn verify(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<VerifyPaymentRequest>,
) -> AppResult<Json<DataResponse<Vec<StatusUpdateView>>>> {
    input.validate()?;
    let ids = input.target_ids();
    if ids.is_empty() {
        return Err(AppError::BadRequest("No appointment ids supplied".into()));
    }

    let secret = state
        .config
        .payments
        .as_ref()
        .map(|p| p.key_secret.as_str())
        .ok_or_else(|| PaymentError::NotConfigured("missing key secret".into()))?;

    if !verify_signature(
        &input.razorpay_order_id,
        &input.razorpay_payment_id,
        &input.razorpay_signature,
        secret,
    ) {
        tracing::warn!(
            user_id = auth.user_id,
            order_id = %input.razorpay_order_id,
            "Payment signature mismatch",
        );
        return Err(AppError::BadRequest(
            "Payment verification failed: Signature mismatch.".into(),
        ));
    }

    let ctx = auth.context();
    let updates = state
        .lifecycle
        .settle_payments(&ctx, &ids, &input.razorpay_payment_id)
        .await?;
    let data = updates.into_iter().map(StatusUpdateView::from).collect();
    Ok(Json(DataResponse { data }))
}
