//! REST client for orders and refunds.

use std::time::Duration;

use async_trait::async_trait;
use salon_core::ports::{Order, PaymentError, PaymentProvider, Refund};
use serde::Deserialize;

use crate::config::RazorpayConfig;

/// Orders are always taken in rupees.
const CURRENCY: &str = "INR";

/// HTTP timeout for a single gateway call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OrderBody {
    id: String,
    amount: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct RefundBody {
    id: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    description: Option<String>,
    code: Option<String>,
}

/// Best human-readable message from a gateway error body.
fn gateway_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => error
            .description
            .or(error.code)
            .unwrap_or_else(|| "unknown gateway error".to_string()),
        Err(_) if body.trim().is_empty() => "empty response".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

fn transport(err: reqwest::Error) -> PaymentError {
    PaymentError::Transport(err.to_string())
}

// ---------------------------------------------------------------------------
// RazorpayClient
// ---------------------------------------------------------------------------

pub struct RazorpayClient {
    config: RazorpayConfig,
    http: reqwest::Client,
}

impl RazorpayClient {
    pub fn new(config: RazorpayConfig) -> Result<Self, PaymentError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(transport)?;
        Ok(Self { config, http })
    }

    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    /// POST a JSON body with basic auth and decode a 2xx response.
    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, PaymentError> {
        let url = format!("{}{path}", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                message: gateway_message(&text),
            });
        }
        response.json::<T>().await.map_err(transport)
    }
}

#[async_trait]
impl PaymentProvider for RazorpayClient {
    async fn create_order(&self, amount_minor: i64) -> Result<Order, PaymentError> {
        if amount_minor <= 0 {
            return Err(PaymentError::InvalidRequest("Invalid amount".into()));
        }
        let receipt = format!("rcpt_{}", chrono::Utc::now().timestamp_millis());
        let body = serde_json::json!({
            "amount": amount_minor,
            "currency": CURRENCY,
            "receipt": receipt,
        });

        let order: OrderBody = self.post("/v1/orders", &body).await?;
        tracing::info!(order_id = %order.id, amount = order.amount, "Gateway order created");
        Ok(Order {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
        })
    }

    async fn refund(&self, payment_id: &str) -> Result<Refund, PaymentError> {
        let payment_id = payment_id.trim();
        if payment_id.is_empty() {
            return Err(PaymentError::InvalidRequest("Missing payment id".into()));
        }

        let refund: RefundBody = self
            .post(
                &format!("/v1/payments/{payment_id}/refund"),
                &serde_json::json!({}),
            )
            .await?;
        tracing::info!(
            payment_id,
            refund_id = refund.id.as_deref().unwrap_or(""),
            refund_status = refund.status.as_deref().unwrap_or(""),
            "Gateway refund requested",
        );
        Ok(Refund {
            id: refund.id,
            status: refund.status,
        })
    }
}

// ---------------------------------------------------------------------------
// UnconfiguredPayments
// ---------------------------------------------------------------------------

/// Provider used when no gateway keys are set.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredPayments;

const MISSING_KEYS: &str = "RAZORPAY_KEY_ID and RAZORPAY_KEY_SECRET must be set";

#[async_trait]
impl PaymentProvider for UnconfiguredPayments {
    async fn create_order(&self, _amount_minor: i64) -> Result<Order, PaymentError> {
        Err(PaymentError::NotConfigured(MISSING_KEYS.into()))
    }

    async fn refund(&self, _payment_id: &str) -> Result<Refund, PaymentError> {
        Err(PaymentError::NotConfigured(MISSING_KEYS.into()))
    }
}
