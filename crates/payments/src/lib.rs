//! Razorpay payment gateway integration.
//!
//! - [`RazorpayClient`]: the production [`PaymentProvider`](salon_core::ports::PaymentProvider)
//!   (orders and refunds over the REST API).
//! - [`UnconfiguredPayments`]: stand-in used when no keys are set; every
//!   call fails with `PaymentError::NotConfigured`.
//! - [`signature`]: checkout signature verification.

pub mod client;
pub mod config;
pub mod signature;

pub use client::{RazorpayClient, UnconfiguredPayments};
pub use config::RazorpayConfig;
pub use signature::verify_signature;
