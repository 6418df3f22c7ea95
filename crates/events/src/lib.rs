//! Customer notification delivery for the salon backend.
//!
//! - [`SalonNotifier`]: the production [`Notifier`](salon_core::ports::Notifier),
//!   writing an in-app notification row and, when SMTP is configured and the
//!   customer has an address, an email.
//! - [`delivery`]: external delivery channels (email).

pub mod delivery;
pub mod notifier;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use notifier::SalonNotifier;
