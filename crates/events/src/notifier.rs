//! The production customer notifier.

use async_trait::async_trait;
use salon_core::appointment::CustomerRef;
use salon_core::ports::{Notice, NotifyError, Notifier};
use salon_db::repositories::NotificationRepo;
use sqlx::PgPool;

use crate::delivery::email::EmailDelivery;

/// Stores every notice as an in-app notification and mirrors it by email
/// when a mailer is configured and the customer has an address.
///
/// Both channels are attempted; the first failure is returned.
pub struct SalonNotifier {
    pool: PgPool,
    email: Option<EmailDelivery>,
}

impl SalonNotifier {
    pub fn new(pool: PgPool, email: Option<EmailDelivery>) -> Self {
        Self { pool, email }
    }

    pub fn email_enabled(&self) -> bool {
        self.email.is_some()
    }
}

/// In-app text for a notice. Subject lines are only used by email.
pub fn in_app_message(notice: &Notice) -> &str {
    &notice.body
}

#[async_trait]
impl Notifier for SalonNotifier {
    async fn notify(&self, recipient: &CustomerRef, notice: &Notice) -> Result<(), NotifyError> {
        let stored = NotificationRepo::create(&self.pool, recipient.id, in_app_message(notice))
            .await
            .map_err(|e| NotifyError::Store(e.to_string()));
        if let Err(e) = &stored {
            tracing::warn!(user_id = recipient.id, error = %e, "In-app notification not stored");
        }

        let emailed = match (&self.email, recipient.email.as_deref()) {
            (Some(mailer), Some(to)) => mailer
                .deliver(to, notice)
                .await
                .map_err(|e| NotifyError::Email(e.to_string())),
            _ => Ok(()),
        };
        if let Err(e) = &emailed {
            tracing::warn!(user_id = recipient.id, error = %e, "Notification email failed");
        }

        stored.map(|_| ())?;
        emailed
    }
}
