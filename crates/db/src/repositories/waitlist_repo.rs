//! Repository for the `waitlist_entries` table.

use chrono::NaiveDate;
use salon_core::types::DbId;
use sqlx::PgPool;

use crate::models::waitlist::{CreateWaitlistEntry, WaitlistEntry, WaitlistMatchRow};

/// Column list for `waitlist_entries` queries.
const COLUMNS: &str =
    "id, user_id, service_id, stylist_id, preferred_date, preferred_time, notified, created_at";

pub struct WaitlistRepo;

impl WaitlistRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateWaitlistEntry,
    ) -> Result<WaitlistEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO waitlist_entries \
             (user_id, service_id, stylist_id, preferred_date, preferred_time) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WaitlistEntry>(&query)
            .bind(input.user_id)
            .bind(input.service_id)
            .bind(input.stylist_id)
            .bind(input.preferred_date)
            .bind(&input.preferred_time)
            .fetch_one(pool)
            .await
    }

    /// Not-yet-notified entries for one stylist, day and `HH:MM`, oldest first.
    pub async fn pending_for_slot(
        pool: &PgPool,
        stylist_id: DbId,
        day: NaiveDate,
        time_key: &str,
    ) -> Result<Vec<WaitlistMatchRow>, sqlx::Error> {
        sqlx::query_as::<_, WaitlistMatchRow>(
            "SELECT w.id, w.user_id, w.preferred_time, \
             u.name AS customer_name, u.email AS customer_email \
             FROM waitlist_entries w \
             JOIN users u ON u.id = w.user_id \
             WHERE w.stylist_id = $1 AND w.preferred_date = $2 \
             AND w.preferred_time = $3 AND w.notified = false \
             ORDER BY w.created_at",
        )
        .bind(stylist_id)
        .bind(day)
        .bind(time_key)
        .fetch_all(pool)
        .await
    }

    pub async fn mark_notified(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE waitlist_entries SET notified = true WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
