//! Ranged aggregations over `appointment_history` for the dashboard.
//!
//! Windows are inclusive on both ends.

use salon_core::types::WallTime;
use sqlx::PgPool;

use crate::models::dashboard::HistoryRecord;

pub struct HistoryRepo;

impl HistoryRepo {
    pub async fn count_with_status(
        pool: &PgPool,
        status: &str,
        start: WallTime,
        end: WallTime,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointment_history \
             WHERE status = $1 AND changed_at BETWEEN $2 AND $3",
        )
        .bind(status)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await
    }

    /// Sum of amounts over `COMPLETED` history rows whose appointment is
    /// still `COMPLETED`.
    pub async fn completed_revenue(
        pool: &PgPool,
        start: WallTime,
        end: WallTime,
    ) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT SUM(a.amount) FROM appointment_history h \
             JOIN appointments a ON a.id = h.appointment_id \
             WHERE h.status = 'COMPLETED' AND a.status = 'COMPLETED' \
             AND h.changed_at BETWEEN $1 AND $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await
    }

    pub async fn top_service(
        pool: &PgPool,
        status: &str,
        start: WallTime,
        end: WallTime,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT s.name FROM appointment_history h \
             JOIN appointments a ON a.id = h.appointment_id \
             JOIN services s ON s.id = a.service_id \
             WHERE h.status = $1 AND h.changed_at BETWEEN $2 AND $3 \
             GROUP BY s.name ORDER BY COUNT(*) DESC LIMIT 1",
        )
        .bind(status)
        .bind(start)
        .bind(end)
        .fetch_optional(pool)
        .await
    }

    pub async fn top_customer(
        pool: &PgPool,
        status: &str,
        start: WallTime,
        end: WallTime,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT u.name FROM appointment_history h \
             JOIN appointments a ON a.id = h.appointment_id \
             JOIN users u ON u.id = a.user_id \
             WHERE h.status = $1 AND h.changed_at BETWEEN $2 AND $3 \
             GROUP BY u.name ORDER BY COUNT(*) DESC LIMIT 1",
        )
        .bind(status)
        .bind(start)
        .bind(end)
        .fetch_optional(pool)
        .await
    }

    pub async fn rows_with_statuses(
        pool: &PgPool,
        statuses: &[String],
        start: WallTime,
        end: WallTime,
    ) -> Result<Vec<HistoryRecord>, sqlx::Error> {
        sqlx::query_as::<_, HistoryRecord>(
            "SELECT h.appointment_id, h.status, h.changed_at, a.appointment_date, a.amount, \
             s.name AS service_name, u.name AS customer_name \
             FROM appointment_history h \
             JOIN appointments a ON a.id = h.appointment_id \
             LEFT JOIN services s ON s.id = a.service_id \
             LEFT JOIN users u ON u.id = a.user_id \
             WHERE h.status = ANY($1) AND h.changed_at BETWEEN $2 AND $3 \
             ORDER BY h.changed_at DESC",
        )
        .bind(statuses)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }
}
