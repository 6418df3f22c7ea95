//! Repository for the append-only `appointment_history` and
//! `appointment_timeline` tables.

use salon_core::types::{DbId, WallTime};
use sqlx::PgPool;

use crate::models::appointment::TimelineEntry;
use crate::models::dashboard::HistoryRecord;

pub struct AuditRepo;

impl AuditRepo {
    pub async fn append_history(
        pool: &PgPool,
        appointment_id: DbId,
        status: &str,
        changed_at: WallTime,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO appointment_history (appointment_id, status, changed_at) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(appointment_id)
        .bind(status)
        .bind(changed_at)
        .fetch_one(pool)
        .await
    }

    pub async fn append_timeline(
        pool: &PgPool,
        appointment_id: DbId,
        status: &str,
        at: WallTime,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO appointment_timeline (appointment_id, status, created_at) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(appointment_id)
        .bind(status)
        .bind(at)
        .fetch_one(pool)
        .await
    }

    /// Timeline of one appointment in insertion order.
    pub async fn timeline_for(
        pool: &PgPool,
        appointment_id: DbId,
    ) -> Result<Vec<TimelineEntry>, sqlx::Error> {
        sqlx::query_as::<_, TimelineEntry>(
            "SELECT id, appointment_id, status, created_at FROM appointment_timeline \
             WHERE appointment_id = $1 ORDER BY created_at, id",
        )
        .bind(appointment_id)
        .fetch_all(pool)
        .await
    }

    /// History rows of a customer's appointments, newest first.
    pub async fn history_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<HistoryRecord>, sqlx::Error> {
        sqlx::query_as::<_, HistoryRecord>(
            "SELECT h.appointment_id, h.status, h.changed_at, a.appointment_date, a.amount, \
             s.name AS service_name, u.name AS customer_name \
             FROM appointment_history h \
             JOIN appointments a ON a.id = h.appointment_id \
             LEFT JOIN services s ON s.id = a.service_id \
             LEFT JOIN users u ON u.id = a.user_id \
             WHERE a.user_id = $1 \
             ORDER BY h.changed_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
