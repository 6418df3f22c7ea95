//! Repository for the `appointments` table.

use salon_core::appointment::{Appointment, AppointmentDraft};
use salon_core::types::{DbId, WallTime};
use sqlx::{PgExecutor, PgPool};

use crate::models::appointment::{AppointmentDetailsRow, AppointmentRow};

/// Column list for `appointments` queries.
const COLUMNS: &str = "id, service_id, user_id, stylist_id, appointment_date, start_time, \
    end_time, status, amount, payment_status, razorpay_payment_id, refund_status, refund_id, \
    reminder_sent, reminder_minutes, created_at";

/// Joined select for [`AppointmentDetailsRow`]; callers append `WHERE`/`ORDER BY`.
const DETAILS_SELECT: &str = "SELECT a.id, a.service_id, a.user_id, a.stylist_id, \
    a.appointment_date, a.start_time, a.end_time, a.status, a.amount, a.payment_status, \
    a.razorpay_payment_id, a.refund_status, a.refund_id, a.reminder_sent, a.reminder_minutes, \
    a.created_at, \
    u.name AS customer_name, u.email AS customer_email, \
    s.name AS service_name, s.category AS service_category, s.price AS service_price, \
    s.duration_minutes AS service_duration, \
    st.name AS stylist_name \
    FROM appointments a \
    JOIN users u ON u.id = a.user_id \
    JOIN services s ON s.id = a.service_id \
    LEFT JOIN stylists st ON st.id = a.stylist_id";

/// Provides booking queries and updates for appointments.
pub struct AppointmentRepo;

impl AppointmentRepo {
    /// Find an appointment with its customer, service and stylist joined.
    pub async fn find_details(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AppointmentDetailsRow>, sqlx::Error> {
        let query = format!("{DETAILS_SELECT} WHERE a.id = $1");
        sqlx::query_as::<_, AppointmentDetailsRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether any `BOOKED` appointment starts exactly at `at`.
    pub async fn exists_booked_at(pool: &PgPool, at: WallTime) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM appointments \
             WHERE appointment_date = $1 AND status = 'BOOKED')",
        )
        .bind(at)
        .fetch_one(pool)
        .await
    }

    /// Whether a `BOOKED` appointment of the stylist overlaps `[start, end)`.
    pub async fn has_overlap<'e>(
        executor: impl PgExecutor<'e>,
        stylist_id: DbId,
        start: WallTime,
        end: WallTime,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM appointments \
             WHERE stylist_id = $1 AND status = 'BOOKED' \
             AND start_time < $3 AND end_time > $2)",
        )
        .bind(stylist_id)
        .bind(start)
        .bind(end)
        .fetch_one(executor)
        .await
    }

    /// Insert a draft after re-checking the stylist interval.
    ///
    /// The check and the insert run in one transaction holding a
    /// transaction-scoped advisory lock keyed by the stylist id, so two
    /// bookings for the same stylist are serialized. Returns `None` when the
    /// interval is already taken. The `ex_appointments_stylist_overlap`
    /// exclusion constraint backs this up for writers that skip the lock.
    pub async fn insert_booked(
        pool: &PgPool,
        draft: &AppointmentDraft,
    ) -> Result<Option<AppointmentRow>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if let Some(stylist_id) = draft.stylist_id {
            sqlx::query("SELECT pg_advisory_xact_lock($1)")
                .bind(stylist_id)
                .execute(&mut *tx)
                .await?;
            if Self::has_overlap(&mut *tx, stylist_id, draft.start_time, draft.end_time).await? {
                tx.rollback().await?;
                return Ok(None);
            }
        }

        let query = format!(
            "INSERT INTO appointments \
             (service_id, user_id, stylist_id, appointment_date, start_time, end_time, \
              status, amount, payment_status, reminder_minutes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, AppointmentRow>(&query)
            .bind(draft.service_id)
            .bind(draft.user_id)
            .bind(draft.stylist_id)
            .bind(draft.appointment_date)
            .bind(draft.start_time)
            .bind(draft.end_time)
            .bind(draft.status.as_str())
            .bind(draft.amount)
            .bind(&draft.payment_status)
            .bind(draft.reminder_minutes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(row))
    }

    /// Write every mutable column. `created_at` is never touched.
    ///
    /// Returns `true` if the row exists.
    pub async fn save(pool: &PgPool, a: &Appointment) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE appointments SET \
             stylist_id = $2, appointment_date = $3, start_time = $4, end_time = $5, \
             status = $6, amount = $7, payment_status = $8, razorpay_payment_id = $9, \
             refund_status = $10, refund_id = $11, reminder_sent = $12, reminder_minutes = $13 \
             WHERE id = $1",
        )
        .bind(a.id)
        .bind(a.stylist_id)
        .bind(a.appointment_date)
        .bind(a.start_time)
        .bind(a.end_time)
        .bind(a.status.as_str())
        .bind(a.amount)
        .bind(&a.payment_status)
        .bind(&a.razorpay_payment_id)
        .bind(&a.refund_status)
        .bind(&a.refund_id)
        .bind(a.reminder_sent)
        .bind(a.reminder_minutes)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Appointments starting in `[start, end)`, ordered by start.
    pub async fn list_between(
        pool: &PgPool,
        start: WallTime,
        end: WallTime,
    ) -> Result<Vec<AppointmentDetailsRow>, sqlx::Error> {
        let query = format!(
            "{DETAILS_SELECT} \
             WHERE a.appointment_date >= $1 AND a.appointment_date < $2 \
             ORDER BY a.appointment_date"
        );
        sqlx::query_as::<_, AppointmentDetailsRow>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    /// Every appointment, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<AppointmentDetailsRow>, sqlx::Error> {
        let query = format!("{DETAILS_SELECT} ORDER BY a.appointment_date DESC");
        sqlx::query_as::<_, AppointmentDetailsRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// A customer's appointments, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<AppointmentDetailsRow>, sqlx::Error> {
        let query = format!(
            "{DETAILS_SELECT} WHERE a.user_id = $1 ORDER BY a.appointment_date DESC"
        );
        sqlx::query_as::<_, AppointmentDetailsRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// `BOOKED` appointments without a reminder that start within their own
    /// reminder lead time of `now`.
    pub async fn reminder_candidates(
        pool: &PgPool,
        now: WallTime,
    ) -> Result<Vec<AppointmentDetailsRow>, sqlx::Error> {
        let query = format!(
            "{DETAILS_SELECT} \
             WHERE a.status = 'BOOKED' AND a.reminder_sent = false \
             AND a.appointment_date <= $1::timestamp + make_interval(mins => a.reminder_minutes) \
             ORDER BY a.appointment_date"
        );
        sqlx::query_as::<_, AppointmentDetailsRow>(&query)
            .bind(now)
            .fetch_all(pool)
            .await
    }
}
