//! Salon-wide counters for the admin dashboard.

use sqlx::PgPool;

use crate::models::dashboard::DashboardOverview;

pub struct DashboardRepo;

impl DashboardRepo {
    pub async fn overview(pool: &PgPool) -> Result<DashboardOverview, sqlx::Error> {
        let (users, appointments, pending, completed): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT \
             (SELECT COUNT(*) FROM users), \
             (SELECT COUNT(*) FROM appointments), \
             (SELECT COUNT(*) FROM appointments WHERE status = 'BOOKED'), \
             (SELECT COUNT(*) FROM appointments WHERE status = 'COMPLETED')",
        )
        .fetch_one(pool)
        .await?;
        Ok(DashboardOverview {
            users,
            appointments,
            pending,
            completed,
        })
    }
}
