//! Repository for the `services` table.

use salon_core::types::DbId;
use sqlx::PgPool;

use crate::models::service::ServiceRow;

/// Column list for `services` queries.
const COLUMNS: &str = "id, name, category, price, duration_minutes";

pub struct ServiceRepo;

impl ServiceRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ServiceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM services WHERE id = $1");
        sqlx::query_as::<_, ServiceRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<ServiceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM services ORDER BY category, name");
        sqlx::query_as::<_, ServiceRow>(&query).fetch_all(pool).await
    }
}
