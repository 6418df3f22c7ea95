//! Repository for the `stylists` table.

use salon_core::types::DbId;
use sqlx::PgPool;

use crate::models::stylist::{CreateStylist, StylistRow};

/// Column list for `stylists` queries.
const COLUMNS: &str = "id, name, specialization, active, capacity";

/// Provides roster queries for stylists.
pub struct StylistRepo;

impl StylistRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<StylistRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stylists WHERE id = $1");
        sqlx::query_as::<_, StylistRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All stylists ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<StylistRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stylists ORDER BY id");
        sqlx::query_as::<_, StylistRow>(&query).fetch_all(pool).await
    }

    /// Active stylists ordered by name.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<StylistRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stylists WHERE active = true ORDER BY name");
        sqlx::query_as::<_, StylistRow>(&query).fetch_all(pool).await
    }

    pub async fn create(pool: &PgPool, input: &CreateStylist) -> Result<StylistRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO stylists (name, specialization, active, capacity) \
             VALUES ($1, $2, COALESCE($3, true), COALESCE($4, 1)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StylistRow>(&query)
            .bind(&input.name)
            .bind(&input.specialization)
            .bind(input.active)
            .bind(input.capacity)
            .fetch_one(pool)
            .await
    }
}
