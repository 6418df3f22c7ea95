//! Stylist rows and DTOs.

use salon_core::capacity::Stylist;
use salon_core::types::DbId;
use serde::Deserialize;
use sqlx::FromRow;

/// A row from the `stylists` table.
#[derive(Debug, Clone, FromRow)]
pub struct StylistRow {
    pub id: DbId,
    pub name: String,
    pub specialization: Option<String>,
    pub active: bool,
    pub capacity: i32,
}

impl From<StylistRow> for Stylist {
    fn from(row: StylistRow) -> Self {
        Stylist {
            id: row.id,
            name: row.name,
            specialization: row.specialization,
            active: row.active,
            capacity: row.capacity,
        }
    }
}

/// DTO for adding a stylist. `active` defaults to true, `capacity` to 1.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStylist {
    pub name: String,
    pub specialization: Option<String>,
    pub active: Option<bool>,
    pub capacity: Option<i32>,
}
