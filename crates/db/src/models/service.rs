//! Service catalog rows.

use salon_core::appointment::ServiceItem;
use salon_core::types::DbId;
use sqlx::FromRow;

/// A row from the `services` table.
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRow {
    pub id: DbId,
    pub name: String,
    pub category: Option<String>,
    pub price: Option<String>,
    pub duration_minutes: i32,
}

impl From<ServiceRow> for ServiceItem {
    fn from(row: ServiceRow) -> Self {
        ServiceItem {
            id: row.id,
            name: row.name,
            category: row.category,
            price: row.price,
            duration_minutes: row.duration_minutes,
        }
    }
}
