//! In-app notification rows.

use salon_core::types::{DbId, WallTime};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub message: String,
    pub read_status: bool,
    pub created_at: WallTime,
}
