//! User rows: identity, contact and the wallet/loyalty balances.

use salon_core::appointment::CustomerRef;
use salon_core::types::{DbId, WallTime};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub role: String,
    pub wallet_balance: f64,
    pub loyalty_points: i32,
    pub created_at: WallTime,
}

impl From<&User> for CustomerRef {
    fn from(user: &User) -> Self {
        CustomerRef {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}
