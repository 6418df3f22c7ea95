//! Repository for the `users` table.

use salon_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::User;

/// Column list for `users` queries.
const COLUMNS: &str = "id, name, email, role, wallet_balance, loyalty_points, created_at";

pub struct UserRepo;

impl UserRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Add cashback and loyalty points in one statement, returning the new
    /// balances, or `None` if the user does not exist.
    pub async fn credit_rewards(
        pool: &PgPool,
        id: DbId,
        cashback: f64,
        points: i32,
    ) -> Result<Option<(f64, i32)>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE users SET \
             wallet_balance = wallet_balance + $2, \
             loyalty_points = loyalty_points + $3 \
             WHERE id = $1 \
             RETURNING wallet_balance, loyalty_points",
        )
        .bind(id)
        .bind(cashback)
        .bind(points)
        .fetch_optional(pool)
        .await
    }
}
