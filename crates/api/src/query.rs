//! Shared query parameter types for API handlers.

use chrono::NaiveDate;
use salon_core::types::DbId;
use serde::Deserialize;

/// Maximum page size for listings.
pub const MAX_LIMIT: i64 = 100;

/// Default page size for listings.
pub const DEFAULT_LIMIT: i64 = 50;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// `(limit, offset)` clamped to `1..=MAX_LIMIT` and `>= 0`.
    pub fn clamped(&self) -> (i64, i64) {
        (
            self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            self.offset.unwrap_or(0).max(0),
        )
    }
}

/// `?date=YYYY-MM-DD` with today as the default.
#[derive(Debug, Deserialize)]
pub struct DateParams {
    pub date: Option<NaiveDate>,
}

/// `?date=&stylist_id=` for the availability grid.
#[derive(Debug, Deserialize)]
pub struct BookedSlotsParams {
    pub date: NaiveDate,
    pub stylist_id: Option<DbId>,
}

/// `?range=today|month|year` for dashboard reports.
#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub range: Option<String>,
}
