/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// UTC timestamps for infrastructure rows (notifications, tokens).
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Salon wall-clock time.
///
/// The salon operates in a single time zone and every scheduling value
/// (slots, appointment intervals, dashboard windows) is expressed in its
/// local time without an offset.
pub type WallTime = chrono::NaiveDateTime;
