use salon_core::booking::BookingPolicy;
use salon_payments::RazorpayConfig;

use crate::auth::jwt::JwtConfig;

/// A required variable is missing or a value does not parse.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Server configuration loaded from environment variables.
///
/// Everything except the secrets has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub booking: BookingPolicy,
    /// Write `appointment_history` rows on status changes.
    pub record_history: bool,
    /// Seconds between reminder sweeps (default: `60`).
    pub reminder_interval_secs: u64,
    /// Gateway credentials; `None` disables orders and refunds.
    pub payments: Option<RazorpayConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `HOST`                           | `0.0.0.0`               |
    /// | `PORT`                           | `3000`                  |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                    |
    /// | `JWT_SECRET`                     | **required**            |
    /// | `BOOKING_EXACT_TIMESTAMP_GUARD`  | `true`                  |
    /// | `RECORD_APPOINTMENT_HISTORY`     | `true`                  |
    /// | `REMINDER_INTERVAL_SECS`         | `60`                    |
    ///
    /// Gateway variables are described on [`RazorpayConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&get, "PORT", 3000u16)?;

        let cors_origins: Vec<String> = get("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = parse_or(&get, "REQUEST_TIMEOUT_SECS", 30u64)?;

        let secret = get("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let exact_timestamp_guard = flag_or(&get, "BOOKING_EXACT_TIMESTAMP_GUARD", true)?;
        let record_history = flag_or(&get, "RECORD_APPOINTMENT_HISTORY", true)?;
        let reminder_interval_secs = parse_or(&get, "REMINDER_INTERVAL_SECS", 60u64)?;
        if reminder_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "REMINDER_INTERVAL_SECS",
                value: "0".into(),
            });
        }

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig { secret },
            booking: BookingPolicy {
                exact_timestamp_guard,
            },
            record_history,
            reminder_interval_secs,
            payments: RazorpayConfig::from_parts(
                get("RAZORPAY_KEY_ID"),
                get("RAZORPAY_KEY_SECRET"),
                get("RAZORPAY_BASE_URL"),
            ),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn flag_or(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match get(var) {
        None => Ok(default),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { var, value }),
        },
    }
}
