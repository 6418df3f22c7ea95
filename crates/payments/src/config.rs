//! Gateway credentials.

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";

#[derive(Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    /// API root without a trailing slash.
    pub base_url: String,
}

impl RazorpayConfig {
    /// Load credentials from the environment.
    ///
    /// Returns `None` unless both keys are set and non-blank.
    ///
    /// | Variable              | Required | Default                    |
    /// |-----------------------|----------|----------------------------|
    /// | `RAZORPAY_KEY_ID`     | yes      | none                       |
    /// | `RAZORPAY_KEY_SECRET` | yes      | none                       |
    /// | `RAZORPAY_BASE_URL`   | no       | `https://api.razorpay.com` |
    pub fn from_env() -> Option<Self> {
        Self::from_parts(
            std::env::var("RAZORPAY_KEY_ID").ok(),
            std::env::var("RAZORPAY_KEY_SECRET").ok(),
            std::env::var("RAZORPAY_BASE_URL").ok(),
        )
    }

    /// Build from raw values; blank keys yield `None`.
    pub fn from_parts(
        key_id: Option<String>,
        key_secret: Option<String>,
        base_url: Option<String>,
    ) -> Option<Self> {
        let key_id = key_id.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())?;
        let key_secret = key_secret
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())?;
        let base_url = base_url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Some(Self {
            key_id,
            key_secret,
            base_url,
        })
    }
}

// Keeps the secret out of logs.
impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}
