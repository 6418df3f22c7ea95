//! Checkout signature verification.
//!
//! After checkout the gateway hands the client `order_id`, `payment_id` and
//! a signature: the lowercase hex HMAC-SHA256 of `"{order_id}|{payment_id}"`
//! keyed with the account's key secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// HMAC over `"{order_id}|{payment_id}"`. Keys of any length are accepted,
/// so `None` is not expected in practice.
fn mac_for(order_id: &str, payment_id: &str, secret: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Some(mac)
}

/// Expected signature for an order/payment pair.
pub fn expected_signature(order_id: &str, payment_id: &str, secret: &str) -> Option<String> {
    mac_for(order_id, payment_id, secret).map(|mac| hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a checkout signature. Malformed hex is a mismatch.
pub fn verify_signature(order_id: &str, payment_id: &str, signature: &str, secret: &str) -> bool {
    let Some(raw) = hex::decode(signature.trim()) else {
        return false;
    };
    mac_for(order_id, payment_id, secret)
        .is_some_and(|mac| mac.verify_slice(&raw).is_ok())
}

// ---------------------------------------------------------------------------
// hex helpers (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode a hex string (either case). `None` on odd length or bad digits.
    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
            .collect()
    }
}
