//! Webhook authenticity: `X-Hub-Signature` validation and the subscription handshake.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha1::Sha1;

/// Header Facebook signs webhook deliveries with.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";

/// Check `sha1=<hex hmac>` over the raw body. Comparison is constant-time.
pub fn validate_signature(app_secret: &str, body: &[u8], signature_header: &str) -> bool {
    let Some(hex_sig) = signature_header.trim().strip_prefix("sha1=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_sig) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha1>::new_from_slice(app_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Compute the header value Facebook would send for `body`.
pub fn sign(app_secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = Hmac::<Sha1>::new_from_slice(app_secret.as_bytes()).ok()?;
    mac.update(body);
    Some(format!("sha1={}", hex::encode(mac.finalize().into_bytes())))
}

/// Webhook subscription query. Facebook sends `hub.mode`; `hub_mode` is accepted too.
/// A query carrying both spellings of one key fails to decode as a duplicate field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionQuery {
    #[serde(rename = "hub.mode", alias = "hub_mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token", alias = "hub_verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge", alias = "hub_challenge")]
    pub challenge: Option<String>,
}

/// Returns the challenge to echo when mode is `subscribe` and the token matches the
/// configured verification token. No configured token never verifies.
pub fn verify_subscription(query: &SubscriptionQuery, verification: Option<&str>) -> Option<String> {
    let expected = verification.filter(|v| !v.is_empty())?;
    if query.mode.as_deref() != Some("subscribe") {
        return None;
    }
    if query.verify_token.as_deref() != Some(expected) {
        return None;
    }
    Some(query.challenge.clone().unwrap_or_default())
}
