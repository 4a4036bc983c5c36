//! Raw-body HMAC verification for both provider schemes.
//!
//! Verification always runs over the exact bytes received — any prior
//! re-serialization or whitespace normalization upstream would break the
//! signature, so nothing here or before here parses the body as JSON.

use {
    crate::domain::error::WebhookError,
    hmac::{Hmac, Mac},
    sha2::Sha256,
    subtle::ConstantTimeEq,
};

type HmacSha256 = Hmac<Sha256>;

/// Splits a `Stripe-Signature` header (`t=<ts>,v1=<hex>`) into its
/// timestamp and v1 signature parts.
fn parse_stripe_header(header: &str) -> Result<(&str, &str), WebhookError> {
    let mut timestamp = None;
    let mut v1 = None;
    for element in header.split(',') {
        match element.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => v1 = Some(value),
            _ => {}
        }
    }
    match (timestamp, v1) {
        (Some(t), Some(sig)) => Ok((t, sig)),
        _ => Err(WebhookError::InvalidSignature(
            "malformed signature header".into(),
        )),
    }
}

fn verify_hmac(secret: &str, parts: &[&[u8]], provided_hex: &str) -> Result<(), WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::InvalidSignature("invalid secret key".into()))?;
    for part in parts {
        mac.update(part);
    }
    let expected = mac.finalize().into_bytes();

    let provided = hex::decode(provided_hex)
        .map_err(|_| WebhookError::InvalidSignature("signature is not hex".into()))?;

    if expected.ct_eq(provided.as_slice()).into() {
        Ok(())
    } else {
        Err(WebhookError::InvalidSignature("digest mismatch".into()))
    }
}

/// Stripe scheme: HMAC-SHA256 over `"{t}.{rawBody}"` keyed with the
/// endpoint secret, compared in constant time against the header's `v1`.
pub fn verify_stripe(body: &[u8], header: &str, secret: &str) -> Result<(), WebhookError> {
    let (timestamp, v1) = parse_stripe_header(header)?;
    verify_hmac(secret, &[timestamp.as_bytes(), b".", body], v1)
}

/// Airwallex scheme: HMAC-SHA256 over `"{timestamp}{rawBody}"`, the
/// timestamp arriving in a separate header. Enforced with the same rigor
/// as Stripe's — a mismatch is always a rejection.
pub fn verify_airwallex(
    body: &[u8],
    header: &str,
    timestamp: &str,
    secret: &str,
) -> Result<(), WebhookError> {
    verify_hmac(secret, &[timestamp.as_bytes(), body], header)
}
