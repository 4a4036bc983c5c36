#![allow(dead_code)]

use {
    hmac::{Hmac, Mac},
    pay_ledger::{
        AppState,
        infra::memory::InMemoryLedger,
        services::ingest::{WebhookDelivery, WebhookSecrets},
    },
    sha2::Sha256,
    std::sync::Arc,
};

pub const STRIPE_SECRET: &str = "whsec_test_secret";
pub const AIRWALLEX_SECRET: &str = "awx_test_secret";

pub fn secrets() -> WebhookSecrets {
    WebhookSecrets {
        stripe: STRIPE_SECRET.into(),
        airwallex: AIRWALLEX_SECRET.into(),
    }
}

/// Fresh app state over an in-memory ledger; the ledger handle is
/// returned too so tests can assert on stored record counts.
pub fn test_state() -> (AppState, InMemoryLedger) {
    let ledger = InMemoryLedger::new();
    let state = AppState {
        store: Arc::new(ledger.clone()),
        secrets: secrets(),
    };
    (state, ledger)
}

fn hmac_hex(secret: &str, parts: &[&[u8]]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    for part in parts {
        mac.update(part);
    }
    hex::encode(mac.finalize().into_bytes())
}

/// Builds a valid `Stripe-Signature` header value for `body`.
pub fn sign_stripe(body: &[u8]) -> String {
    let timestamp = "1700000000";
    let sig = hmac_hex(STRIPE_SECRET, &[timestamp.as_bytes(), b".", body]);
    format!("t={timestamp},v1={sig}")
}

/// Builds a valid `x-signature` header value for `body` and `timestamp`.
pub fn sign_airwallex(body: &[u8], timestamp: &str) -> String {
    hmac_hex(AIRWALLEX_SECRET, &[timestamp.as_bytes(), body])
}

pub fn stripe_delivery(body: Vec<u8>) -> WebhookDelivery {
    let signature = sign_stripe(&body);
    WebhookDelivery {
        body,
        stripe_signature: Some(signature),
        airwallex_signature: None,
        airwallex_timestamp: None,
    }
}

pub fn airwallex_delivery(body: Vec<u8>) -> WebhookDelivery {
    let timestamp = "1700000000000";
    let signature = sign_airwallex(&body, timestamp);
    WebhookDelivery {
        body,
        stripe_signature: None,
        airwallex_signature: Some(signature),
        airwallex_timestamp: Some(timestamp.to_string()),
    }
}

// ── Payload builders ───────────────────────────────────────────────────────

pub fn stripe_payment_succeeded(txn: &str, amount: i64) -> serde_json::Value {
    serde_json::json!({
        "id": format!("evt_{txn}"),
        "type": "payment_intent.succeeded",
        "data": {
            "object": {
                "id": txn,
                "amount": amount,
                "currency": "usd",
                "created": 1_700_000_000,
                "receipt_email": "payer@example.com",
                "payment_method_types": ["card"]
            }
        }
    })
}

pub fn stripe_refund_updated(txn: &str, amount: i64, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": format!("evt_{txn}"),
        "type": "refund.updated",
        "data": {
            "object": {
                "id": txn,
                "amount": amount,
                "currency": "usd",
                "created": 1_700_000_000,
                "status": status,
                "payment_intent": "pi_under_refund",
                "reason": "requested_by_customer"
            }
        }
    })
}

pub fn stripe_unsupported_event() -> serde_json::Value {
    serde_json::json!({
        "id": "evt_unsupported",
        "type": "payment_intent.created",
        "data": { "object": { "id": "pi_new" } }
    })
}

pub fn airwallex_payment_succeeded(txn: &str, amount: f64) -> serde_json::Value {
    serde_json::json!({
        "id": format!("evt_{txn}"),
        "name": "payment_intent.succeeded",
        "data": {
            "object": {
                "id": txn,
                "amount": amount,
                "currency": "USD",
                "created_at": "2024-01-15T10:30:00+00:00",
                "merchant_order_id": "order_1",
                "latest_payment_attempt": {
                    "id": "att_1",
                    "payment_method": {
                        "type": "card",
                        "card": {
                            "last4": "4242",
                            "brand": "visa",
                            "billing": { "email": "buyer@example.com" }
                        }
                    }
                }
            }
        }
    })
}

pub fn airwallex_refund_settled(txn: &str, amount: f64) -> serde_json::Value {
    serde_json::json!({
        "id": format!("evt_{txn}"),
        "name": "refund.settled",
        "data": {
            "id": txn,
            "amount": amount,
            "currency": "USD",
            "created_at": "2024-01-16T08:00:00+00:00",
            "status": "SETTLED",
            "payment_intent_id": "int_refunded"
        }
    })
}

pub fn body_of(payload: &serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(payload).expect("payload serializes")
}
