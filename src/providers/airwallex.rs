//! Airwallex event decoding and normalization.
//!
//! Airwallex amounts arrive in major units (dollars) and are converted to
//! minor units here; timestamps arrive as ISO-8601 strings. Payment events
//! carry their payload under `data.object`, while `refund.settled` puts
//! the refund fields directly under `data`.

use {
    crate::domain::{
        error::WebhookError,
        event::{EventSource, EventStatus, NewPaymentEvent, NewPaymentEventParams},
        money::{CurrencyCode, MinorAmount},
    },
    chrono::{DateTime, Utc},
    serde::Deserialize,
};

#[derive(Debug, Deserialize)]
struct AirwallexEnvelope {
    id: String,
    name: String,
}

#[derive(Debug)]
enum AirwallexEventKind {
    PaymentIntentSucceeded(AirwallexPayload),
    AuthorizationFailed(AirwallexPayload),
    CaptureFailed(AirwallexPayload),
    RefundSettled(AirwallexRefund),
    Unrecognized,
}

impl AirwallexEventKind {
    /// Dispatches on the envelope's `name` before decoding the payload,
    /// so unrecognized types land in `Unrecognized` no matter what shape
    /// their `data` carries. A decode failure for a modeled type is a
    /// genuinely malformed payload.
    fn decode(name: &str, raw: &serde_json::Value) -> Result<Self, WebhookError> {
        let data = || raw.get("data").cloned().unwrap_or(serde_json::Value::Null);
        Ok(match name {
            "payment_intent.succeeded" => {
                Self::PaymentIntentSucceeded(serde_json::from_value(data())?)
            }
            "payment_attempt.authorization_failed" => {
                Self::AuthorizationFailed(serde_json::from_value(data())?)
            }
            "payment_attempt.capture_failed" => Self::CaptureFailed(serde_json::from_value(data())?),
            "refund.settled" => Self::RefundSettled(serde_json::from_value(data())?),
            _ => Self::Unrecognized,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AirwallexPayload {
    object: AirwallexPayment,
}

#[derive(Debug, Deserialize)]
struct AirwallexPayment {
    id: String,
    amount: f64,
    currency: String,
    created_at: String,
    #[serde(default)]
    descriptor: Option<String>,
    #[serde(default)]
    merchant_order_id: Option<String>,
    #[serde(default)]
    original_amount: Option<f64>,
    #[serde(default)]
    original_currency: Option<String>,
    #[serde(default)]
    latest_payment_attempt: Option<AirwallexAttempt>,
}

#[derive(Debug, Deserialize)]
struct AirwallexAttempt {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    authorization_code: Option<String>,
    #[serde(default)]
    payment_method: Option<AirwallexPaymentMethod>,
}

#[derive(Debug, Deserialize)]
struct AirwallexPaymentMethod {
    #[serde(rename = "type", default)]
    method_type: Option<String>,
    #[serde(default)]
    card: Option<AirwallexCard>,
}

#[derive(Debug, Deserialize)]
struct AirwallexCard {
    #[serde(default)]
    last4: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    billing: Option<AirwallexBilling>,
}

#[derive(Debug, Deserialize)]
struct AirwallexBilling {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AirwallexRefund {
    id: String,
    amount: f64,
    #[serde(default)]
    currency: Option<String>,
    created_at: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    payment_intent_id: Option<String>,
    #[serde(default)]
    payment_attempt_id: Option<String>,
    #[serde(default)]
    merchant_order_id: Option<String>,
    #[serde(default)]
    customer: Option<AirwallexCustomer>,
}

#[derive(Debug, Deserialize)]
struct AirwallexCustomer {
    #[serde(default)]
    email: Option<String>,
}

fn parse_iso_timestamp(value: &str) -> Result<DateTime<Utc>, WebhookError> {
    DateTime::parse_from_rfc3339(value)
        // Airwallex sometimes emits offsets without a colon (+0800).
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| WebhookError::Validation(format!("invalid created_at timestamp: {value}")))
}

/// Maps a verified Airwallex payload into the canonical shape.
pub fn normalize(raw: &serde_json::Value) -> Result<NewPaymentEvent, WebhookError> {
    let envelope: AirwallexEnvelope = serde_json::from_value(raw.clone())?;

    match AirwallexEventKind::decode(&envelope.name, raw)? {
        AirwallexEventKind::PaymentIntentSucceeded(payload) => {
            from_payment(payload.object, EventStatus::Successful, envelope, raw)
        }
        AirwallexEventKind::AuthorizationFailed(payload)
        | AirwallexEventKind::CaptureFailed(payload) => {
            from_payment(payload.object, EventStatus::Failed, envelope, raw)
        }
        AirwallexEventKind::RefundSettled(refund) => from_refund(refund, envelope, raw),
        AirwallexEventKind::Unrecognized => Err(WebhookError::UnsupportedEventType(envelope.name)),
    }
}

fn from_payment(
    payment: AirwallexPayment,
    status: EventStatus,
    envelope: AirwallexEnvelope,
    raw: &serde_json::Value,
) -> Result<NewPaymentEvent, WebhookError> {
    let attempt = payment.latest_payment_attempt.as_ref();
    let method = attempt.and_then(|a| a.payment_method.as_ref());
    let card = method.and_then(|m| m.card.as_ref());

    let customer_email = card
        .and_then(|c| c.billing.as_ref())
        .and_then(|b| b.email.clone());

    let metadata = serde_json::json!({
        "payment_method": method.and_then(|m| m.method_type.as_deref()),
        "description": payment.descriptor,
        "merchant_order_id": payment.merchant_order_id,
        "original_amount": payment.original_amount,
        "original_currency": payment.original_currency,
        "authorization_code": attempt.and_then(|a| a.authorization_code.as_deref()),
        "payment_attempt_id": attempt.and_then(|a| a.id.as_deref()),
        "card_last4": card.and_then(|c| c.last4.as_deref()),
        "card_brand": card.and_then(|c| c.brand.as_deref()),
    });

    Ok(NewPaymentEvent::new(
        EventSource::Airwallex,
        NewPaymentEventParams {
            transaction_id: payment.id,
            amount: MinorAmount::from_major(payment.amount)?,
            currency: CurrencyCode::new(&payment.currency)?,
            status,
            timestamp: parse_iso_timestamp(&payment.created_at)?,
            customer_email,
            raw_event: raw.clone(),
            webhook_id: envelope.id,
            metadata,
        },
    ))
}

fn from_refund(
    refund: AirwallexRefund,
    envelope: AirwallexEnvelope,
    raw: &serde_json::Value,
) -> Result<NewPaymentEvent, WebhookError> {
    let metadata = serde_json::json!({
        "payment_intent_id": refund.payment_intent_id,
        "payment_attempt_id": refund.payment_attempt_id,
        "refund_reason": refund.reason,
        "refund_status": refund.status,
        "description": refund.merchant_order_id,
    });

    Ok(NewPaymentEvent::new(
        EventSource::Airwallex,
        NewPaymentEventParams {
            transaction_id: refund.id,
            amount: MinorAmount::from_major(refund.amount)?,
            currency: CurrencyCode::new(refund.currency.as_deref().unwrap_or("USD"))?,
            status: EventStatus::Refunded,
            timestamp: parse_iso_timestamp(&refund.created_at)?,
            customer_email: refund.customer.and_then(|c| c.email),
            raw_event: raw.clone(),
            webhook_id: envelope.id,
            metadata,
        },
    ))
}
