//! Stripe event decoding and normalization.
//!
//! Event families are a closed tagged-variant enum so new event types are
//! compile-time-checked additions; anything Stripe sends outside this set
//! lands in `Unrecognized` and is acknowledged without persisting.

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
struct StripeEnvelope {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
}

#[derive(Debug)]
enum StripeEventKind {
    PaymentIntentSucceeded(StripePayload<StripePaymentIntent>),
    PaymentIntentFailed(StripePayload<StripePaymentIntent>),
    RefundUpdated(StripePayload<StripeRefund>),
    Unrecognized,
}

impl StripeEventKind {
    /// Dispatches on the envelope's `type` before decoding the payload,
    /// so unrecognized types land in `Unrecognized` no matter what shape
    /// their `data` carries. A decode failure for a modeled type is a
    /// genuinely malformed payload.
    fn decode(event_type: &str, raw: &serde_json::Value) -> Result<Self, WebhookError> {
        let data = || raw.get("data").cloned().unwrap_or(serde_json::Value::Null);
        Ok(match event_type {
            "payment_intent.succeeded" => {
                Self::PaymentIntentSucceeded(serde_json::from_value(data())?)
            }
            "payment_intent.payment_failed" => {
                Self::PaymentIntentFailed(serde_json::from_value(data())?)
            }
            "refund.updated" => Self::RefundUpdated(serde_json::from_value(data())?),
            _ => Self::Unrecognized,
        })
    }
}

#[derive(Debug, Deserialize)]
struct StripePayload<T> {
    object: T,
}

/// A field Stripe may deliver either as a bare id or an expanded object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Expandable<T> {
    Id(String),
    Object(T),
}

impl Expandable<serde_json::Value> {
    fn id_string(&self) -> Option<String> {
        match self {
            Self::Id(id) => Some(id.clone()),
            Self::Object(obj) => obj.get("id").and_then(|v| v.as_str()).map(String::from),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeCustomer {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    id: String,
    amount: i64,
    currency: String,
    created: i64,
    #[serde(default)]
    receipt_email: Option<String>,
    #[serde(default)]
    customer: Option<Expandable<StripeCustomer>>,
    #[serde(default)]
    payment_method_types: Vec<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    last_payment_error: Option<StripePaymentError>,
}

#[derive(Debug, Deserialize)]
struct StripePaymentError {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeRefund {
    id: String,
    amount: i64,
    currency: String,
    created: i64,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    payment_intent: Option<Expandable<serde_json::Value>>,
    #[serde(default)]
    charge: Option<Expandable<serde_json::Value>>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn epoch_seconds(created: i64) -> Result<DateTime<Utc>, WebhookError> {
    DateTime::from_timestamp(created, 0)
        .ok_or_else(|| WebhookError::Validation(format!("invalid created timestamp: {created}")))
}

/// Maps a verified Stripe payload into the canonical shape. Stripe
/// amounts are already minor units and pass through unchanged.
pub fn normalize(raw: &serde_json::Value) -> Result<NewPaymentEvent, WebhookError> {
    let envelope: StripeEnvelope = serde_json::from_value(raw.clone())?;

    match StripeEventKind::decode(&envelope.event_type, raw)? {
        StripeEventKind::PaymentIntentSucceeded(payload) => {
            from_payment_intent(payload.object, EventStatus::Successful, envelope, raw)
        }
        StripeEventKind::PaymentIntentFailed(payload) => {
            from_payment_intent(payload.object, EventStatus::Failed, envelope, raw)
        }
        StripeEventKind::RefundUpdated(payload) => from_refund(payload.object, envelope, raw),
        StripeEventKind::Unrecognized => {
            Err(WebhookError::UnsupportedEventType(envelope.event_type))
        }
    }
}

fn from_payment_intent(
    pi: StripePaymentIntent,
    status: EventStatus,
    envelope: StripeEnvelope,
    raw: &serde_json::Value,
) -> Result<NewPaymentEvent, WebhookError> {
    let customer_email = pi.receipt_email.clone().or_else(|| match &pi.customer {
        Some(Expandable::Object(customer)) => customer.email.clone(),
        _ => None,
    });

    let metadata = serde_json::json!({
        "payment_method": pi.payment_method_types.first(),
        "description": pi.description,
        "last_payment_error": pi.last_payment_error.as_ref().and_then(|e| e.message.as_deref()),
    });

    Ok(NewPaymentEvent::new(
        EventSource::Stripe,
        NewPaymentEventParams {
            transaction_id: pi.id,
            amount: MinorAmount::new(pi.amount)?,
            currency: CurrencyCode::new(&pi.currency)?,
            status,
            timestamp: epoch_seconds(pi.created)?,
            customer_email,
            raw_event: raw.clone(),
            webhook_id: envelope.id,
            metadata,
        },
    ))
}

fn from_refund(
    refund: StripeRefund,
    envelope: StripeEnvelope,
    raw: &serde_json::Value,
) -> Result<NewPaymentEvent, WebhookError> {
    // Only settled refunds are recorded. Rejecting (rather than ignoring)
    // makes Stripe redeliver once the refund reaches "succeeded".
    match refund.status.as_deref() {
        Some("succeeded") => {}
        other => {
            return Err(WebhookError::RefundNotFinalized(
                other.unwrap_or("unknown").to_string(),
            ));
        }
    }

    let metadata = serde_json::json!({
        "payment_intent_id": refund.payment_intent.as_ref().and_then(|e| e.id_string()),
        "charge_id": refund.charge.as_ref().and_then(|e| e.id_string()),
        "refund_reason": refund.reason,
        "refund_status": refund.status,
        "description": refund.description,
    });

    Ok(NewPaymentEvent::new(
        EventSource::Stripe,
        NewPaymentEventParams {
            transaction_id: refund.id,
            amount: MinorAmount::new(refund.amount)?,
            currency: CurrencyCode::new(&refund.currency)?,
            status: EventStatus::Refunded,
            timestamp: epoch_seconds(refund.created)?,
            // The refund object carries no customer email.
            customer_email: None,
            raw_event: raw.clone(),
            webhook_id: envelope.id,
            metadata,
        },
    ))
}
