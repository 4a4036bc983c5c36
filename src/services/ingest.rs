//! Ingestion orchestrator: verify → parse → normalize → dedupe-check →
//! persist. Any stage failure short-circuits; the duplicate pre-check is
//! a fast path only, with the storage uniqueness constraint as the final
//! arbiter under concurrent delivery.

use {
    crate::{
        domain::{
            error::WebhookError,
            event::{EventSource, StoredPaymentEvent},
        },
        infra::store::{InsertOutcome, LedgerStore},
        providers::{airwallex, signature, stripe},
    },
    chrono::Utc,
    std::sync::Arc,
};

/// Out-of-band shared secrets, one per provider. Sourced from process
/// configuration at startup; there is no fallback value.
#[derive(Clone)]
pub struct WebhookSecrets {
    pub stripe: Arc<str>,
    pub airwallex: Arc<str>,
}

/// One inbound delivery, exactly as received: raw body bytes plus the
/// provider signature headers. The body must not be parsed before
/// signature verification.
#[derive(Debug)]
pub struct WebhookDelivery {
    pub body: Vec<u8>,
    pub stripe_signature: Option<String>,
    pub airwallex_signature: Option<String>,
    pub airwallex_timestamp: Option<String>,
}

#[derive(Debug)]
pub enum IngestOutcome {
    /// New canonical event durably recorded.
    Stored(StoredPaymentEvent),
    /// An event with the same fingerprint was already recorded; carries
    /// the prior record so the provider stops retrying.
    Duplicate(StoredPaymentEvent),
    /// Verified event of a type outside the modeled set — acknowledged
    /// without persisting so providers don't retry-storm.
    Ignored { event_type: String },
}

#[tracing::instrument(
    name = "ingest",
    skip_all,
    fields(source = tracing::field::Empty, transaction_id = tracing::field::Empty)
)]
pub async fn ingest_delivery(
    store: &dyn LedgerStore,
    secrets: &WebhookSecrets,
    delivery: WebhookDelivery,
) -> Result<IngestOutcome, WebhookError> {
    // 1. Verify authenticity over the raw bytes, then decode.
    let source = verify(&delivery, secrets)?;
    tracing::Span::current().record("source", tracing::field::display(source));

    let raw: serde_json::Value = serde_json::from_slice(&delivery.body)?;

    // 2. Normalize into the canonical shape. Unsupported types are
    //    acknowledged, not rejected — the provider must not retry them.
    let event = match source {
        EventSource::Stripe => stripe::normalize(&raw),
        EventSource::Airwallex => airwallex::normalize(&raw),
    };
    let event = match event {
        Ok(event) => event,
        Err(WebhookError::UnsupportedEventType(event_type)) => {
            tracing::info!(%source, %event_type, "unsupported event type, ignoring");
            return Ok(IngestOutcome::Ignored { event_type });
        }
        Err(err) => return Err(err),
    };
    tracing::Span::current().record(
        "transaction_id",
        tracing::field::display(event.transaction_id()),
    );

    // 3. Dedup fast path.
    let fingerprint = event.fingerprint();
    if let Some(prior) = store.find_by_fingerprint(&fingerprint).await? {
        tracing::warn!(prior_id = %prior.id, "duplicate payment event detected");
        return Ok(IngestOutcome::Duplicate(prior));
    }

    // 4. Insert. Two concurrent deliveries can race past the check above,
    //    so a conflict here is expected and downgrades to Duplicate.
    match store.insert_unique(event).await? {
        InsertOutcome::Inserted(stored) => {
            tracing::info!(
                event_id = %stored.id,
                amount = stored.amount.minor_units(),
                currency = %stored.currency,
                status = %stored.status,
                "payment event recorded"
            );
            Ok(IngestOutcome::Stored(stored))
        }
        InsertOutcome::Conflict => {
            let prior = store
                .find_by_fingerprint(&fingerprint)
                .await?
                .ok_or(WebhookError::ConstraintViolation)?;
            tracing::warn!(prior_id = %prior.id, "lost insert race, reporting duplicate");
            Ok(IngestOutcome::Duplicate(prior))
        }
    }
}

/// Selects the provider by which signature header is present and checks
/// the HMAC. Absence of both headers is a 401-level failure before any
/// parsing occurs.
fn verify(
    delivery: &WebhookDelivery,
    secrets: &WebhookSecrets,
) -> Result<EventSource, WebhookError> {
    if let Some(header) = &delivery.stripe_signature {
        signature::verify_stripe(&delivery.body, header, &secrets.stripe)?;
        return Ok(EventSource::Stripe);
    }
    if let Some(header) = &delivery.airwallex_signature {
        // Airwallex signs over a caller-supplied timestamp; fall back to
        // receipt time (epoch millis) when the header is absent.
        let timestamp = delivery
            .airwallex_timestamp
            .clone()
            .unwrap_or_else(|| Utc::now().timestamp_millis().to_string());
        signature::verify_airwallex(&delivery.body, header, &timestamp, &secrets.airwallex)?;
        return Ok(EventSource::Airwallex);
    }
    Err(WebhookError::MissingSignature)
}
