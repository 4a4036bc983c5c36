use {
    super::api_errors::ApiError,
    crate::{
        AppState,
        domain::event::EventSource,
        services::ingest::{IngestOutcome, WebhookDelivery, ingest_delivery},
    },
    axum::{
        Json, Router,
        body::Bytes,
        extract::State,
        http::HeaderMap,
        routing::{get, post},
    },
    chrono::Utc,
};

pub fn webhook_router(state: AppState) -> Router {
    Router::new()
        .route("/webhooks/payment", post(payment_webhook_handler))
        .route("/webhooks/health", get(health_handler))
        .with_state(state)
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Inbound webhook endpoint. The body is extracted as raw `Bytes` —
/// signature verification must see the payload byte-for-byte, so nothing
/// upstream may parse or re-serialize it.
#[tracing::instrument(name = "webhook", skip_all)]
pub async fn payment_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let delivery = WebhookDelivery {
        body: body.to_vec(),
        stripe_signature: header_string(&headers, "stripe-signature"),
        airwallex_signature: header_string(&headers, "x-signature"),
        airwallex_timestamp: header_string(&headers, "x-timestamp"),
    };

    match ingest_delivery(state.store.as_ref(), &state.secrets, delivery).await? {
        IngestOutcome::Stored(event) => Ok(Json(serde_json::json!({
            "message": "Webhook processed successfully",
            "transaction_id": event.transaction_id,
            "status": event.status,
            "processed_at": event.processed_at,
        }))),
        IngestOutcome::Duplicate(prior) => Ok(Json(serde_json::json!({
            "message": "Event already processed",
            "transaction_id": prior.transaction_id,
            "processed_at": prior.processed_at,
        }))),
        IngestOutcome::Ignored { .. } => Ok(Json(serde_json::json!({
            "message": "Event ignored",
        }))),
    }
}

/// Liveness probe, no side effects.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "OK",
        "message": "Webhook endpoint is healthy",
        "supported_sources": EventSource::ALL,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
