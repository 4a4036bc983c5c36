mod common;

use {
    common::*,
    pay_ledger::{
        domain::{error::WebhookError, event::EventStatus},
        services::ingest::{IngestOutcome, WebhookDelivery, ingest_delivery},
    },
};

// ── Happy paths ────────────────────────────────────────────────────────────

#[tokio::test]
async fn stripe_payment_is_stored() {
    let (state, ledger) = test_state();
    let body = body_of(&stripe_payment_succeeded("pi_store_1", 2000));

    let outcome = ingest_delivery(state.store.as_ref(), &state.secrets, stripe_delivery(body))
        .await
        .unwrap();

    match outcome {
        IngestOutcome::Stored(event) => {
            assert_eq!(event.transaction_id, "pi_store_1");
            assert_eq!(event.amount.minor_units(), 2000);
            assert_eq!(event.currency.as_str(), "USD");
            assert_eq!(event.status, EventStatus::Successful);
            assert_eq!(event.customer_email.as_deref(), Some("payer@example.com"));
            assert_eq!(event.webhook_id, "evt_pi_store_1");
        }
        other => panic!("expected Stored, got {other:?}"),
    }
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn airwallex_amount_normalizes_to_minor_units() {
    let (state, _ledger) = test_state();
    let body = body_of(&airwallex_payment_succeeded("int_units", 25.00));

    let outcome = ingest_delivery(state.store.as_ref(), &state.secrets, airwallex_delivery(body))
        .await
        .unwrap();

    match outcome {
        IngestOutcome::Stored(event) => {
            assert_eq!(event.amount.minor_units(), 2500);
            assert_eq!(event.currency.as_str(), "USD");
        }
        other => panic!("expected Stored, got {other:?}"),
    }
}

#[tokio::test]
async fn airwallex_refund_settled_is_recorded() {
    let (state, ledger) = test_state();
    let body = body_of(&airwallex_refund_settled("rfd_1", 10.50));

    let outcome = ingest_delivery(state.store.as_ref(), &state.secrets, airwallex_delivery(body))
        .await
        .unwrap();

    match outcome {
        IngestOutcome::Stored(event) => {
            assert_eq!(event.status, EventStatus::Refunded);
            assert_eq!(event.amount.minor_units(), 1050);
        }
        other => panic!("expected Stored, got {other:?}"),
    }
    assert_eq!(ledger.len(), 1);
}

// ── Idempotence ────────────────────────────────────────────────────────────

#[tokio::test]
async fn second_delivery_reports_duplicate_of_first() {
    let (state, ledger) = test_state();
    let body = body_of(&stripe_payment_succeeded("pi_dup", 2000));

    let first = ingest_delivery(
        state.store.as_ref(),
        &state.secrets,
        stripe_delivery(body.clone()),
    )
    .await
    .unwrap();
    let first_id = match first {
        IngestOutcome::Stored(event) => event.id,
        other => panic!("expected Stored, got {other:?}"),
    };

    let second = ingest_delivery(state.store.as_ref(), &state.secrets, stripe_delivery(body))
        .await
        .unwrap();
    match second {
        IngestOutcome::Duplicate(prior) => {
            assert_eq!(prior.id, first_id);
            assert_eq!(prior.transaction_id, "pi_dup");
        }
        other => panic!("expected Duplicate, got {other:?}"),
    }
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn same_transaction_across_sources_is_not_a_duplicate() {
    let (state, ledger) = test_state();

    let stripe_body = body_of(&stripe_payment_succeeded("shared_id", 2500));
    ingest_delivery(
        state.store.as_ref(),
        &state.secrets,
        stripe_delivery(stripe_body),
    )
    .await
    .unwrap();

    let awx_body = body_of(&airwallex_payment_succeeded("shared_id", 25.00));
    let outcome = ingest_delivery(
        state.store.as_ref(),
        &state.secrets,
        airwallex_delivery(awx_body),
    )
    .await
    .unwrap();

    // Same transaction id and amount, different source — distinct fingerprint.
    assert!(matches!(outcome, IngestOutcome::Stored(_)));
    assert_eq!(ledger.len(), 2);
}

// ── Rejections ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn tampered_body_fails_signature_before_parsing() {
    let (state, ledger) = test_state();
    let body = body_of(&stripe_payment_succeeded("pi_tamper", 2000));
    let mut delivery = stripe_delivery(body);
    delivery.body = body_of(&stripe_payment_succeeded("pi_tamper", 9999));

    let err = ingest_delivery(state.store.as_ref(), &state.secrets, delivery)
        .await
        .unwrap_err();
    assert!(matches!(err, WebhookError::InvalidSignature(_)));
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn missing_both_signatures_is_rejected() {
    let (state, ledger) = test_state();
    let delivery = WebhookDelivery {
        // Not even valid JSON — verification must fail before parsing.
        body: b"not json".to_vec(),
        stripe_signature: None,
        airwallex_signature: None,
        airwallex_timestamp: None,
    };

    let err = ingest_delivery(state.store.as_ref(), &state.secrets, delivery)
        .await
        .unwrap_err();
    assert!(matches!(err, WebhookError::MissingSignature));
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn malformed_json_after_valid_signature() {
    let (state, ledger) = test_state();
    let delivery = stripe_delivery(b"{not valid json".to_vec());

    let err = ingest_delivery(state.store.as_ref(), &state.secrets, delivery)
        .await
        .unwrap_err();
    assert!(matches!(err, WebhookError::MalformedPayload(_)));
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn pending_refund_is_rejected_and_not_stored() {
    let (state, ledger) = test_state();
    let body = body_of(&stripe_refund_updated("re_pending", 500, "pending"));

    let err = ingest_delivery(state.store.as_ref(), &state.secrets, stripe_delivery(body))
        .await
        .unwrap_err();
    match err {
        WebhookError::RefundNotFinalized(status) => assert_eq!(status, "pending"),
        other => panic!("expected RefundNotFinalized, got {other:?}"),
    }
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn succeeded_refund_is_stored() {
    let (state, ledger) = test_state();
    let body = body_of(&stripe_refund_updated("re_done", 500, "succeeded"));

    let outcome = ingest_delivery(state.store.as_ref(), &state.secrets, stripe_delivery(body))
        .await
        .unwrap();
    match outcome {
        IngestOutcome::Stored(event) => {
            assert_eq!(event.status, EventStatus::Refunded);
            assert_eq!(event.customer_email, None);
        }
        other => panic!("expected Stored, got {other:?}"),
    }
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn unsupported_type_is_ignored_without_a_record() {
    let (state, ledger) = test_state();
    let body = body_of(&stripe_unsupported_event());

    let outcome = ingest_delivery(state.store.as_ref(), &state.secrets, stripe_delivery(body))
        .await
        .unwrap();
    match outcome {
        IngestOutcome::Ignored { event_type } => {
            assert_eq!(event_type, "payment_intent.created")
        }
        other => panic!("expected Ignored, got {other:?}"),
    }
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn airwallex_signature_mismatch_is_enforced() {
    let (state, ledger) = test_state();
    let body = body_of(&airwallex_payment_succeeded("int_sig", 25.00));
    let mut delivery = airwallex_delivery(body);
    // Signature computed over a different timestamp must be rejected,
    // never merely logged.
    delivery.airwallex_timestamp = Some("1700000009999".to_string());

    let err = ingest_delivery(state.store.as_ref(), &state.secrets, delivery)
        .await
        .unwrap_err();
    assert!(matches!(err, WebhookError::InvalidSignature(_)));
    assert!(ledger.is_empty());
}
