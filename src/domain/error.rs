use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebhookError {
    /// Neither provider signature header was present.
    #[error("no signature provided")]
    MissingSignature,

    /// Signature header was present but failed HMAC verification.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Body was not decodable into the provider's event shape.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// Valid event of a type this system does not model. Non-fatal:
    /// the orchestrator acknowledges it without persisting.
    #[error("unsupported event type: {0}")]
    UnsupportedEventType(String),

    /// Stripe refund.updated whose nested refund has not settled yet.
    /// Fatal so the provider retries once the refund succeeds.
    #[error("refund not finalized, status: {0}")]
    RefundNotFinalized(String),

    /// Normalized event failed a schema constraint.
    #[error("validation: {0}")]
    Validation(String),

    /// Storage uniqueness race. Downgraded to a duplicate outcome by
    /// the orchestrator, never surfaced as fatal.
    #[error("fingerprint already recorded")]
    ConstraintViolation,

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
}
