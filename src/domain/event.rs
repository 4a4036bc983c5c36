use {
    super::error::WebhookError,
    super::fingerprint::Fingerprint,
    super::money::{CurrencyCode, MinorAmount},
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    std::fmt,
    uuid::Uuid,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Successful,
    Failed,
    Refunded,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Successful => "successful",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for EventStatus {
    type Error = WebhookError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "successful" => Ok(Self::Successful),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(WebhookError::Validation(format!(
                "unknown event status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Stripe,
    Airwallex,
}

impl EventSource {
    pub const ALL: [EventSource; 2] = [Self::Stripe, Self::Airwallex];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::Airwallex => "airwallex",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for EventSource {
    type Error = WebhookError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "stripe" => Ok(Self::Stripe),
            "airwallex" => Ok(Self::Airwallex),
            other => Err(WebhookError::Validation(format!(
                "unknown event source: {other}"
            ))),
        }
    }
}

/// Lowercases and trims a provider-supplied email. Absence (or an empty
/// string) is legitimate, not an error.
pub fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

pub struct NewPaymentEventParams {
    pub transaction_id: String,
    pub amount: MinorAmount,
    pub currency: CurrencyCode,
    pub status: EventStatus,
    pub timestamp: DateTime<Utc>,
    pub customer_email: Option<String>,
    pub raw_event: serde_json::Value,
    pub webhook_id: String,
    pub metadata: serde_json::Value,
}

/// Canonical event awaiting insertion. Field invariants (non-negative
/// amount, 3-letter uppercase currency) are carried by the newtypes.
#[derive(Debug, Clone)]
pub struct NewPaymentEvent {
    transaction_id: String,
    amount: MinorAmount,
    currency: CurrencyCode,
    status: EventStatus,
    timestamp: DateTime<Utc>,
    source: EventSource,
    customer_email: Option<String>,
    raw_event: serde_json::Value,
    webhook_id: String,
    metadata: serde_json::Value,
}

impl NewPaymentEvent {
    pub fn new(source: EventSource, params: NewPaymentEventParams) -> Self {
        Self {
            transaction_id: params.transaction_id,
            amount: params.amount,
            currency: params.currency,
            status: params.status,
            timestamp: params.timestamp,
            source,
            customer_email: normalize_email(params.customer_email),
            raw_event: params.raw_event,
            webhook_id: params.webhook_id,
            metadata: params.metadata,
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn amount(&self) -> MinorAmount {
        self.amount
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn status(&self) -> EventStatus {
        self.status
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn source(&self) -> EventSource {
        self.source
    }

    pub fn customer_email(&self) -> Option<&str> {
        self.customer_email.as_deref()
    }

    pub fn raw_event(&self) -> &serde_json::Value {
        &self.raw_event
    }

    pub fn webhook_id(&self) -> &str {
        &self.webhook_id
    }

    pub fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::derive(
            &self.transaction_id,
            self.amount,
            &self.currency,
            self.source,
        )
    }

    /// Promotes to a stored record. Called by stores at insert time;
    /// id and processed_at are generated here so both backends agree.
    pub fn into_stored(self) -> StoredPaymentEvent {
        let fingerprint = self.fingerprint();
        StoredPaymentEvent {
            id: Uuid::now_v7(),
            transaction_id: self.transaction_id,
            amount: self.amount,
            currency: self.currency,
            status: self.status,
            timestamp: self.timestamp,
            source: self.source,
            customer_email: self.customer_email,
            raw_event: self.raw_event,
            webhook_id: self.webhook_id,
            metadata: self.metadata,
            fingerprint,
            processed_at: Utc::now(),
        }
    }
}

/// Durably recorded canonical event. Append-only — never mutated after
/// the ledger writer persists it.
#[derive(Debug, Clone, Serialize)]
pub struct StoredPaymentEvent {
    pub id: Uuid,
    pub transaction_id: String,
    pub amount: MinorAmount,
    pub currency: CurrencyCode,
    pub status: EventStatus,
    pub timestamp: DateTime<Utc>,
    pub source: EventSource,
    pub customer_email: Option<String>,
    pub raw_event: serde_json::Value,
    pub webhook_id: String,
    pub metadata: serde_json::Value,
    pub fingerprint: Fingerprint,
    pub processed_at: DateTime<Utc>,
}
