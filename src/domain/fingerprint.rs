use {
    super::{
        event::EventSource,
        money::{CurrencyCode, MinorAmount},
    },
    derive_more::Display,
    serde::{Deserialize, Serialize},
    sha2::{Digest, Sha256},
};

/// Idempotency key: hex SHA-256 over the identifying fields of an event.
/// A pure function of its inputs — recomputing for logically identical
/// input always yields the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn derive(
        transaction_id: &str,
        amount: MinorAmount,
        currency: &CurrencyCode,
        source: EventSource,
    ) -> Self {
        let input = format!(
            "{transaction_id}-{}-{}-{}",
            amount.minor_units(),
            currency.as_str(),
            source.as_str(),
        );
        Self(hex::encode(Sha256::digest(input.as_bytes())))
    }

    /// Wraps an already-derived value read back from storage.
    pub fn from_stored(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
