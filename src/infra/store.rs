use {
    crate::domain::{
        error::WebhookError,
        event::{NewPaymentEvent, StoredPaymentEvent},
        fingerprint::Fingerprint,
    },
    std::{future::Future, pin::Pin},
};

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, WebhookError>> + Send + 'a>>;

#[derive(Debug)]
pub enum InsertOutcome {
    Inserted(StoredPaymentEvent),
    /// A record with the same fingerprint already exists. The uniqueness
    /// constraint is the final arbiter — callers downgrade this to a
    /// duplicate outcome, never a fatal error.
    Conflict,
}

/// The storage collaborator consumed by the ingestion pipeline. Both
/// operations are atomic at the single-record level; nothing spans the
/// check-then-insert window, so `insert_unique` alone guarantees
/// at-most-one record per fingerprint.
pub trait LedgerStore: Send + Sync {
    fn find_by_fingerprint<'a>(
        &'a self,
        fingerprint: &'a Fingerprint,
    ) -> StoreFuture<'a, Option<StoredPaymentEvent>>;

    fn insert_unique(&self, event: NewPaymentEvent) -> StoreFuture<'_, InsertOutcome>;
}
