use {
    super::store::{InsertOutcome, LedgerStore, StoreFuture},
    crate::domain::{
        event::{NewPaymentEvent, StoredPaymentEvent},
        fingerprint::Fingerprint,
    },
    std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    },
};

/// Mutex-backed ledger for tests and local development. One lock covers
/// the contains-check and the insert, so concurrent deliveries of the
/// same fingerprint observe exactly one winner, matching the behavior of
/// the Postgres unique index.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    events: Arc<Mutex<HashMap<String, StoredPaymentEvent>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("ledger lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerStore for InMemoryLedger {
    fn find_by_fingerprint<'a>(
        &'a self,
        fingerprint: &'a Fingerprint,
    ) -> StoreFuture<'a, Option<StoredPaymentEvent>> {
        Box::pin(async move {
            let events = self.events.lock().expect("ledger lock poisoned");
            Ok(events.get(fingerprint.as_str()).cloned())
        })
    }

    fn insert_unique(&self, event: NewPaymentEvent) -> StoreFuture<'_, InsertOutcome> {
        Box::pin(async move {
            let mut events = self.events.lock().expect("ledger lock poisoned");
            let key = event.fingerprint().as_str().to_string();
            if events.contains_key(&key) {
                return Ok(InsertOutcome::Conflict);
            }
            let stored = event.into_stored();
            events.insert(key, stored.clone());
            Ok(InsertOutcome::Inserted(stored))
        })
    }
}
