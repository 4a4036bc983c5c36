pub mod adapters;
pub mod domain;
pub mod infra;
pub mod providers;
pub mod services;

use {crate::infra::store::LedgerStore, crate::services::ingest::WebhookSecrets, std::sync::Arc};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub secrets: WebhookSecrets,
}
