use {
    super::store::{InsertOutcome, LedgerStore, StoreFuture},
    crate::domain::{
        error::WebhookError,
        event::{EventSource, EventStatus, NewPaymentEvent, StoredPaymentEvent},
        fingerprint::Fingerprint,
        money::{CurrencyCode, MinorAmount},
    },
    chrono::{DateTime, Utc},
    sqlx::{PgPool, Row, postgres::PgRow},
    uuid::Uuid,
};

/// Ledger backed by the `payment_events` table. The UNIQUE index over
/// `fingerprint` (see migrations) is the final idempotency guarantee:
/// a unique violation on insert surfaces as `InsertOutcome::Conflict`.
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_event(row: PgRow) -> Result<StoredPaymentEvent, WebhookError> {
    let id: Uuid = row.try_get("id")?;
    let transaction_id: String = row.try_get("transaction_id")?;
    let amount: i64 = row.try_get("amount")?;
    let currency: String = row.try_get("currency")?;
    let status: String = row.try_get("status")?;
    let occurred_at: DateTime<Utc> = row.try_get("occurred_at")?;
    let source: String = row.try_get("source")?;
    let customer_email: Option<String> = row.try_get("customer_email")?;
    let raw_event: serde_json::Value = row.try_get("raw_event")?;
    let webhook_id: String = row.try_get("webhook_id")?;
    let metadata: serde_json::Value = row.try_get("metadata")?;
    let fingerprint: String = row.try_get("fingerprint")?;
    let processed_at: DateTime<Utc> = row.try_get("processed_at")?;

    Ok(StoredPaymentEvent {
        id,
        transaction_id,
        amount: MinorAmount::new(amount)?,
        currency: CurrencyCode::new(&currency)?,
        status: EventStatus::try_from(status.as_str())?,
        timestamp: occurred_at,
        source: EventSource::try_from(source.as_str())?,
        customer_email,
        raw_event,
        webhook_id,
        metadata,
        fingerprint: Fingerprint::from_stored(fingerprint),
        processed_at,
    })
}

impl LedgerStore for PgLedgerStore {
    fn find_by_fingerprint<'a>(
        &'a self,
        fingerprint: &'a Fingerprint,
    ) -> StoreFuture<'a, Option<StoredPaymentEvent>> {
        Box::pin(async move {
            let row = sqlx::query(
                r#"
                SELECT id, transaction_id, amount, currency, status, occurred_at,
                       source, customer_email, raw_event, webhook_id, metadata,
                       fingerprint, processed_at
                FROM payment_events
                WHERE fingerprint = $1
                "#,
            )
            .bind(fingerprint.as_str())
            .fetch_optional(&self.pool)
            .await?;

            row.map(row_to_event).transpose()
        })
    }

    fn insert_unique(&self, event: NewPaymentEvent) -> StoreFuture<'_, InsertOutcome> {
        Box::pin(async move {
            let stored = event.into_stored();

            let result = sqlx::query(
                r#"
                INSERT INTO payment_events
                    (id, transaction_id, amount, currency, status, occurred_at,
                     source, customer_email, raw_event, webhook_id, metadata,
                     fingerprint, processed_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(stored.id)
            .bind(&stored.transaction_id)
            .bind(stored.amount.minor_units())
            .bind(stored.currency.as_str())
            .bind(stored.status.as_str())
            .bind(stored.timestamp)
            .bind(stored.source.as_str())
            .bind(&stored.customer_email)
            .bind(&stored.raw_event)
            .bind(&stored.webhook_id)
            .bind(&stored.metadata)
            .bind(stored.fingerprint.as_str())
            .bind(stored.processed_at)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => Ok(InsertOutcome::Inserted(stored)),
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    Ok(InsertOutcome::Conflict)
                }
                Err(other) => Err(other.into()),
            }
        })
    }
}
