use {
    axum::extract::DefaultBodyLimit,
    pay_ledger::{
        AppState, adapters::webhook::webhook_router, infra::postgres::PgLedgerStore,
        services::ingest::WebhookSecrets,
    },
    sqlx::postgres::PgPoolOptions,
    std::{env, sync::Arc, time::Duration},
    tokio::signal,
    tower_http::timeout::TimeoutLayer,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    // Secrets never default — a guessable value would make every
    // signature check meaningless.
    let stripe_secret =
        env::var("STRIPE_WEBHOOK_SECRET").expect("STRIPE_WEBHOOK_SECRET must be set");
    let airwallex_secret =
        env::var("AIRWALLEX_WEBHOOK_SECRET").expect("AIRWALLEX_WEBHOOK_SECRET must be set");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&database_url)
        .await
        .expect("failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    let state = AppState {
        store: Arc::new(PgLedgerStore::new(pool)),
        secrets: WebhookSecrets {
            stripe: stripe_secret.into(),
            airwallex: airwallex_secret.into(),
        },
    };

    let app = webhook_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(15)))
        .layer(DefaultBodyLimit::max(64 * 1024)); // provider events are typically <20 KB

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    tracing::info!("listening on 0.0.0.0:3000");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
