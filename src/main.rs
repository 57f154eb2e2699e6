use std::sync::Arc;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use bookdesk::config::AppConfig;
use bookdesk::db;
use bookdesk::handlers;
use bookdesk::services::clock::SystemClock;
use bookdesk::services::notifier::smtp::SmtpNotifier;
use bookdesk::services::store::rest::RestStore;
use bookdesk::services::store::RecordStore;
use bookdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut config = AppConfig::from_env();

    if config.session_secret.is_empty() {
        tracing::warn!("SESSION_SECRET not set, admin sessions will not survive a restart");
        config.session_secret = uuid::Uuid::new_v4().to_string();
    }

    if config.admin_password.is_empty() {
        tracing::warn!("ADMIN_PASSWORD not set, admin login is disabled unless a password was saved");
    }

    let store: Arc<dyn RecordStore> = match config.record_store.as_str() {
        "rest" | "supabase" => {
            anyhow::ensure!(
                !config.supabase_url.is_empty() && !config.supabase_key.is_empty(),
                "SUPABASE_URL and SUPABASE_KEY must be set when RECORD_STORE=rest"
            );
            tracing::info!("using hosted record store (url: {})", config.supabase_url);
            Arc::new(RestStore::new(
                config.supabase_url.clone(),
                config.supabase_key.clone(),
            ))
        }
        _ => {
            tracing::info!("using SQLite record store (path: {})", config.database_url);
            Arc::new(db::open_store(&config.database_url)?)
        }
    };

    let notifier = SmtpNotifier::new(
        &config.smtp_server,
        config.smtp_port,
        &config.email_address,
        &config.email_password,
    )?;

    let cors = match config.cors_origin.as_str() {
        "*" => CorsLayer::new().allow_origin(Any),
        origin => CorsLayer::new().allow_origin(origin.parse::<HeaderValue>()?),
    }
    .allow_methods(Any)
    .allow_headers(Any);

    let port = config.port;
    let state = Arc::new(AppState::new(
        config,
        store,
        Arc::new(notifier),
        Arc::new(SystemClock),
    ));

    let app = handlers::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
