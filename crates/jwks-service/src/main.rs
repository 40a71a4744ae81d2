use jwks_service::config::{Config, LogFormat};
use jwks_service::observability::init_metrics_recorder;
use jwks_service::repositories::KeyStore;
use jwks_service::routes::{self, AppState};
use jwks_service::services::KeyIssuer;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    init_tracing(config.log_format);

    info!("Starting JWKS server");

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics: {}", e);
        e
    })?;

    // Open (or create) the key database
    info!("Opening key database...");
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|e| {
            error!("Invalid database URL: {}", e);
            e
        })?
        .create_if_missing(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            error!("Failed to open database: {}", e);
            e
        })?;

    // Clear the store and seed one expired and one valid key. Serving with
    // no keys is not an option, so any failure aborts startup.
    let store = KeyStore::new(db_pool);
    store.initialize().await.map_err(|e| {
        error!("Failed to initialize key store: {}", e);
        e
    })?;

    let issuer = KeyIssuer::new(store);
    let seeded = issuer.bootstrap().await.map_err(|e| {
        error!("Failed to bootstrap signing keys: {}", e);
        e
    })?;

    info!(
        expired_kid = seeded.expired_kid,
        valid_kid = seeded.valid_kid,
        "Signing keys initialized"
    );

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    let state = Arc::new(AppState { issuer });
    let app = routes::build_routes(state, metrics_handle);

    info!("JWKS server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("JWKS server stopped");

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "jwks_service=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        // Keep serving until the process is killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
