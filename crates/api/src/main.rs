use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixelift_api::config::ServerConfig;
use pixelift_api::router::build_app_router;
use pixelift_api::state::AppState;
use pixelift_db::store::{MemoryStorage, PgStorage, SharedStorage, StorageBackend};
use pixelift_worker::delay::RandomDelay;
use pixelift_worker::processor::EnhancementProcessor;
use pixelift_worker::queue::WorkerPool;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pixelift_api=debug,pixelift_worker=debug,pixelift_db=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        backend = ?config.storage_backend,
        upload_dir = %config.upload_dir.display(),
        "Loaded server configuration",
    );

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .expect("Failed to create upload directory");

    // --- Record store ---
    let store = build_store(&config).await;

    // --- Worker pool ---
    let (min_delay, max_delay) = config.processing_delay_bounds();
    let processor = EnhancementProcessor::new(Arc::new(RandomDelay::new(min_delay, max_delay)));
    let worker_cancel = CancellationToken::new();
    let (queue, worker_pool) = WorkerPool::start(
        Arc::clone(&store),
        processor,
        config.queue_config(),
        worker_cancel,
    );

    // --- App state ---
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        queue,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    worker_pool
        .shutdown(Duration::from_secs(config.shutdown_timeout_secs))
        .await;

    tracing::info!("Shutdown complete");
}

/// Construct the configured record store, connecting and migrating when
/// Postgres is selected.
async fn build_store(config: &ServerConfig) -> SharedStorage {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory record store");
            Arc::new(MemoryStorage::new())
        }
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL must be set when STORAGE_BACKEND=postgres");

            let pool = pixelift_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            pixelift_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            pixelift_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgStorage::new(pool))
        }
    }
}

/// Wait for SIGINT (Ctrl-C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
