use std::path::PathBuf;
use std::time::Duration;

use pixelift_core::upload::DEFAULT_MAX_UPLOAD_BYTES;
use pixelift_db::store::StorageBackend;
use pixelift_worker::queue::{QueueConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_COUNT};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins for `/api`, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for busy workers (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Which record store to construct (default: memory).
    pub storage_backend: StorageBackend,
    /// Required when `storage_backend` is Postgres.
    pub database_url: Option<String>,
    /// Flat directory holding uploads and enhanced outputs (default: `uploads`).
    pub upload_dir: PathBuf,
    /// Largest accepted image in bytes (default: 50 MiB).
    pub max_upload_bytes: usize,
    /// Background worker count (default: `4`).
    pub worker_count: usize,
    /// Jobs allowed to wait for a worker (default: `64`).
    pub queue_capacity: usize,
    /// Lower bound of the simulated processing time (default: `2000`).
    pub processing_delay_min_ms: u64,
    /// Upper bound of the simulated processing time (default: `5000`).
    pub processing_delay_max_ms: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                       |
    /// | `STORAGE_BACKEND`         | `memory`                   |
    /// | `DATABASE_URL`            | unset                      |
    /// | `UPLOAD_DIR`              | `uploads`                  |
    /// | `MAX_UPLOAD_BYTES`        | `52428800`                 |
    /// | `WORKER_COUNT`            | `4`                        |
    /// | `QUEUE_CAPACITY`          | `64`                       |
    /// | `PROCESSING_DELAY_MIN_MS` | `2000`                     |
    /// | `PROCESSING_DELAY_MAX_MS` | `5000`                     |
    ///
    /// Panics on unparseable values: misconfiguration should stop startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = parse_env("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let storage_backend: StorageBackend = std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "memory".into())
            .parse()
            .unwrap_or_else(|e| panic!("STORAGE_BACKEND is invalid: {e}"));

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        let upload_dir =
            PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: parse_env("SHUTDOWN_TIMEOUT_SECS", 30),
            storage_backend,
            database_url,
            upload_dir,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            worker_count: parse_env("WORKER_COUNT", DEFAULT_WORKER_COUNT),
            queue_capacity: parse_env("QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY),
            processing_delay_min_ms: parse_env("PROCESSING_DELAY_MIN_MS", 2000),
            processing_delay_max_ms: parse_env("PROCESSING_DELAY_MAX_MS", 5000),
        }
    }

    /// Worker pool sizing derived from this configuration.
    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            worker_count: self.worker_count,
            capacity: self.queue_capacity,
        }
    }

    /// Simulated processing time bounds.
    pub fn processing_delay_bounds(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.processing_delay_min_ms),
            Duration::from_millis(self.processing_delay_max_ms),
        )
    }

    /// Request body cap: the image limit plus room for multipart framing
    /// and the small text fields.
    pub fn body_limit_bytes(&self) -> usize {
        self.max_upload_bytes.saturating_add(1024 * 1024)
    }
}

fn parse_env<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be valid: {e}")),
        Err(_) => default,
    }
}
