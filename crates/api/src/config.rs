use std::time::Duration;

/// Default wait for a pooled connection, in milliseconds.
pub const DEFAULT_DB_ACQUIRE_TIMEOUT_MS: u64 = 1500;

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
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Shared secret for mutating endpoints. `None` leaves them open.
    pub admin_api_key: Option<String>,
    /// Wait for a pooled connection before a query fails (default: `1500`).
    pub db_acquire_timeout_ms: u64,
    /// Reachability probe attempts before a write gives up (default: `3`).
    pub db_probe_attempts: u32,
    /// Base probe backoff; attempt `n` waits `n * backoff` (default: `500`).
    pub db_probe_backoff_ms: u64,
    /// Upper bound for the batch image transaction (default: `30`).
    pub batch_timeout_secs: u64,
    /// Largest accepted request body (default: 32 MiB).
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `ADMIN_API_KEY`        | unset                      |
    /// | `DB_ACQUIRE_TIMEOUT_MS`| `1500`                     |
    /// | `DB_PROBE_ATTEMPTS`    | `3`                        |
    /// | `DB_PROBE_BACKOFF_MS`  | `500`                      |
    /// | `BATCH_TIMEOUT_SECS`   | `30`                       |
    /// | `MAX_BODY_BYTES`       | `33554432`                 |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = env_parse("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let admin_api_key = std::env::var("ADMIN_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        if admin_api_key.is_none() {
            tracing::warn!("ADMIN_API_KEY is not set; mutating endpoints are open");
        }

        let db_probe_attempts: u32 = env_parse("DB_PROBE_ATTEMPTS", 3);
        assert!(db_probe_attempts > 0, "DB_PROBE_ATTEMPTS must be at least 1");

        let request_timeout_secs: u64 = env_parse("REQUEST_TIMEOUT_SECS", 30);
        let db_acquire_timeout_ms: u64 =
            env_parse("DB_ACQUIRE_TIMEOUT_MS", DEFAULT_DB_ACQUIRE_TIMEOUT_MS);
        assert!(
            db_acquire_timeout_ms < request_timeout_secs.saturating_mul(1000),
            "DB_ACQUIRE_TIMEOUT_MS must be below REQUEST_TIMEOUT_SECS"
        );

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            admin_api_key,
            db_acquire_timeout_ms,
            db_probe_attempts,
            db_probe_backoff_ms: env_parse("DB_PROBE_BACKOFF_MS", 500),
            batch_timeout_secs: env_parse("BATCH_TIMEOUT_SECS", 30),
            max_body_bytes: env_parse("MAX_BODY_BYTES", 32 * 1024 * 1024),
        }
    }

    pub fn db_acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.db_acquire_timeout_ms)
    }

    pub fn probe_backoff(&self) -> Duration {
        Duration::from_millis(self.db_probe_backoff_ms)
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }
}

/// Parse an env var, falling back to `default` when unset.
///
/// Panics on a value that does not parse, so misconfiguration fails fast.
fn env_parse<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be a valid {}: {e}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}
