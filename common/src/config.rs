//! Service configuration.
//!
//! Values are read from environment variables (optionally seeded from a
//! `.env` file). Missing or unparsable values fall back to defaults.

use std::str::FromStr;

use crate::errors::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_MAX_REQUEST_QUANTITY: usize = 100;

/// Which record store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local store; contents are lost on restart.
    Memory,
    /// PostgreSQL via `DATABASE_URL`.
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            other => Err(AppError::Config(format!("unknown store backend: {}", other))),
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Postgres => write!(f, "postgres"),
        }
    }
}

/// Application configuration shared by all services.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Name used in logs and response metadata.
    pub service_name: String,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Record store backend.
    pub store_backend: StoreBackend,
    /// Connection string for the Postgres backend.
    pub database_url: Option<String>,
    /// Maximum pool connections for the Postgres backend.
    pub max_connections: u32,
    /// Connect/acquire timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Upper bound on identifiers per request accepted at the HTTP boundary.
    pub max_request_quantity: usize,
    /// Whether the store rejects commits that reuse an assigned identifier.
    pub enforce_unique_identifiers: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: String::from("assignment-service"),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store_backend: StoreBackend::Memory,
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            max_request_quantity: DEFAULT_MAX_REQUEST_QUANTITY,
            enforce_unique_identifiers: true,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the environment for the named service.
    pub fn load_with_service(service_name: &str) -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(service_name, |key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(service_name: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let store_backend = match lookup("STORE_BACKEND") {
            Some(raw) => raw.parse().unwrap_or_else(|e: AppError| {
                tracing::warn!(error = %e, "falling back to memory store");
                StoreBackend::Memory
            }),
            None => defaults.store_backend,
        };

        Self {
            service_name: service_name.to_string(),
            host: lookup("SERVER_HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "SERVER_PORT", defaults.port),
            store_backend,
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections),
            connect_timeout_secs: parse_or(
                &lookup,
                "DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            ),
            max_request_quantity: parse_or(
                &lookup,
                "MAX_REQUEST_QUANTITY",
                defaults.max_request_quantity,
            ),
            enforce_unique_identifiers: parse_or(
                &lookup,
                "ENFORCE_UNIQUE_IDENTIFIERS",
                defaults.enforce_unique_identifiers,
            ),
        }
    }

    /// Returns the database URL required by the Postgres backend.
    pub fn require_database_url(&self) -> Result<&str, AppError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| AppError::Config("DATABASE_URL must be set for the postgres backend".into()))
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
