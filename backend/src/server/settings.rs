//! Process settings loaded via OrthoConfig.
//!
//! Values come from `MARKETS_*` environment variables, an optional
//! configuration file and command-line flags, in ascending precedence.

use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_POOL_TIMEOUT_SECS: u64 = 30;

/// Settings controlling the HTTP listener and the market store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MARKETS")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL for the market store.
    pub database_url: Option<String>,
    /// Maximum number of pooled connections.
    pub pool_max_size: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub pool_timeout_secs: Option<u64>,
    /// Apply embedded migrations before serving traffic.
    #[ortho_config(default = false)]
    pub run_migrations: bool,
    /// Upper bound, in milliseconds, for a single create or update.
    pub command_timeout_ms: Option<u64>,
}

impl ServerSettings {
    /// Parse the configured listener address, falling back to port 8080.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR).parse()
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    pub fn pool_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_timeout_secs.unwrap_or(DEFAULT_POOL_TIMEOUT_SECS))
    }

    /// Command deadline; zero disables it.
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_ms
            .filter(|millis| *millis > 0)
            .map(Duration::from_millis)
    }
}
