//! Server configuration from environment variables

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::Level;

/// Default host address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port number
pub const DEFAULT_PORT: u16 = 8080;

/// Default course info cache TTL (one hour)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Path to the SQLite student database
    pub db_path: String,
    /// Directory holding `colleges/*.json` and `prerequisites.json`. The
    /// builtin data is used when unset.
    pub requirements_dir: Option<PathBuf>,
    /// TTL for catalog records; placeholders use a shorter fixed TTL
    pub cache_ttl_secs: u64,
    /// Log level for tracing
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path: "gatorplan.db".to_string(),
            requirements_dir: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load config from environment variables with fallback to defaults
    ///
    /// Environment variables:
    /// - `GATORPLAN_HOST` - Server host
    /// - `GATORPLAN_PORT` - Server port
    /// - `GATORPLAN_DB_PATH` - Database path
    /// - `GATORPLAN_REQUIREMENTS_DIR` - Requirement data directory
    /// - `GATORPLAN_CACHE_TTL_SECS` - Course info cache TTL in seconds
    /// - `GATORPLAN_LOG_LEVEL` - Log level (trace, debug, info, warn, error)
    ///
    /// Unparseable numbers keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(host) = lookup("GATORPLAN_HOST") {
            config.host = host;
        }

        if let Some(port) = lookup("GATORPLAN_PORT").and_then(|p| p.parse::<u16>().ok()) {
            config.port = port;
        }

        if let Some(db_path) = lookup("GATORPLAN_DB_PATH") {
            config.db_path = db_path;
        }

        if let Some(dir) = lookup("GATORPLAN_REQUIREMENTS_DIR").filter(|d| !d.trim().is_empty()) {
            config.requirements_dir = Some(PathBuf::from(dir));
        }

        if let Some(ttl) = lookup("GATORPLAN_CACHE_TTL_SECS").and_then(|t| t.parse::<u64>().ok())
        {
            config.cache_ttl_secs = ttl;
        }

        if let Some(log_level) = lookup("GATORPLAN_LOG_LEVEL") {
            config.log_level = log_level;
        }

        config
    }

    /// Get the socket address for the server
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid address: {}", e))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn tracing_level(&self) -> Result<Level, String> {
        Level::from_str(self.log_level.trim())
            .map_err(|_| format!("Unknown log level: {}", self.log_level))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port cannot be zero".to_string());
        }

        if self.host.is_empty() {
            return Err("Host cannot be empty".to_string());
        }

        if self.db_path.trim().is_empty() {
            return Err("Database path cannot be empty".to_string());
        }

        if self.cache_ttl_secs == 0 {
            return Err("Cache TTL must be greater than zero".to_string());
        }

        if let Some(dir) = &self.requirements_dir {
            if !dir.is_dir() {
                return Err(format!(
                    "Requirements directory {} does not exist",
                    dir.display()
                ));
            }
        }

        self.tracing_level()?;
        self.socket_addr()?;
        Ok(())
    }
}
