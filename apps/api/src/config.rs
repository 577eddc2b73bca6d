//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! ## Variables
//! ```text
//! HTTP_PORT                    8080
//! BIND_ADDR                    0.0.0.0
//! DATABASE_PATH                voyage.db
//! DATABASE_MAX_CONNECTIONS     5
//! REDIS_URL                    (unset = in-process cache)
//! CACHE_TTL_<RESOURCE>_SECS    per-resource TTL override, e.g. CACHE_TTL_TRIPS_SECS
//! DEFAULT_COMMISSION_RATE      15   (percent)
//! SERVICE_FEE_RATE             5    (percent)
//! TAX_RATE                     0    (percent)
//! ```

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use voyage_cache::{CacheResource, TtlTable};
use voyage_core::types::Percentage;

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP server port
    pub http_port: u16,

    /// Interface to bind
    pub bind_addr: IpAddr,

    /// SQLite database file
    pub database_path: PathBuf,

    pub database_max_connections: u32,

    /// Redis connection string (optional)
    pub redis_url: Option<String>,

    /// Per-resource cache TTLs
    pub cache_ttls: TtlTable,

    /// Commission applied by `/payouts/quote` when the request has none
    pub default_commission_rate: Percentage,

    /// Service fee applied by `/bookings/price` when the request has none
    pub service_fee_rate: Percentage,

    /// Tax applied by `/bookings/price` when the request has none
    pub tax_rate: Percentage,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source. `load` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let mut cache_ttls = TtlTable::new();
        for resource in CacheResource::ALL {
            let name = format!("CACHE_TTL_{}_SECS", resource.as_str().to_uppercase());
            if let Some(raw) = lookup(&name) {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(name.clone()))?;
                cache_ttls = cache_ttls.with_override(resource, Duration::from_secs(secs));
            }
        }

        let config = ApiConfig {
            http_port: var("HTTP_PORT", "8080")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            bind_addr: var("BIND_ADDR", "0.0.0.0")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BIND_ADDR".to_string()))?,

            database_path: PathBuf::from(var("DATABASE_PATH", "voyage.db")),

            database_max_connections: var("DATABASE_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()))?,

            redis_url: lookup("REDIS_URL").filter(|url| !url.trim().is_empty()),

            cache_ttls,

            default_commission_rate: rate(&var("DEFAULT_COMMISSION_RATE", "15"), "DEFAULT_COMMISSION_RATE")?,
            service_fee_rate: rate(&var("SERVICE_FEE_RATE", "5"), "SERVICE_FEE_RATE")?,
            tax_rate: rate(&var("TAX_RATE", "0"), "TAX_RATE")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks combinations a single parse cannot catch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http_port == 0 {
            return Err(ConfigError::InvalidValue("HTTP_PORT".to_string()));
        }

        if self.database_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "DATABASE_MAX_CONNECTIONS".to_string(),
            ));
        }

        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("DATABASE_PATH".to_string()));
        }

        if let Some(url) = &self.redis_url {
            if !(url.starts_with("redis://") || url.starts_with("rediss://")) {
                return Err(ConfigError::InvalidValue("REDIS_URL".to_string()));
            }
        }

        for resource in CacheResource::ALL {
            if self.cache_ttls.ttl(resource).is_zero() {
                return Err(ConfigError::InvalidValue(format!(
                    "CACHE_TTL_{}_SECS",
                    resource.as_str().to_uppercase()
                )));
            }
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }
}

fn rate(raw: &str, name: &str) -> Result<Percentage, ConfigError> {
    let pct: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))?;
    Percentage::from_percentage(name, pct).map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
