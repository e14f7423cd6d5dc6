//! Ambient configuration, loaded from the environment (§A.3). The
//! algorithm-specific configuration of §4.8 is a separate, uploaded,
//! content-validated structure (`matching::AlgorithmConfig`) and is not
//! loaded from here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub matching: MatchingConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Core-relevant environment per §6: the default algorithm label is the only
/// matching knob consumed from process configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub default_algorithm_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub service_name: String,
    pub otlp_endpoint: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                request_timeout_secs: 30,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/mpi_linkage".to_string(),
                max_connections: 10,
                min_connections: 2,
            },
            matching: MatchingConfig {
                default_algorithm_label: "dibbs-default".to_string(),
            },
            observability: ObservabilityConfig {
                service_name: "mpi-linkage".to_string(),
                otlp_endpoint: "http://localhost:4317".to_string(),
                log_level: "info".to_string(),
            },
        }
    }
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(host) = std::env::var("MPI_SERVER_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("MPI_SERVER_PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| crate::Error::Config(format!("invalid MPI_SERVER_PORT: {port}")))?;
        }
        if let Ok(timeout) = std::env::var("MPI_REQUEST_TIMEOUT_SECS") {
            config.server.request_timeout_secs = timeout.parse().map_err(|_| {
                crate::Error::Config(format!("invalid MPI_REQUEST_TIMEOUT_SECS: {timeout}"))
            })?;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = url;
        }
        if let Ok(max) = std::env::var("MPI_DB_MAX_CONNECTIONS") {
            config.database.max_connections = max.parse().map_err(|_| {
                crate::Error::Config(format!("invalid MPI_DB_MAX_CONNECTIONS: {max}"))
            })?;
        }
        if let Ok(label) = std::env::var("MPI_DEFAULT_ALGORITHM") {
            config.matching.default_algorithm_label = label;
        }
        if let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
            config.observability.otlp_endpoint = endpoint;
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.observability.log_level = level;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reference_dibbs_default_algorithm() {
        assert_eq!(Config::default().matching.default_algorithm_label, "dibbs-default");
    }
}
