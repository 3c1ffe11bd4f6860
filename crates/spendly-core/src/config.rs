//! Application configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/spendly/config/spendly.toml)
//! 2. Embedded defaults (compiled into binary)
//!
//! The forecasting policy itself (threshold, horizon, priors) is fixed in
//! code; only server, storage and solver-budget settings live here.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::forecast::FitOptions;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/spendly.toml");

/// HTTP server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Upper bound on a whole prediction request
    pub request_timeout: Duration,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            request_timeout: Duration::from_secs(30),
            allowed_origins: vec![],
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub database_path: PathBuf,
    pub fit: FitOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            database_path: PathBuf::from("spendly.db"),
            fit: FitOptions::default(),
        }
    }
}

impl AppConfig {
    /// Load from an explicit path, the data-dir override, or the embedded default
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(default_path) => fs::read_to_string(&default_path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", default_path.display(), e))
                })?,
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        Self::from_toml(&content)
    }

    /// Parse TOML, keeping defaults for anything not set
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = AppConfig::default();

        if let Some(server) = raw.server {
            if let Some(host) = server.host {
                config.server.host = host;
            }
            if let Some(port) = server.port {
                config.server.port = port;
            }
            if let Some(secs) = server.request_timeout_secs {
                if secs == 0 {
                    return Err(Error::Config(
                        "server.request_timeout_secs must be positive".to_string(),
                    ));
                }
                config.server.request_timeout = Duration::from_secs(secs);
            }
            if let Some(origins) = server.allowed_origins {
                config.server.allowed_origins = origins;
            }
        }

        if let Some(database) = raw.database {
            if let Some(path) = database.path {
                config.database_path = path;
            }
        }

        if let Some(fit) = raw.fit {
            if let Some(max_iterations) = fit.max_iterations {
                if max_iterations == 0 {
                    return Err(Error::Config(
                        "fit.max_iterations must be positive".to_string(),
                    ));
                }
                config.fit.max_iterations = max_iterations;
            }
            if let Some(tolerance) = fit.tolerance {
                if !(tolerance > 0.0 && tolerance.is_finite()) {
                    return Err(Error::Config(
                        "fit.tolerance must be a positive number".to_string(),
                    ));
                }
                config.fit.tolerance = tolerance;
            }
        }

        Ok(config)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendly").join("config").join("spendly.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    server: Option<RawServer>,
    database: Option<RawDatabase>,
    fit: Option<RawFit>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
    request_timeout_secs: Option<u64>,
    allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawDatabase {
    path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawFit {
    max_iterations: Option<usize>,
    tolerance: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_default_parses() {
        let config = AppConfig::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            port = 8080

            [fit]
            max_iterations = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.fit.max_iterations, 50);
        assert_eq!(config.fit.tolerance, FitOptions::default().tolerance);
        assert_eq!(config.database_path, PathBuf::from("spendly.db"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(AppConfig::from_toml("[server]\nrequest_timeout_secs = 0").is_err());
        assert!(AppConfig::from_toml("[fit]\ntolerance = -1.0").is_err());
        assert!(AppConfig::from_toml("[server]\nport = \"eighty\"").is_err());
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\npath = \"/var/lib/spendly/data.db\"").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/spendly/data.db"));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/spendly.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
