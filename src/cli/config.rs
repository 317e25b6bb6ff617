//! Configuration file

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::http_server::HttpServerConfig;
use crate::observability::Severity;

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database URL, e.g. `sqlite://culturemesh.db` (required)
    pub database_url: String,

    /// Connection pool size (optional, default 5)
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Keys accepted on the network endpoints (at least one)
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Minimum log severity (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// HTTP listener
    #[serde(default)]
    pub http: HttpServerConfig,
}

fn default_max_connections() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.database_url.trim().is_empty() {
            return Err(CliError::config_error("database_url must not be empty"));
        }

        if self.max_connections == 0 {
            return Err(CliError::config_error("max_connections must be > 0"));
        }

        if self.api_keys.iter().all(|key| key.is_empty()) {
            return Err(CliError::config_error("at least one API key is required"));
        }

        self.severity()?;

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| CliError::config_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, value: serde_json::Value) -> std::path::PathBuf {
        let path = dir.path().join("culturemesh.json");
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[test]
    fn test_config_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            json!({"database_url": "sqlite://cm.db", "api_keys": ["k1"]}),
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.http, HttpServerConfig::default());
        assert_eq!(config.severity().unwrap(), Severity::Info);
    }

    #[test]
    fn test_config_requires_api_key() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, json!({"database_url": "sqlite://cm.db", "api_keys": [""]}));

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let dir = TempDir::new().unwrap();
        for value in [
            json!({"database_url": "", "api_keys": ["k"]}),
            json!({"database_url": "sqlite://cm.db", "api_keys": ["k"], "max_connections": 0}),
            json!({"database_url": "sqlite://cm.db", "api_keys": ["k"], "log_level": "loud"}),
            json!({"api_keys": ["k"]}),
        ] {
            let path = write_config(&dir, value.clone());
            assert!(Config::load(&path).is_err(), "accepted {}", value);
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.message().contains("Failed to read config"));
    }
}
