//! HTTP listener settings, read from the `http` section of the config file.

use std::io;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Browser origins allowed to call the API. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl HttpServerConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Replace the port when the command line gave one
    pub fn override_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// `host:port` as written in the config
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parsed listen address. `host` must be an IP literal.
    pub fn listen_addr(&self) -> io::Result<SocketAddr> {
        self.socket_addr().parse().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid socket address {}", self.socket_addr()),
            )
        })
    }

    /// CORS policy for the configured origins. Origins that are not valid
    /// header values are skipped.
    pub fn cors_layer(&self) -> CorsLayer {
        let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

        if self.cors_origins.is_empty() {
            return layer.allow_origin(Any);
        }

        let origins: Vec<_> = self
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_partial_json() {
        let config: HttpServerConfig = serde_json::from_str(r#"{"port": 9000}"#).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_override_port() {
        let config = HttpServerConfig::with_port(5000);
        assert_eq!(config.clone().override_port(None).port, 5000);
        assert_eq!(config.override_port(Some(7000)).socket_addr(), "0.0.0.0:7000");
    }

    #[test]
    fn test_listen_addr() {
        let config = HttpServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8081,
            cors_origins: Vec::new(),
        };
        assert_eq!(config.listen_addr().unwrap().port(), 8081);

        let bad = HttpServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        let err = bad.listen_addr().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
