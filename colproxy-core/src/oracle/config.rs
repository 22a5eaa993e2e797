//! Oracle connection configuration.
//!
//! This module provides the `OracleConfig` struct used to address the
//! local metadata oracle, with explicit timeouts.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default oracle host; the oracle always runs on the loopback interface.
pub const DEFAULT_ORACLE_HOST: &str = "localhost";

/// Default path of the oracle's lookup endpoint.
pub const DEFAULT_ORACLE_PATH: &str = "/macro";

/// Configuration for reaching the metadata oracle.
///
/// # Example
/// ```rust
/// use colproxy_core::oracle::OracleConfig;
/// use std::time::Duration;
///
/// let config = OracleConfig::new(3000)
///     .with_connect_timeout(Duration::from_secs(2));
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.base_url().unwrap().as_str(), "http://localhost:3000/macro");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Oracle host address
    pub host: String,
    /// Oracle port
    pub port: u16,
    /// Lookup endpoint path
    pub path: String,
    /// Time allowed to establish the connection
    pub connect_timeout: Duration,
    /// Time allowed for the whole request, body included
    pub request_timeout: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_ORACLE_HOST.to_string(),
            port: 0,
            path: DEFAULT_ORACLE_PATH.to_string(),
            connect_timeout: Duration::from_secs(5),
            // The oracle may analyze a whole model tree before answering
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl std::fmt::Display for OracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OracleConfig({}:{})", self.host, self.port)
    }
}

impl OracleConfig {
    /// Creates a config for the oracle on `port` with default timeouts.
    pub fn new(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Builder method to set host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Builder method to set the endpoint path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Builder method to set connect timeout.
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builder method to set request timeout.
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Validates oracle configuration parameters.
    ///
    /// # Errors
    /// Returns error if host is empty, port is 0, the path is not absolute,
    /// or either timeout is zero
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.trim().is_empty() {
            return Err(crate::error::ColProxyError::configuration(
                "oracle host cannot be empty",
            ));
        }

        if self.port == 0 {
            return Err(crate::error::ColProxyError::configuration(
                "oracle port must be greater than 0",
            ));
        }

        if !self.path.starts_with('/') {
            return Err(crate::error::ColProxyError::configuration(
                "oracle path must start with '/'",
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(crate::error::ColProxyError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(crate::error::ColProxyError::configuration(
                "request_timeout must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Builds the lookup endpoint URL without any query string.
    ///
    /// # Errors
    /// Returns a configuration error if host or path do not form a URL
    pub fn base_url(&self) -> crate::Result<Url> {
        let raw = format!("http://{}:{}{}", self.host, self.port, self.path);
        Url::parse(&raw).map_err(|e| {
            crate::error::ColProxyError::configuration(format!(
                "invalid oracle address {}: {}",
                self, e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_needs_port() {
        let config = OracleConfig::default();
        assert_eq!(config.host, "localhost");
        assert!(config.validate().is_err());

        assert!(OracleConfig::new(3000).validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(OracleConfig::new(3000).with_host("  ").validate().is_err());
        assert!(OracleConfig::new(3000).with_path("macro").validate().is_err());
        assert!(
            OracleConfig::new(3000)
                .with_connect_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            OracleConfig::new(3000)
                .with_request_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_base_url() {
        let url = OracleConfig::new(4123)
            .with_host("127.0.0.1")
            .base_url()
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:4123/macro");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_display_is_host_and_port_only() {
        let config = OracleConfig::new(3000).with_path("/secret-path");
        assert_eq!(config.to_string(), "OracleConfig(localhost:3000)");
    }
}
