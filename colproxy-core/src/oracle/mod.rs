//! Client side of the metadata oracle protocol.
//!
//! # Module Structure
//! - `config`: Oracle address and timeouts
//! - `protocol`: Response body classification
//!
//! One lookup is one GET to `/macro?name=get_columns_in_relation&db=..&schema=..&table=..`.
//! The full body is read as text and classified. Transport failures,
//! timeouts and non-success statuses are errors; they never turn into a
//! deferred outcome.

pub mod config;
pub mod protocol;

pub use config::OracleConfig;
pub use protocol::classify;

use crate::error::ColProxyError;
use crate::models::ResolutionOutcome;
use crate::relation::NormalizedKey;
use crate::Result;
use async_trait::async_trait;
use url::Url;

/// Source of column-metadata answers consulted before the real adapter.
///
/// Object-safe, so resolvers hold it as `Arc<dyn MetadataOracle>`.
#[async_trait]
pub trait MetadataOracle: Send + Sync {
    /// Looks up a normalized relation key.
    ///
    /// # Errors
    /// Returns error if the oracle is unreachable, times out, answers with
    /// a failure status, or sends a body that cannot be classified
    async fn lookup(&self, key: &NormalizedKey) -> Result<ResolutionOutcome>;
}

/// HTTP oracle client with explicit connect and request timeouts.
#[derive(Debug, Clone)]
pub struct HttpOracle {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpOracle {
    /// Creates a client for the oracle described by `config`.
    ///
    /// # Errors
    /// Returns error if the config is invalid or the HTTP client cannot be
    /// built
    pub fn new(config: OracleConfig) -> Result<Self> {
        config.validate()?;
        let base_url = config.base_url()?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .no_proxy()
            .user_agent(concat!("colproxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ColProxyError::configuration(format!("failed to build oracle client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
        })
    }

    /// Builds the full lookup URL for `key`.
    pub fn lookup_url(&self, key: &NormalizedKey) -> Url {
        let mut url = self.base_url.clone();
        key.append_query(&mut url);
        url
    }
}

#[async_trait]
impl MetadataOracle for HttpOracle {
    async fn lookup(&self, key: &NormalizedKey) -> Result<ResolutionOutcome> {
        let relation = key.to_string();
        tracing::trace!(relation = %relation, "querying oracle");

        let response = self
            .client
            .get(self.lookup_url(key))
            .send()
            .await
            .map_err(|e| ColProxyError::from_transport(e, &relation))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ColProxyError::OracleStatus {
                status: status.as_u16(),
                relation,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ColProxyError::from_transport(e, &relation))?;

        let outcome = classify(&body, &relation)?;
        tracing::debug!(relation = %relation, outcome = outcome.label(), "oracle answered");
        Ok(outcome)
    }
}
