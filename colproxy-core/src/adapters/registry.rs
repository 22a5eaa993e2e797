//! Adapter factory and registration interception.
//!
//! The host engine registers one adapter per credential type while loading
//! a profile. `InterceptingFactory` decorates any `AdapterFactory`: it lets
//! the inner factory build the adapter first, then, for allow-listed
//! warehouse families, captures that fresh adapter and puts an
//! `OracleProxyResolver` in front of it.
//!
//! Re-registering a credential type captures the inner factory's new
//! adapter and replaces the previous wrapper. Wrappers never wrap
//! wrappers.

use super::{ColumnResolver, OracleProxyResolver, TypeTranslator, translator_for};
use crate::error::ColProxyError;
use crate::models::AdapterFamily;
use crate::oracle::MetadataOracle;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Credentials section of a profile target.
///
/// Only the fields the interceptor inspects are modelled; secrets stay
/// with the host engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Adapter credential type, e.g. `bigquery` or `snowflake`
    #[serde(rename = "type")]
    pub credentials_type: String,
    /// Default database (project) for the target
    #[serde(default)]
    pub database: Option<String>,
    /// Default schema (dataset) for the target
    #[serde(default)]
    pub schema: Option<String>,
}

/// Configuration handed to the factory when an adapter is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Profile the adapter is registered for
    pub profile_name: String,
    /// Target credentials
    pub credentials: Credentials,
}

impl AdapterConfig {
    /// Creates a config for `profile_name` with the given credential type.
    pub fn new(profile_name: impl Into<String>, credentials_type: impl Into<String>) -> Self {
        Self {
            profile_name: profile_name.into(),
            credentials: Credentials {
                credentials_type: credentials_type.into(),
                database: None,
                schema: None,
            },
        }
    }

    /// Lower-cased credential type, used as the registry key.
    pub fn credentials_key(&self) -> String {
        self.credentials.credentials_type.trim().to_lowercase()
    }
}

/// The host engine's adapter-registration extension point.
pub trait AdapterFactory: Send + Sync {
    /// Builds and registers the adapter for `config`'s credential type,
    /// replacing any adapter previously registered for it.
    ///
    /// # Errors
    /// Returns error if the adapter cannot be constructed
    fn register_adapter(&mut self, config: &AdapterConfig) -> Result<()>;

    /// Returns the adapter currently registered for `credentials_type`.
    fn lookup_adapter(&self, credentials_type: &str) -> Option<Arc<dyn ColumnResolver>>;
}

/// Constructor for one credential type's adapter.
pub type AdapterConstructor =
    Box<dyn Fn(&AdapterConfig) -> Result<Arc<dyn ColumnResolver>> + Send + Sync>;

/// In-memory adapter factory keyed by credential type.
#[derive(Default)]
pub struct AdapterRegistry {
    plugins: HashMap<String, AdapterConstructor>,
    adapters: HashMap<String, Arc<dyn ColumnResolver>>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut plugins: Vec<&String> = self.plugins.keys().collect();
        plugins.sort();
        let mut adapters: Vec<&String> = self.adapters.keys().collect();
        adapters.sort();
        f.debug_struct("AdapterRegistry")
            .field("plugins", &plugins)
            .field("adapters", &adapters)
            .finish()
    }
}

impl AdapterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add an adapter plugin for `credentials_type`.
    pub fn with_plugin<F>(mut self, credentials_type: &str, constructor: F) -> Self
    where
        F: Fn(&AdapterConfig) -> Result<Arc<dyn ColumnResolver>> + Send + Sync + 'static,
    {
        self.plugins.insert(
            credentials_type.trim().to_lowercase(),
            Box::new(constructor),
        );
        self
    }
}

impl AdapterFactory for AdapterRegistry {
    fn register_adapter(&mut self, config: &AdapterConfig) -> Result<()> {
        let key = config.credentials_key();
        let constructor = self.plugins.get(&key).ok_or_else(|| {
            ColProxyError::configuration(format!(
                "no adapter plugin for credential type '{}' (profile '{}')",
                config.credentials.credentials_type, config.profile_name
            ))
        })?;

        let adapter = constructor(config)?;
        debug!(profile = %config.profile_name, credentials_type = %key, "adapter registered");
        self.adapters.insert(key, adapter);
        Ok(())
    }

    fn lookup_adapter(&self, credentials_type: &str) -> Option<Arc<dyn ColumnResolver>> {
        self.adapters
            .get(&credentials_type.trim().to_lowercase())
            .cloned()
    }
}

/// Factory decorator that installs oracle interception on registration.
pub struct InterceptingFactory<F> {
    inner: F,
    oracle: Arc<dyn MetadataOracle>,
    families: Vec<AdapterFamily>,
    translators: HashMap<AdapterFamily, Arc<dyn TypeTranslator>>,
    wrappers: HashMap<String, Arc<OracleProxyResolver>>,
    installs: usize,
}

impl<F> std::fmt::Debug for InterceptingFactory<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptingFactory")
            .field("families", &self.families)
            .field("wrappers", &self.wrappers.len())
            .field("installs", &self.installs)
            .finish_non_exhaustive()
    }
}

impl<F: AdapterFactory> InterceptingFactory<F> {
    /// Decorates `inner`, intercepting every supported family.
    pub fn new(inner: F, oracle: Arc<dyn MetadataOracle>) -> Self {
        let translators = AdapterFamily::ALL
            .into_iter()
            .map(|family| (family, translator_for(family)))
            .collect();
        Self {
            inner,
            oracle,
            families: AdapterFamily::ALL.to_vec(),
            translators,
            wrappers: HashMap::new(),
            installs: 0,
        }
    }

    /// Builder method to narrow the allow-list of intercepted families.
    pub fn with_families(mut self, families: &[AdapterFamily]) -> Self {
        self.families = families.to_vec();
        self
    }

    /// Builder method to replace the type translator used for `family`.
    pub fn with_translator(mut self, translator: Arc<dyn TypeTranslator>) -> Self {
        self.translators.insert(translator.family(), translator);
        self
    }

    /// Number of times interception has been installed.
    pub const fn interception_count(&self) -> usize {
        self.installs
    }

    fn intercepted_family(&self, config: &AdapterConfig) -> Option<AdapterFamily> {
        AdapterFamily::from_credentials_type(&config.credentials.credentials_type)
            .filter(|family| self.families.contains(family))
    }
}

impl<F: AdapterFactory> AdapterFactory for InterceptingFactory<F> {
    fn register_adapter(&mut self, config: &AdapterConfig) -> Result<()> {
        self.inner.register_adapter(config)?;

        let key = config.credentials_key();
        let Some(family) = self.intercepted_family(config) else {
            debug!(credentials_type = %key, "credential type not intercepted");
            return Ok(());
        };

        let Some(origin) = self.inner.lookup_adapter(&key) else {
            warn!(credentials_type = %key, "factory registered no adapter; skipping interception");
            return Ok(());
        };

        if origin.is_intercepted() {
            debug!(credentials_type = %key, "adapter already routes through the oracle");
            self.wrappers.remove(&key);
            return Ok(());
        }

        let translator = self
            .translators
            .get(&family)
            .cloned()
            .unwrap_or_else(|| translator_for(family));
        let wrapper = OracleProxyResolver::new(origin, Arc::clone(&self.oracle), translator);

        if self.wrappers.insert(key.clone(), Arc::new(wrapper)).is_some() {
            info!(profile = %config.profile_name, credentials_type = %key, "re-installed oracle interception");
        } else {
            info!(profile = %config.profile_name, credentials_type = %key, "installed oracle interception");
        }
        self.installs = self.installs.saturating_add(1);
        Ok(())
    }

    fn lookup_adapter(&self, credentials_type: &str) -> Option<Arc<dyn ColumnResolver>> {
        let key = credentials_type.trim().to_lowercase();
        match self.wrappers.get(&key) {
            Some(wrapper) => Some(Arc::clone(wrapper) as Arc<dyn ColumnResolver>),
            None => self.inner.lookup_adapter(&key),
        }
    }
}
