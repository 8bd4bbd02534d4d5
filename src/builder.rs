//! Builder wiring the connections to one shared cache.

use std::sync::Arc;

use crate::cache::{CacheConfig, MemoCache};
use crate::catalog::CatalogConnection;
use crate::config::{CatalogConfig, EnvSecrets, SecretProvider, StoreConfig};
use crate::store::StoreConnection;
use crate::{JukeboxError, Result};

/// Entry point: both adapters behind a single shared memoization cache.
///
/// Connections stay lazy — building a `Jukebox` performs no network
/// traffic and no secret resolution; both happen on each connection's
/// first operation.
#[derive(Debug)]
pub struct Jukebox {
    cache: Arc<MemoCache>,
    store: Option<StoreConnection>,
    catalog: Option<CatalogConnection>,
}

impl Jukebox {
    /// Create a new builder.
    pub fn builder() -> JukeboxBuilder {
        JukeboxBuilder::new()
    }

    /// The document store connection.
    pub fn store(&self) -> Result<&StoreConnection> {
        self.store.as_ref().ok_or_else(|| {
            JukeboxError::Configuration("no document store configured".to_string())
        })
    }

    /// The catalog connection.
    pub fn catalog(&self) -> Result<&CatalogConnection> {
        self.catalog
            .as_ref()
            .ok_or_else(|| JukeboxError::Configuration("no catalog configured".to_string()))
    }

    /// The shared memoization cache behind both connections.
    pub fn cache(&self) -> &MemoCache {
        &self.cache
    }
}

/// Builder for [`Jukebox`] instances.
pub struct JukeboxBuilder {
    store: Option<StoreConfig>,
    catalog: Option<CatalogConfig>,
    secrets: Option<Arc<dyn SecretProvider>>,
    cache: CacheConfig,
}

impl JukeboxBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            catalog: None,
            secrets: None,
            cache: CacheConfig::default(),
        }
    }

    /// Configure the document store connection.
    pub fn store(mut self, config: StoreConfig) -> Self {
        self.store = Some(config);
        self
    }

    /// Configure the catalog connection.
    pub fn catalog(mut self, config: CatalogConfig) -> Self {
        self.catalog = Some(config);
        self
    }

    /// Supply the secret provider consulted for unset config fields
    /// (default: process environment via [`EnvSecrets`]).
    pub fn secrets(mut self, provider: impl SecretProvider + 'static) -> Self {
        self.secrets = Some(Arc::new(provider));
        self
    }

    /// Tune the shared cache.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Build the jukebox.
    ///
    /// Fails fast when neither connection is configured; missing
    /// credentials surface later, on first use of the connection that
    /// needs them.
    pub fn build(self) -> Result<Jukebox> {
        if self.store.is_none() && self.catalog.is_none() {
            return Err(JukeboxError::Configuration(
                "configure at least one of store or catalog".to_string(),
            ));
        }

        let secrets: Arc<dyn SecretProvider> =
            self.secrets.unwrap_or_else(|| Arc::new(EnvSecrets));
        let cache = Arc::new(MemoCache::new(&self.cache));

        let store = self
            .store
            .map(|config| StoreConnection::new(config, secrets.clone(), cache.clone()));
        let catalog = self
            .catalog
            .map(|config| CatalogConnection::new(config, secrets.clone(), cache.clone()));

        Ok(Jukebox {
            cache,
            store,
            catalog,
        })
    }
}

impl Default for JukeboxBuilder {
    fn default() -> Self {
        Self::new()
    }
}
