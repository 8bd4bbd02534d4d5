//! Connection configuration and secret resolution.
//!
//! Both connections accept a config struct whose fields are all optional.
//! Unset fields are filled from an injected [`SecretProvider`] at the
//! moment the connection is first used; an explicitly set field always
//! wins over the secret store. Resolution failures surface as
//! [`JukeboxError::Configuration`](crate::JukeboxError::Configuration)
//! naming the missing key, before any network traffic happens.

use std::collections::HashMap;

use crate::{JukeboxError, Result};

/// Secret-store key for the document store endpoint URL.
pub const STORE_ENDPOINT: &str = "JUKEBOX_STORE_ENDPOINT";
/// Secret-store key for the document store API key.
pub const STORE_API_KEY: &str = "JUKEBOX_STORE_API_KEY";
/// Secret-store key for the document store data source (cluster) name.
pub const STORE_DATA_SOURCE: &str = "JUKEBOX_STORE_DATA_SOURCE";
/// Secret-store key for the database name.
pub const STORE_DATABASE: &str = "JUKEBOX_STORE_DATABASE";
/// Secret-store key for the catalog client ID.
pub const CATALOG_CLIENT_ID: &str = "JUKEBOX_CATALOG_CLIENT_ID";
/// Secret-store key for the catalog client secret.
pub const CATALOG_CLIENT_SECRET: &str = "JUKEBOX_CATALOG_CLIENT_SECRET";

/// Source of secrets for configuration fields left unset.
///
/// Implementations must be cheap to call; resolution happens once per
/// connection, at first use.
pub trait SecretProvider: Send + Sync {
    /// Look up a secret by key. `None` means the key is absent.
    fn get(&self, key: &str) -> Option<String>;
}

/// [`SecretProvider`] backed by process environment variables.
///
/// Empty values are treated as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

impl SecretProvider for EnvSecrets {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

/// [`SecretProvider`] backed by an in-memory map.
///
/// Mainly useful in tests and embedded setups where secrets are wired
/// programmatically.
#[derive(Debug, Clone, Default)]
pub struct StaticSecrets(HashMap<String, String>);

impl StaticSecrets {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret, returning the provider for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl SecretProvider for StaticSecrets {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

/// Configuration for the document store connection.
///
/// All fields optional; unset fields resolve from the secret store under
/// the `JUKEBOX_STORE_*` keys.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Base URL of the store's data endpoint, up to and including the API
    /// version segment (e.g. `https://data.example.net/app/quiz/endpoint/data/v1`).
    pub endpoint: Option<String>,
    /// API key sent with every request.
    pub api_key: Option<String>,
    /// Named data source (cluster) within the store deployment.
    pub data_source: Option<String>,
    /// Database holding the quiz collections.
    pub database: Option<String>,
}

/// Fully resolved store configuration, ready to open a connection.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedStoreConfig {
    pub endpoint: String,
    pub api_key: String,
    pub data_source: String,
    pub database: String,
}

impl StoreConfig {
    pub(crate) fn resolve(&self, secrets: &dyn SecretProvider) -> Result<ResolvedStoreConfig> {
        Ok(ResolvedStoreConfig {
            endpoint: resolve(self.endpoint.as_deref(), secrets, STORE_ENDPOINT)?,
            api_key: resolve(self.api_key.as_deref(), secrets, STORE_API_KEY)?,
            data_source: resolve(self.data_source.as_deref(), secrets, STORE_DATA_SOURCE)?,
            database: resolve(self.database.as_deref(), secrets, STORE_DATABASE)?,
        })
    }
}

/// Configuration for the catalog connection.
///
/// Credentials resolve from the secret store under the
/// `JUKEBOX_CATALOG_*` keys when unset. The base URLs default to the
/// public catalog service and exist mainly so tests can point the client
/// at a mock server.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    /// OAuth client ID for the client-credentials grant.
    pub client_id: Option<String>,
    /// OAuth client secret for the client-credentials grant.
    pub client_secret: Option<String>,
    /// Base URL for catalog lookups (default: the public API host).
    pub api_base: Option<String>,
    /// Base URL for the token endpoint (default: the public accounts host).
    pub auth_base: Option<String>,
}

/// Fully resolved catalog configuration, ready to open a connection.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedCatalogConfig {
    pub client_id: String,
    pub client_secret: String,
    pub api_base: String,
    pub auth_base: String,
}

impl CatalogConfig {
    pub(crate) fn resolve(&self, secrets: &dyn SecretProvider) -> Result<ResolvedCatalogConfig> {
        Ok(ResolvedCatalogConfig {
            client_id: resolve(self.client_id.as_deref(), secrets, CATALOG_CLIENT_ID)?,
            client_secret: resolve(self.client_secret.as_deref(), secrets, CATALOG_CLIENT_SECRET)?,
            api_base: self
                .api_base
                .clone()
                .unwrap_or_else(|| crate::catalog::DEFAULT_API_BASE.to_string()),
            auth_base: self
                .auth_base
                .clone()
                .unwrap_or_else(|| crate::catalog::DEFAULT_AUTH_BASE.to_string()),
        })
    }
}

/// Resolve a single configuration field: explicit value first, then the
/// secret store, then a fast configuration failure naming the key.
fn resolve(explicit: Option<&str>, secrets: &dyn SecretProvider, key: &str) -> Result<String> {
    match explicit {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => secrets.get(key).ok_or_else(|| {
            JukeboxError::Configuration(format!(
                "missing '{key}': not set explicitly and absent from the secret store"
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_value_wins_over_secret() {
        let secrets = StaticSecrets::new().with(STORE_DATABASE, "from-secrets");
        let resolved = resolve(Some("explicit"), &secrets, STORE_DATABASE).unwrap();
        assert_eq!(resolved, "explicit");
    }

    #[test]
    fn unset_field_falls_back_to_secret() {
        let secrets = StaticSecrets::new().with(STORE_DATABASE, "from-secrets");
        let resolved = resolve(None, &secrets, STORE_DATABASE).unwrap();
        assert_eq!(resolved, "from-secrets");
    }

    #[test]
    fn empty_explicit_value_is_treated_as_unset() {
        let secrets = StaticSecrets::new().with(STORE_DATABASE, "from-secrets");
        let resolved = resolve(Some(""), &secrets, STORE_DATABASE).unwrap();
        assert_eq!(resolved, "from-secrets");
    }

    #[test]
    fn missing_everywhere_is_a_configuration_error() {
        let err = resolve(None, &StaticSecrets::new(), STORE_API_KEY).unwrap_err();
        assert!(matches!(err, JukeboxError::Configuration(msg) if msg.contains(STORE_API_KEY)));
    }

    #[test]
    fn store_config_resolves_all_fields() {
        let secrets = StaticSecrets::new()
            .with(STORE_ENDPOINT, "https://data.example.net/endpoint/data/v1")
            .with(STORE_API_KEY, "key")
            .with(STORE_DATA_SOURCE, "cluster0");
        let config = StoreConfig {
            database: Some("quiz".into()),
            ..Default::default()
        };
        let resolved = config.resolve(&secrets).unwrap();
        assert_eq!(resolved.database, "quiz");
        assert_eq!(resolved.data_source, "cluster0");
    }

    #[test]
    fn catalog_base_urls_default_without_secrets() {
        let secrets = StaticSecrets::new()
            .with(CATALOG_CLIENT_ID, "id")
            .with(CATALOG_CLIENT_SECRET, "secret");
        let resolved = CatalogConfig::default().resolve(&secrets).unwrap();
        assert_eq!(resolved.api_base, crate::catalog::DEFAULT_API_BASE);
        assert_eq!(resolved.auth_base, crate::catalog::DEFAULT_AUTH_BASE);
    }
}
