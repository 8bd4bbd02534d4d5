//! Document store adapter.
//!
//! [`StoreConnection`] gives the orchestrator typed access to the quiz
//! collections. Every read (`query`, `distinct`, `aggregate`) routes
//! through the shared [`MemoCache`] under an operation-and-collection
//! fingerprint; `insert` is a write and always goes to the live store.
//!
//! The connection is lazy: configuration is resolved and the wire backend
//! built on the first operation, then reused for the life of the process.

mod backend;
mod data_api;

pub use backend::DocumentBackend;

use data_api::DataApiBackend;

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::cache::{CachedValue, MemoCache, Ttl};
use crate::config::{SecretProvider, StoreConfig};
use crate::types::{Document, InsertAck, InsertPayload};
use crate::{JukeboxError, Result};

/// Collection holding the quiz song dataset.
pub const SONGS_COLLECTION: &str = "musicgen";
/// Collection holding leaderboard submissions.
pub const LEADERBOARD_COLLECTION: &str = "leaderboard";

/// Cached, lazily-connected adapter for the document store.
pub struct StoreConnection {
    config: StoreConfig,
    secrets: Arc<dyn SecretProvider>,
    cache: Arc<MemoCache>,
    backend: OnceCell<Arc<dyn DocumentBackend>>,
}

impl std::fmt::Debug for StoreConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConnection")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl StoreConnection {
    /// Create a connection that resolves `config` (falling back to
    /// `secrets`) and opens its backend on first use.
    pub fn new(
        config: StoreConfig,
        secrets: Arc<dyn SecretProvider>,
        cache: Arc<MemoCache>,
    ) -> Self {
        Self {
            config,
            secrets,
            cache,
            backend: OnceCell::new(),
        }
    }

    /// Create a connection over an already-built backend.
    ///
    /// Skips config resolution entirely; used by tests and by callers
    /// wiring a custom [`DocumentBackend`].
    pub fn with_backend(backend: Arc<dyn DocumentBackend>, cache: Arc<MemoCache>) -> Self {
        Self {
            config: StoreConfig::default(),
            secrets: Arc::new(crate::config::EnvSecrets),
            cache,
            backend: OnceCell::new_with(Some(backend)),
        }
    }

    /// The `uninitialized → connected` transition: runs at most once per
    /// connection, on the first operation, and is terminal.
    async fn backend(&self) -> Result<&Arc<dyn DocumentBackend>> {
        self.backend
            .get_or_try_init(|| async {
                let resolved = self.config.resolve(self.secrets.as_ref())?;
                debug!(database = %resolved.database, "connecting to document store");
                Ok(Arc::new(DataApiBackend::new(resolved)) as Arc<dyn DocumentBackend>)
            })
            .await
    }

    /// Find documents in `collection` matching `filter`, shaped by
    /// `projection`, cached for `ttl`.
    ///
    /// Filter and projection keys may be assembled in any order — the
    /// cache canonicalizes them. A filter matching nothing returns an
    /// empty vec, so callers can tell "no results" from "lookup failed".
    pub async fn query(
        &self,
        collection: &str,
        filter: Value,
        projection: Value,
        ttl: Ttl,
    ) -> Result<Vec<Document>> {
        let backend = self.backend().await?;
        let operation = format!("query:{collection}");
        let args = json!({ "filter": filter, "projection": projection });

        let value = self
            .cache
            .memoize(&operation, &args, ttl, async {
                backend
                    .find(collection, &args["filter"], &args["projection"])
                    .await
                    .map(CachedValue::Documents)
            })
            .await?;

        into_documents(value)
    }

    /// Unique values of `field` across `collection`, cached for `ttl`.
    ///
    /// Realized as a `$group` aggregation at the wire layer; the result
    /// order is canonical (sorted by JSON rendering) so repeated calls
    /// compare equal.
    pub async fn distinct(&self, collection: &str, field: &str, ttl: Ttl) -> Result<Vec<Value>> {
        let backend = self.backend().await?;
        let operation = format!("distinct:{collection}");
        let args = json!({ "field": field });

        let value = self
            .cache
            .memoize(&operation, &args, ttl, async {
                let pipeline = [json!({ "$group": { "_id": format!("${field}") } })];
                let groups = backend.aggregate(collection, &pipeline).await?;

                let mut values: Vec<Value> =
                    groups.into_iter().filter_map(Document::into_id).collect();
                values.sort_by_cached_key(|v| v.to_string());
                values.dedup();
                Ok(CachedValue::Scalars(values))
            })
            .await?;

        match value {
            CachedValue::Scalars(values) => Ok(values),
            other => Err(cache_shape_mismatch(&operation, &other)),
        }
    }

    /// Run an aggregation `pipeline` against `collection`, cached for
    /// `ttl`.
    ///
    /// The pipeline is an ordered sequence of stages; the result is
    /// whatever the final stage projects out (group keys, projected
    /// documents, ...). An empty result is an empty vec, not an error.
    pub async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Value>,
        ttl: Ttl,
    ) -> Result<Vec<Document>> {
        let backend = self.backend().await?;
        let operation = format!("aggregate:{collection}");
        let args = json!({ "pipeline": Value::Array(pipeline) });

        let value = self
            .cache
            .memoize(&operation, &args, ttl, async {
                let stages = args["pipeline"].as_array().map(Vec::as_slice).unwrap_or(&[]);
                backend
                    .aggregate(collection, stages)
                    .await
                    .map(CachedValue::Documents)
            })
            .await?;

        into_documents(value)
    }

    /// Write one record or a batch into `collection`.
    ///
    /// Never cached and never retried — at-most-once from this crate's
    /// perspective. The payload variant picks the single or bulk write
    /// path.
    pub async fn insert(
        &self,
        collection: &str,
        payload: impl Into<InsertPayload>,
    ) -> Result<InsertAck> {
        let payload = payload.into();
        let backend = self.backend().await?;

        match payload {
            InsertPayload::Single(document) => backend.insert_one(collection, &document).await,
            InsertPayload::Many(documents) => backend.insert_many(collection, &documents).await,
        }
    }

    /// [`insert`](Self::insert) for callers holding loose JSON.
    ///
    /// An object routes to the single write, an array of objects to the
    /// bulk write; anything else fails with
    /// [`JukeboxError::InvalidInput`] before any network traffic.
    pub async fn insert_value(&self, collection: &str, value: Value) -> Result<InsertAck> {
        let payload = InsertPayload::try_from(value)?;
        self.insert(collection, payload).await
    }
}

fn into_documents(value: CachedValue) -> Result<Vec<Document>> {
    match value {
        CachedValue::Documents(documents) => Ok(documents),
        other => Err(cache_shape_mismatch("document read", &other)),
    }
}

fn cache_shape_mismatch(operation: &str, value: &CachedValue) -> JukeboxError {
    JukeboxError::Data(format!(
        "cache returned {} for {operation}",
        value.kind()
    ))
}
