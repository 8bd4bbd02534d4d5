//! Wire-level seam for the document store.
//!
//! [`StoreConnection`](super::StoreConnection) talks to the backing store
//! through this trait rather than a concrete HTTP client, so tests can
//! substitute an in-memory backend and alternative transports can slot in
//! without touching the caching layer above.

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;
use crate::types::{Document, InsertAck};

/// Backend for a collection-oriented document store.
///
/// Implementations perform the raw backing calls; caching, fingerprinting
/// and payload dispatch all live above this trait. Errors must be
/// propagated, never swallowed — the caller decides retry policy.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Backend name for logging/diagnostics.
    fn name(&self) -> &str;

    /// Find documents matching `filter`, shaped by `projection`.
    ///
    /// Zero matches yields `Ok` with an empty vec, never an error.
    async fn find(
        &self,
        collection: &str,
        filter: &Value,
        projection: &Value,
    ) -> Result<Vec<Document>>;

    /// Run an aggregation pipeline against a collection.
    async fn aggregate(&self, collection: &str, pipeline: &[Value]) -> Result<Vec<Document>>;

    /// Write a single document.
    async fn insert_one(&self, collection: &str, document: &Document) -> Result<InsertAck>;

    /// Write a batch of documents.
    async fn insert_many(&self, collection: &str, documents: &[Document]) -> Result<InsertAck>;
}
