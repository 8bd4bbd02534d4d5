//! Fingerprinted memoization cache with per-entry TTL.
//!
//! [`MemoCache`] is the one shared memoization table every adapter routes
//! its reads through. Entries are keyed by the
//! [`fingerprint`](super::fingerprint::fingerprint) of the operation and
//! its canonicalized arguments, and each entry carries its own [`Ttl`] —
//! an hour-lived query result and a never-expiring track lookup live in
//! the same table.
//!
//! Population is single-flight: concurrent callers that miss on the same
//! fingerprint coalesce onto one in-flight computation (moka's
//! `or_try_insert_with`). A computation that fails caches nothing — every
//! coalesced caller receives the failure and the next call recomputes.

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use serde_json::Value;
use tracing::debug;

use crate::telemetry;
use crate::types::{Artist, Document, Track};
use crate::{JukeboxError, Result};

use super::fingerprint::fingerprint;

/// Time-to-live for a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Entry expires this long after creation.
    After(Duration),
    /// Entry never expires ("cache forever" — for static catalog data).
    Forever,
}

impl Ttl {
    /// Default TTL for store reads: one hour.
    pub const DEFAULT: Ttl = Ttl::After(Duration::from_secs(3600));

    /// Convenience constructor from whole seconds.
    pub const fn seconds(secs: u64) -> Self {
        Ttl::After(Duration::from_secs(secs))
    }

    fn as_duration(self) -> Option<Duration> {
        match self {
            Ttl::After(duration) => Some(duration),
            Ttl::Forever => None,
        }
    }
}

/// Cached result value — one variant per result shape the adapters produce.
#[derive(Debug, Clone)]
pub enum CachedValue {
    /// Rows from a `query` or `aggregate` call.
    Documents(Vec<Document>),
    /// Unique field values from a `distinct` call.
    Scalars(Vec<Value>),
    /// A full catalog track.
    Track(Track),
    /// A full catalog artist.
    Artist(Artist),
}

impl CachedValue {
    /// Short shape name, used in mismatch diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            CachedValue::Documents(_) => "documents",
            CachedValue::Scalars(_) => "scalars",
            CachedValue::Track(_) => "track",
            CachedValue::Artist(_) => "artist",
        }
    }
}

/// Configuration for the memoization cache.
///
/// ```rust
/// # use jukebox::cache::CacheConfig;
/// let config = CacheConfig::new().max_entries(50_000);
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 10,000.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }
}

#[derive(Clone)]
struct CacheEntry {
    value: CachedValue,
    ttl: Ttl,
}

/// Per-entry expiry policy: each entry expires according to the [`Ttl`]
/// it was stored with; `Forever` entries never expire.
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        entry.ttl.as_duration()
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        entry.ttl.as_duration()
    }
}

/// Shared fingerprinted memoization cache.
///
/// Cloning is cheap and yields a handle onto the same table; the builder
/// hands one instance to every connection so all adapters share entries.
#[derive(Clone)]
pub struct MemoCache {
    entries: Cache<String, CacheEntry>,
}

impl std::fmt::Debug for MemoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl MemoCache {
    /// Create a cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .expire_after(EntryTtl)
            .build();
        Self { entries }
    }

    /// Return the cached result for `(operation_id, args)`, computing and
    /// storing it when absent or expired.
    ///
    /// On a hit the stored value is returned with zero backing calls. On
    /// a miss `compute` runs exactly once — concurrent callers for the
    /// same fingerprint wait for the in-flight computation instead of
    /// issuing their own. A failed computation is propagated to every
    /// waiting caller and is not remembered.
    pub async fn memoize<F>(
        &self,
        operation_id: &str,
        args: &Value,
        ttl: Ttl,
        compute: F,
    ) -> Result<CachedValue>
    where
        F: Future<Output = Result<CachedValue>>,
    {
        let key = fingerprint(operation_id, args);
        let operation = operation_kind(operation_id).to_string();

        let entry = self
            .entries
            .entry(key)
            .or_try_insert_with(async move {
                let value = compute.await?;
                Ok(CacheEntry { value, ttl })
            })
            .await
            .map_err(|err: std::sync::Arc<JukeboxError>| (*err).clone())?;

        if entry.is_fresh() {
            debug!(operation = operation_id, "cache miss, stored fresh entry");
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "operation" => operation)
                .increment(1);
        } else {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "operation" => operation).increment(1);
        }

        Ok(entry.into_value().value)
    }

    /// Approximate number of live entries.
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Whether the cache is (approximately) empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict all entries.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

/// Metric label for an operation ID: the part before the first `:`.
fn operation_kind(operation_id: &str) -> &str {
    operation_id.split(':').next().unwrap_or(operation_id)
}
