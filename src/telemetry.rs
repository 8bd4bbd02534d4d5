//! Telemetry metric name constants.
//!
//! Centralised metric names for jukebox operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `jukebox_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `operation` — logical operation kind (e.g. "query", "track")
//! - `action` — wire-level action name (e.g. "find", "insertOne")
//! - `status` — outcome: "ok" or "error"

/// Total fingerprint-cache hits.
///
/// Labels: `operation`.
pub const CACHE_HITS_TOTAL: &str = "jukebox_cache_hits_total";

/// Total fingerprint-cache misses (entries computed fresh).
///
/// Labels: `operation`.
pub const CACHE_MISSES_TOTAL: &str = "jukebox_cache_misses_total";

/// Total requests issued against the document store.
///
/// Labels: `action`, `status` ("ok" | "error").
pub const STORE_REQUESTS_TOTAL: &str = "jukebox_store_requests_total";

/// Total requests issued against the catalog API (including token grants).
///
/// Labels: `action`, `status` ("ok" | "error").
pub const CATALOG_REQUESTS_TOTAL: &str = "jukebox_catalog_requests_total";
