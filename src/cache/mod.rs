//! Caching subsystem.
//!
//! One shared [`MemoCache`] sits in front of every backing call the
//! adapters make:
//!
//! - [`fingerprint`] — deterministic cache-key construction from an
//!   operation ID plus canonicalized (recursively key-sorted) arguments.
//!
//! - [`MemoCache`] — moka-backed memoization table with per-entry TTL
//!   ([`Ttl::After`] or [`Ttl::Forever`]) and single-flight population.
//!   The builder creates one instance and injects it into both
//!   connections, so a store query and a catalog lookup share capacity
//!   and eviction.
//!
//! Writes never pass through here — `insert` goes straight to the live
//! store.

pub mod fingerprint;
mod memo;

pub use memo::{CacheConfig, CachedValue, MemoCache, Ttl};
