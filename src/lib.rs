//! Jukebox - cached data-access core for a song-guessing quiz
//!
//! This crate is the data layer of a music quiz: a document store holding
//! the song dataset and leaderboard, and a remote music catalog resolving
//! track IDs to preview audio and artist imagery. Every read goes through
//! one shared fingerprinted memoization cache with per-entry TTL, so a
//! question set queried twice within the hour costs one backing call and
//! a track looked up once is never fetched again.
//!
//! # Example
//!
//! ```rust,no_run
//! use jukebox::{CatalogConfig, Jukebox, StoreConfig, Ttl};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> jukebox::Result<()> {
//!     let jukebox = Jukebox::builder()
//!         .store(StoreConfig {
//!             database: Some("musicgen".into()),
//!             ..Default::default()
//!         })
//!         .catalog(CatalogConfig::default())
//!         .build()?;
//!
//!     let songs = jukebox.store()?
//!         .query(
//!             "musicgen",
//!             json!({ "chart_name": { "$in": ["70s-rock"] } }),
//!             json!({ "song": 1, "artist": 1, "chart_name": 1, "id": 1 }),
//!             Ttl::DEFAULT,
//!         )
//!         .await?;
//!
//!     let track_id = songs
//!         .first()
//!         .and_then(|doc| doc.get("id"))
//!         .and_then(|v| v.as_str());
//!     if let Some(track_id) = track_id {
//!         match jukebox.catalog()?.get_song_preview(track_id).await? {
//!             Some(url) => println!("preview: {url}"),
//!             None => println!("(no preview available)"),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod builder;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use builder::{Jukebox, JukeboxBuilder};
pub use cache::{CacheConfig, CachedValue, MemoCache, Ttl};
pub use catalog::CatalogConnection;
pub use config::{CatalogConfig, EnvSecrets, SecretProvider, StaticSecrets, StoreConfig};
pub use error::{JukeboxError, Result};
pub use store::{DocumentBackend, StoreConnection};

// Re-export all types
pub use types::{
    Artist, ArtistRef, Document, Image, InsertAck, InsertPayload, LeaderboardEntry, SongRecord,
    Track,
};
