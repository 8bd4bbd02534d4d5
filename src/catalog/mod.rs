//! External catalog adapter.
//!
//! [`CatalogConnection`] resolves track and artist IDs to catalog
//! metadata. Two cached primitives — [`get_track`](CatalogConnection::get_track)
//! and [`get_artist`](CatalogConnection::get_artist), both cached forever
//! by default since catalog entities are immutable — feed the derived
//! accessors the orchestrator actually calls (preview URL, answering
//! artist, artist image at a quality tier). Derived accessors are not
//! separately cached: one fetched artist serves every projection.

mod client;

use client::CatalogClient;

use std::sync::Arc;

use serde_json::json;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::cache::{CachedValue, MemoCache, Ttl};
use crate::config::{CatalogConfig, SecretProvider};
use crate::types::{Artist, Track};
use crate::{JukeboxError, Result};

/// Default base URL for catalog lookups.
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com";
/// Default base URL for the token endpoint.
pub const DEFAULT_AUTH_BASE: &str = "https://accounts.spotify.com";

/// Cached, lazily-connected adapter for the music catalog.
pub struct CatalogConnection {
    config: CatalogConfig,
    secrets: Arc<dyn SecretProvider>,
    cache: Arc<MemoCache>,
    client: OnceCell<CatalogClient>,
}

impl std::fmt::Debug for CatalogConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConnection")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CatalogConnection {
    /// Create a connection that resolves `config` (falling back to
    /// `secrets`) and builds its client on first use.
    pub fn new(
        config: CatalogConfig,
        secrets: Arc<dyn SecretProvider>,
        cache: Arc<MemoCache>,
    ) -> Self {
        Self {
            config,
            secrets,
            cache,
            client: OnceCell::new(),
        }
    }

    /// The `uninitialized → connected` transition: runs at most once per
    /// connection, on the first operation, and is terminal.
    async fn client(&self) -> Result<&CatalogClient> {
        self.client
            .get_or_try_init(|| async {
                let resolved = self.config.resolve(self.secrets.as_ref())?;
                debug!(api_base = %resolved.api_base, "connecting to catalog");
                Ok(CatalogClient::new(resolved))
            })
            .await
    }

    /// Full track metadata, fetched once per track ID and cached forever.
    pub async fn get_track(&self, track_id: &str) -> Result<Track> {
        self.get_track_with_ttl(track_id, Ttl::Forever).await
    }

    /// [`get_track`](Self::get_track) with an explicit cache lifetime.
    pub async fn get_track_with_ttl(&self, track_id: &str, ttl: Ttl) -> Result<Track> {
        let client = self.client().await?;
        let operation = format!("track:{track_id}");
        let args = json!({});

        let value = self
            .cache
            .memoize(&operation, &args, ttl, async {
                client.track(track_id).await.map(CachedValue::Track)
            })
            .await?;

        match value {
            CachedValue::Track(track) => Ok(track),
            other => Err(shape_mismatch(&operation, &other)),
        }
    }

    /// Full artist metadata, fetched once per artist ID and cached
    /// forever.
    pub async fn get_artist(&self, artist_id: &str) -> Result<Artist> {
        self.get_artist_with_ttl(artist_id, Ttl::Forever).await
    }

    /// [`get_artist`](Self::get_artist) with an explicit cache lifetime.
    pub async fn get_artist_with_ttl(&self, artist_id: &str, ttl: Ttl) -> Result<Artist> {
        let client = self.client().await?;
        let operation = format!("artist:{artist_id}");
        let args = json!({});

        let value = self
            .cache
            .memoize(&operation, &args, ttl, async {
                client.artist(artist_id).await.map(CachedValue::Artist)
            })
            .await?;

        match value {
            CachedValue::Artist(artist) => Ok(artist),
            other => Err(shape_mismatch(&operation, &other)),
        }
    }

    /// Preview audio URL for a track.
    ///
    /// `None` means the catalog offers no preview for this track — a
    /// normal outcome the caller renders as "no preview available", not
    /// a failure.
    pub async fn get_song_preview(&self, track_id: &str) -> Result<Option<String>> {
        Ok(self.get_track(track_id).await?.preview_url)
    }

    /// ID of the track's primary artist.
    pub async fn get_song_artist(&self, track_id: &str) -> Result<String> {
        let track = self.get_track(track_id).await?;
        track
            .primary_artist()
            .map(|artist| artist.id.clone())
            .ok_or_else(|| JukeboxError::Data(format!("track {track_id} lists no artists")))
    }

    /// URL of an artist image at the given quality tier.
    ///
    /// Tier 0 is the highest resolution; a tier beyond the available
    /// images fails with
    /// [`JukeboxError::QualityTierOutOfRange`] rather than clamping.
    pub async fn get_artist_image(&self, artist_id: &str, quality_tier: usize) -> Result<String> {
        let artist = self.get_artist(artist_id).await?;
        artist.image_at(quality_tier).map(|image| image.url.clone())
    }
}

fn shape_mismatch(operation: &str, value: &CachedValue) -> JukeboxError {
    JukeboxError::Data(format!("cache returned {} for {operation}", value.kind()))
}
