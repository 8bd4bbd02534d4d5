//! Catalog entity types.
//!
//! These mirror the catalog's wire shapes and are immutable from the
//! client's perspective — a fetched track or artist is cached forever by
//! default and reused for every derived projection.

use serde::{Deserialize, Serialize};

use crate::{JukeboxError, Result};

/// Full track metadata from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Opaque catalog track ID.
    pub id: String,
    /// Track title.
    #[serde(default)]
    pub name: Option<String>,
    /// Credited artists, primary first.
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    /// Preview audio URL. Absent is a normal outcome ("no preview
    /// available"), not an error.
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl Track {
    /// The primary (first-credited) artist, when the catalog lists any.
    pub fn primary_artist(&self) -> Option<&ArtistRef> {
        self.artists.first()
    }
}

/// Artist reference as embedded in a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRef {
    /// Opaque catalog artist ID.
    pub id: String,
    /// Artist name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Full artist metadata from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    /// Opaque catalog artist ID.
    pub id: String,
    /// Artist name.
    #[serde(default)]
    pub name: Option<String>,
    /// Artist images, ordered highest resolution first.
    #[serde(default)]
    pub images: Vec<Image>,
}

impl Artist {
    /// Select an image by quality tier.
    ///
    /// Tier 0 is the highest resolution; increasing tiers walk toward the
    /// low-resolution end of the sequence. A tier beyond the available
    /// images is an out-of-range error, never a silent clamp.
    pub fn image_at(&self, tier: usize) -> Result<&Image> {
        self.images
            .get(tier)
            .ok_or(JukeboxError::QualityTierOutOfRange {
                tier,
                available: self.images.len(),
            })
    }
}

/// One image rendition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Width in pixels, when the catalog reports it.
    #[serde(default)]
    pub width: Option<u32>,
    /// Height in pixels, when the catalog reports it.
    #[serde(default)]
    pub height: Option<u32>,
}
