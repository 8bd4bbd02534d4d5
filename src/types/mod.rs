//! Public types for the Jukebox API.

mod catalog;
mod document;

pub use catalog::{Artist, ArtistRef, Image, Track};
pub use document::{Document, InsertAck, InsertPayload, LeaderboardEntry, SongRecord};
