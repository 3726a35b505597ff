mod client;
mod repository;

use serde::{Deserialize, Serialize};

use crate::music::{Artist, Track};

pub use client::{MetadataClient, WebserviceError};
pub use repository::MetadataRepository;

/// Artist biography and popularity figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistInfo {
    artist: Artist,
    image_url: Option<String>,
    listeners: u32,
    play_count: u32,
    bio_summary: Option<String>,
}

impl ArtistInfo {
    pub fn new(artist: Artist, listeners: u32, play_count: u32) -> Self {
        Self {
            artist,
            image_url: None,
            listeners,
            play_count,
            bio_summary: None,
        }
    }

    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn with_bio_summary(mut self, bio_summary: Option<String>) -> Self {
        self.bio_summary = bio_summary.filter(|s| !s.trim().is_empty());
        self
    }

    /// Re-key the payload to `artist`, e.g. the library subject it was fetched for
    pub fn with_artist(mut self, artist: Artist) -> Self {
        self.artist = artist;
        self
    }

    pub fn artist(&self) -> &Artist {
        &self.artist
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn listeners(&self) -> u32 {
        self.listeners
    }

    pub fn play_count(&self) -> u32 {
        self.play_count
    }

    pub fn bio_summary(&self) -> Option<&str> {
        self.bio_summary.as_deref()
    }
}

/// Weighted edge in the artist similarity graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRelation {
    pub target: Artist,
    pub weight: f32,
}

impl ArtistRelation {
    pub fn new(target: Artist, weight: f32) -> Self {
        Self {
            target,
            weight: weight.clamp(0.0, 1.0),
        }
    }
}

/// Weighted edge in the track similarity graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRelation {
    pub target: Track,
    pub weight: f32,
}

impl TrackRelation {
    pub fn new(target: Track, weight: f32) -> Self {
        Self {
            target,
            weight: weight.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_weight_is_clamped() {
        let artist = Artist::new("Espers").unwrap();
        assert_eq!(ArtistRelation::new(artist.clone(), 1.7).weight, 1.0);
        assert_eq!(ArtistRelation::new(artist, -0.2).weight, 0.0);
    }

    #[test]
    fn test_blank_bio_is_absent() {
        let info = ArtistInfo::new(Artist::new("Espers").unwrap(), 10, 20)
            .with_bio_summary(Some(" ".to_string()));
        assert_eq!(info.bio_summary(), None);
    }
}
