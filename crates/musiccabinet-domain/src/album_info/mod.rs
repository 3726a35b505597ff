mod repository;

use serde::{Deserialize, Serialize};

use crate::music::Album;

pub use repository::AlbumInfoRepository;

/// Album artwork and popularity figures fetched from the metadata service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumInfo {
    album: Album,
    small_image_url: Option<String>,
    medium_image_url: Option<String>,
    large_image_url: Option<String>,
    extra_large_image_url: Option<String>,
    listeners: u32,
    play_count: u32,
}

impl AlbumInfo {
    pub fn new(album: Album) -> Self {
        Self {
            album,
            small_image_url: None,
            medium_image_url: None,
            large_image_url: None,
            extra_large_image_url: None,
            listeners: 0,
            play_count: 0,
        }
    }

    /// Set image URLs, smallest first. Blank URLs are stored as absent.
    pub fn with_image_urls(
        mut self,
        small: Option<String>,
        medium: Option<String>,
        large: Option<String>,
        extra_large: Option<String>,
    ) -> Self {
        let clean = |url: Option<String>| url.filter(|u| !u.trim().is_empty());
        self.small_image_url = clean(small);
        self.medium_image_url = clean(medium);
        self.large_image_url = clean(large);
        self.extra_large_image_url = clean(extra_large);
        self
    }

    pub fn with_counts(mut self, listeners: u32, play_count: u32) -> Self {
        self.listeners = listeners;
        self.play_count = play_count;
        self
    }

    /// Re-key the payload to `album`, e.g. the library album it was fetched for
    pub fn with_album(mut self, album: Album) -> Self {
        self.album = album;
        self
    }

    pub fn album(&self) -> &Album {
        &self.album
    }

    pub fn small_image_url(&self) -> Option<&str> {
        self.small_image_url.as_deref()
    }

    pub fn medium_image_url(&self) -> Option<&str> {
        self.medium_image_url.as_deref()
    }

    pub fn large_image_url(&self) -> Option<&str> {
        self.large_image_url.as_deref()
    }

    pub fn extra_large_image_url(&self) -> Option<&str> {
        self.extra_large_image_url.as_deref()
    }

    /// Largest available artwork
    pub fn best_image_url(&self) -> Option<&str> {
        self.extra_large_image_url()
            .or_else(|| self.large_image_url())
            .or_else(|| self.medium_image_url())
            .or_else(|| self.small_image_url())
    }

    pub fn listeners(&self) -> u32 {
        self.listeners
    }

    pub fn play_count(&self) -> u32 {
        self.play_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_urls_are_absent() {
        let album = Album::from_names("Bill Fay", "Life Is People").unwrap();
        let info = AlbumInfo::new(album).with_image_urls(
            Some("".to_string()),
            Some("http://img/m.png".to_string()),
            Some("  ".to_string()),
            None,
        );
        assert_eq!(info.small_image_url(), None);
        assert_eq!(info.medium_image_url(), Some("http://img/m.png"));
        assert_eq!(info.large_image_url(), None);
        assert_eq!(info.best_image_url(), Some("http://img/m.png"));
    }
}
