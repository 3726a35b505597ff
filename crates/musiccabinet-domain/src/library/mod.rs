mod repository;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::music::{Album, Track};
use crate::shared::DomainError;

pub use repository::LibraryRepository;

/// A file in the local music library
///
/// The library defines which artists and tracks are "known" when looking for
/// subjects that still lack metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicFile {
    path: String,
    track: Track,
    album: Option<Album>,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl MusicFile {
    pub fn new(
        path: impl Into<String>,
        track: Track,
        album: Option<Album>,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(DomainError::Validation(
                "Music file path cannot be empty".to_string(),
            ));
        }
        if modified_at < created_at {
            return Err(DomainError::Validation(format!(
                "Music file {} modified before it was created",
                path
            )));
        }

        Ok(Self {
            path,
            track,
            album,
            created_at,
            modified_at,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn album(&self) -> Option<&Album> {
        self.album.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }
}
