use async_trait::async_trait;

use super::MusicFile;
use crate::music::{Artist, Track};
use crate::shared::DomainError;

#[async_trait]
pub trait LibraryRepository: Send + Sync {
    /// Add (or refresh) music files, creating their artists, albums and tracks.
    async fn add_music_files(&self, files: &[MusicFile]) -> Result<(), DomainError>;

    /// Remove music files by path. Returns the number of files removed.
    async fn remove_music_files(&self, paths: &[String]) -> Result<u64, DomainError>;

    /// Artists with at least one file in the library.
    async fn find_artists(&self) -> Result<Vec<Artist>, DomainError>;

    /// Tracks with at least one file in the library.
    async fn find_tracks(&self) -> Result<Vec<Track>, DomainError>;
}
