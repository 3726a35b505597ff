use async_trait::async_trait;

use super::{ArtistInfo, ArtistRelation, TrackRelation};
use crate::music::{Artist, Track};
use crate::shared::DomainError;

/// Persistence for fetched artist and track metadata.
///
/// Every save replaces what was stored for the source subject.
#[async_trait]
pub trait MetadataRepository: Send + Sync {
    async fn save_artist_info(&self, info: &ArtistInfo) -> Result<(), DomainError>;

    async fn find_artist_info(&self, artist: &Artist) -> Result<Option<ArtistInfo>, DomainError>;

    async fn save_artist_top_tracks(
        &self,
        artist: &Artist,
        tracks: &[Track],
    ) -> Result<(), DomainError>;

    async fn find_artist_top_tracks(&self, artist: &Artist) -> Result<Vec<Track>, DomainError>;

    async fn save_artist_relations(
        &self,
        source: &Artist,
        relations: &[ArtistRelation],
    ) -> Result<(), DomainError>;

    /// Relations ordered by descending weight
    async fn find_artist_relations(
        &self,
        source: &Artist,
    ) -> Result<Vec<ArtistRelation>, DomainError>;

    async fn save_track_relations(
        &self,
        source: &Track,
        relations: &[TrackRelation],
    ) -> Result<(), DomainError>;

    /// Relations ordered by descending weight
    async fn find_track_relations(&self, source: &Track)
        -> Result<Vec<TrackRelation>, DomainError>;
}
