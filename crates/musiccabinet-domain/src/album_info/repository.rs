use async_trait::async_trait;
use std::collections::HashMap;

use super::AlbumInfo;
use crate::music::{Album, Artist};
use crate::shared::DomainError;

#[async_trait]
pub trait AlbumInfoRepository: Send + Sync {
    /// Bulk load album infos through the staging table and merge them into
    /// `album_info`, replacing earlier values for the same album.
    async fn create_album_infos(&self, album_infos: &[AlbumInfo]) -> Result<(), DomainError>;

    /// Album info for one album; `None` when nothing was fetched yet.
    async fn find_album_info(&self, album: &Album) -> Result<Option<AlbumInfo>, DomainError>;

    async fn find_album_infos_for_artist(
        &self,
        artist: &Artist,
    ) -> Result<Vec<AlbumInfo>, DomainError>;

    /// Album infos keyed by music file path, for files whose album has info.
    async fn find_album_infos_for_paths(
        &self,
        paths: &[String],
    ) -> Result<HashMap<String, AlbumInfo>, DomainError>;

    /// Library albums without album info.
    async fn find_albums_without_info(&self) -> Result<Vec<Album>, DomainError>;
}
