//! Background jobs that fill the metadata tables from the webservice.

mod album_info;
mod artist_info;
mod artist_relation;
mod artist_top_tracks;
mod executor;
mod progress;
mod throttled;
mod track_relation;

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::ApplicationError;
use musiccabinet_domain::album_info::AlbumInfoRepository;
use musiccabinet_domain::library::LibraryRepository;
use musiccabinet_domain::metadata::{MetadataClient, MetadataRepository};
use musiccabinet_domain::webservice::WebserviceHistoryRepository;

pub use album_info::AlbumInfoUpdateService;
pub use artist_info::ArtistInfoUpdateService;
pub use artist_relation::ArtistRelationUpdateService;
pub use artist_top_tracks::ArtistTopTracksUpdateService;
pub use executor::SearchIndexUpdateExecutor;
pub use progress::{ProgressSnapshot, UpdateProgress};
pub use throttled::UpdateSummary;
pub use track_relation::TrackRelationUpdateService;

/// A long-running update job with observable progress.
///
/// Implementations do the work in `update_search_index`; resetting progress
/// and guarding against overlapping runs is left to
/// [`SearchIndexUpdateExecutor`].
#[async_trait]
pub trait SearchIndexUpdateService: Send + Sync {
    /// Stable identifier, used on the command line
    fn name(&self) -> &'static str;

    /// Human readable description of what is being updated
    fn update_description(&self) -> &'static str;

    fn progress(&self) -> Arc<UpdateProgress>;

    async fn update_search_index(&self) -> Result<(), ApplicationError>;
}

/// Everything the update jobs read from and write to
#[derive(Clone)]
pub struct JobDependencies {
    pub library: Arc<dyn LibraryRepository>,
    pub history: Arc<dyn WebserviceHistoryRepository>,
    pub album_info: Arc<dyn AlbumInfoRepository>,
    pub metadata: Arc<dyn MetadataRepository>,
    pub client: Arc<dyn MetadataClient>,
}
