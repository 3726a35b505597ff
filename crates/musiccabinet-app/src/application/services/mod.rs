pub mod config_service;
pub mod search_index;

pub use config_service::{AppConfig, ConfigService, LogLevel};
pub use search_index::{
    AlbumInfoUpdateService, ArtistInfoUpdateService, ArtistRelationUpdateService,
    ArtistTopTracksUpdateService, JobDependencies, ProgressSnapshot, SearchIndexUpdateExecutor,
    SearchIndexUpdateService, TrackRelationUpdateService, UpdateProgress, UpdateSummary,
};
