pub mod album_info_repo;
pub mod library_repo;
pub mod metadata_repo;
pub mod webservice_history_repo;

mod entities;

pub use album_info_repo::SqliteAlbumInfoRepository;
pub use library_repo::SqliteLibraryRepository;
pub use metadata_repo::SqliteMetadataRepository;
pub use webservice_history_repo::SqliteWebserviceHistoryRepository;

/// Rows per multi-row INSERT when bulk loading staging tables
pub(crate) const IMPORT_BATCH_SIZE: usize = 1000;
