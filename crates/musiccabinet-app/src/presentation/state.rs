use sqlx::SqlitePool;
use std::sync::Arc;

use crate::application::services::ConfigService;
use musiccabinet_infrastructure::persistence::{
    repositories::{
        SqliteAlbumInfoRepository, SqliteLibraryRepository, SqliteMetadataRepository,
        SqliteWebserviceHistoryRepository,
    },
    Database,
};

pub struct Runtime {
    pub pool: Arc<SqlitePool>,
    pub db: Arc<Database>,
}

pub struct Repositories {
    pub history: Arc<SqliteWebserviceHistoryRepository>,
    pub library: Arc<SqliteLibraryRepository>,
    pub album_info: Arc<SqliteAlbumInfoRepository>,
    pub metadata: Arc<SqliteMetadataRepository>,
}

pub struct AppState {
    pub runtime: Runtime,
    pub repositories: Repositories,
    pub config: Arc<ConfigService>,
}

impl AppState {
    /// Wire repositories over an opened, migrated database
    pub fn new(database: Database, config: Arc<ConfigService>) -> Self {
        let pool = Arc::new(database.pool().clone());

        let repositories = Repositories {
            history: Arc::new(
                SqliteWebserviceHistoryRepository::new(pool.clone())
                    .with_quarantine_period(config.quarantine_period()),
            ),
            library: Arc::new(SqliteLibraryRepository::new(pool.clone())),
            album_info: Arc::new(SqliteAlbumInfoRepository::new(pool.clone())),
            metadata: Arc::new(SqliteMetadataRepository::new(pool.clone())),
        };

        Self {
            runtime: Runtime {
                pool,
                db: Arc::new(database),
            },
            repositories,
            config,
        }
    }
}
