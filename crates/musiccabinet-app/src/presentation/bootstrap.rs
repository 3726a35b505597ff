use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::application::services::{
    AlbumInfoUpdateService, ArtistInfoUpdateService, ArtistRelationUpdateService,
    ArtistTopTracksUpdateService, ConfigService, JobDependencies, SearchIndexUpdateExecutor,
    SearchIndexUpdateService, TrackRelationUpdateService,
};
use crate::presentation::state::AppState;
use musiccabinet_domain::metadata::MetadataClient;
use musiccabinet_infrastructure::http::LastFmClient;
use musiccabinet_infrastructure::persistence::Database;

/// Open the database, run migrations and wire the repositories.
///
/// `database_override` takes precedence over the configured path.
pub async fn build_app_state(
    config: Arc<ConfigService>,
    database_override: Option<&Path>,
) -> Result<AppState> {
    let db_path = database_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.database_path());
    let db_path_str = db_path
        .to_str()
        .with_context(|| format!("Invalid database path {:?}", db_path))?;
    info!("Database path: {}", db_path_str);

    info!("🔌 Connecting to database...");
    let started_at = Instant::now();
    let database = Database::new(db_path_str).await?;
    info!(
        "✓ Database connection established ({}ms)",
        started_at.elapsed().as_millis()
    );

    info!("🔄 Running migrations...");
    let started_at = Instant::now();
    database.run_migrations().await?;
    info!(
        "✓ Migrations completed ({}ms)",
        started_at.elapsed().as_millis()
    );

    Ok(AppState::new(database, config))
}

pub fn build_lastfm_client(config: &ConfigService) -> Result<Arc<dyn MetadataClient>> {
    let Some(api_key) = config.lastfm_api_key() else {
        bail!(
            "No Last.fm API key configured; set {} or lastfm_api_key in {:?}",
            crate::application::services::config_service::API_KEY_ENV,
            config.config_path()
        );
    };
    let client = LastFmClient::new(api_key, config.lastfm_base_url())?;
    Ok(Arc::new(client))
}

/// Every update job in the order a full refresh runs them
pub fn build_update_executor(
    state: &AppState,
    client: Arc<dyn MetadataClient>,
) -> SearchIndexUpdateExecutor {
    let deps = JobDependencies {
        library: state.repositories.library.clone(),
        history: state.repositories.history.clone(),
        album_info: state.repositories.album_info.clone(),
        metadata: state.repositories.metadata.clone(),
        client,
    };

    let jobs: Vec<Arc<dyn SearchIndexUpdateService>> = vec![
        Arc::new(ArtistInfoUpdateService::new(deps.clone())),
        Arc::new(ArtistTopTracksUpdateService::new(deps.clone())),
        Arc::new(ArtistRelationUpdateService::new(deps.clone())),
        Arc::new(TrackRelationUpdateService::new(deps.clone())),
        Arc::new(AlbumInfoUpdateService::new(deps)),
    ];
    info!("✓ {} update jobs registered", jobs.len());

    SearchIndexUpdateExecutor::new(jobs)
}
