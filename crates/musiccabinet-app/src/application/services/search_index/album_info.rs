use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::{JobDependencies, SearchIndexUpdateService, UpdateProgress};
use crate::application::ApplicationError;
use musiccabinet_domain::album_info::AlbumInfo;

const DESCRIPTION: &str = "album information";

/// Album infos collected before each write
const FLUSH_BATCH_SIZE: usize = 100;

/// Fetches artwork and popularity figures for library albums that have none.
///
/// Album info is not throttled through the invocation history: an album is
/// due exactly while it lacks stored info, so albums the service could not
/// describe are retried on the next run.
pub struct AlbumInfoUpdateService {
    deps: JobDependencies,
    progress: Arc<UpdateProgress>,
}

impl AlbumInfoUpdateService {
    pub fn new(deps: JobDependencies) -> Self {
        Self {
            deps,
            progress: Arc::new(UpdateProgress::new(DESCRIPTION)),
        }
    }

    async fn flush(&self, pending: &mut Vec<AlbumInfo>) -> Result<(), ApplicationError> {
        if pending.is_empty() {
            return Ok(());
        }
        self.deps.album_info.create_album_infos(pending.as_slice()).await?;
        pending.clear();
        Ok(())
    }
}

#[async_trait]
impl SearchIndexUpdateService for AlbumInfoUpdateService {
    fn name(&self) -> &'static str {
        "album-info"
    }

    fn update_description(&self) -> &'static str {
        DESCRIPTION
    }

    fn progress(&self) -> Arc<UpdateProgress> {
        self.progress.clone()
    }

    #[instrument(skip(self))]
    async fn update_search_index(&self) -> Result<(), ApplicationError> {
        let albums = self.deps.album_info.find_albums_without_info().await?;
        self.progress.set_total_operations(albums.len());
        info!("{} albums without info", albums.len());

        let mut pending = Vec::with_capacity(FLUSH_BATCH_SIZE);
        let mut failed = 0usize;
        for album in &albums {
            match self.deps.client.fetch_album_info(album).await {
                Ok(info) => pending.push(info.with_album(album.clone())),
                Err(e) if e.is_fatal() => {
                    error!("Aborting album info update at {}: {}", album, e);
                    // Keep what was fetched before the failure
                    self.flush(&mut pending).await?;
                    return Err(e.into());
                }
                Err(e) => {
                    warn!("No album info for {}: {}", album, e);
                    failed += 1;
                }
            }

            if pending.len() >= FLUSH_BATCH_SIZE {
                self.flush(&mut pending).await?;
            }
            self.progress.add_finished_operation();
        }
        self.flush(&mut pending).await?;

        info!(
            "Stored info for {} albums, {} failed",
            albums.len() - failed,
            failed
        );
        Ok(())
    }
}
