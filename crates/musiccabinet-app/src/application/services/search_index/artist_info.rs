use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::throttled::{expect_artist, run_throttled, SubjectHandler};
use super::{JobDependencies, SearchIndexUpdateService, UpdateProgress};
use crate::application::ApplicationError;
use musiccabinet_domain::webservice::{Calltype, InvocationSubject};

const DESCRIPTION: &str = "artist information";

/// Fetches biography and popularity figures for library artists.
pub struct ArtistInfoUpdateService {
    deps: JobDependencies,
    progress: Arc<UpdateProgress>,
}

impl ArtistInfoUpdateService {
    pub fn new(deps: JobDependencies) -> Self {
        Self {
            deps,
            progress: Arc::new(UpdateProgress::new(DESCRIPTION)),
        }
    }
}

#[async_trait]
impl SubjectHandler for ArtistInfoUpdateService {
    async fn fetch_and_store(&self, subject: &InvocationSubject) -> Result<(), ApplicationError> {
        let artist = expect_artist(subject)?;
        let info = self
            .deps
            .client
            .fetch_artist_info(artist)
            .await?
            .with_artist(artist.clone());
        debug!(
            "Artist info for {}: {} listeners, {} plays",
            artist,
            info.listeners(),
            info.play_count()
        );
        self.deps.metadata.save_artist_info(&info).await?;
        Ok(())
    }
}

#[async_trait]
impl SearchIndexUpdateService for ArtistInfoUpdateService {
    fn name(&self) -> &'static str {
        "artist-info"
    }

    fn update_description(&self) -> &'static str {
        DESCRIPTION
    }

    fn progress(&self) -> Arc<UpdateProgress> {
        self.progress.clone()
    }

    #[instrument(skip(self))]
    async fn update_search_index(&self) -> Result<(), ApplicationError> {
        let subjects = self
            .deps
            .library
            .find_artists()
            .await?
            .into_iter()
            .map(InvocationSubject::Artist)
            .collect();

        run_throttled(
            self.deps.history.as_ref(),
            Calltype::ArtistGetInfo,
            &self.progress,
            subjects,
            self,
        )
        .await?;
        Ok(())
    }
}
