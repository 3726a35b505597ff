use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::throttled::{expect_artist, run_throttled, SubjectHandler};
use super::{JobDependencies, SearchIndexUpdateService, UpdateProgress};
use crate::application::ApplicationError;
use musiccabinet_domain::webservice::{Calltype, InvocationSubject};

const DESCRIPTION: &str = "artist top tracks";

/// Fetches the most played tracks of each library artist.
pub struct ArtistTopTracksUpdateService {
    deps: JobDependencies,
    progress: Arc<UpdateProgress>,
}

impl ArtistTopTracksUpdateService {
    pub fn new(deps: JobDependencies) -> Self {
        Self {
            deps,
            progress: Arc::new(UpdateProgress::new(DESCRIPTION)),
        }
    }
}

#[async_trait]
impl SubjectHandler for ArtistTopTracksUpdateService {
    async fn fetch_and_store(&self, subject: &InvocationSubject) -> Result<(), ApplicationError> {
        let artist = expect_artist(subject)?;
        let tracks = self.deps.client.fetch_artist_top_tracks(artist).await?;
        debug!("{} top tracks for {}", tracks.len(), artist);
        self.deps
            .metadata
            .save_artist_top_tracks(artist, &tracks)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SearchIndexUpdateService for ArtistTopTracksUpdateService {
    fn name(&self) -> &'static str {
        "artist-top-tracks"
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
            Calltype::ArtistGetTopTracks,
            &self.progress,
            subjects,
            self,
        )
        .await?;
        Ok(())
    }
}
