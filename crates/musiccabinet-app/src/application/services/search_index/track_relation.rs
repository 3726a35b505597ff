use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::throttled::{expect_track, run_throttled, SubjectHandler};
use super::{JobDependencies, SearchIndexUpdateService, UpdateProgress};
use crate::application::ApplicationError;
use musiccabinet_domain::webservice::{Calltype, InvocationSubject};

const DESCRIPTION: &str = "track relations";

/// Fetches similar tracks for every track in the library.
///
/// Tracks are throttled individually, so a cover and its original are
/// fetched on their own schedules.
pub struct TrackRelationUpdateService {
    deps: JobDependencies,
    progress: Arc<UpdateProgress>,
}

impl TrackRelationUpdateService {
    pub fn new(deps: JobDependencies) -> Self {
        Self {
            deps,
            progress: Arc::new(UpdateProgress::new(DESCRIPTION)),
        }
    }
}

#[async_trait]
impl SubjectHandler for TrackRelationUpdateService {
    async fn fetch_and_store(&self, subject: &InvocationSubject) -> Result<(), ApplicationError> {
        let track = expect_track(subject)?;
        let relations = self.deps.client.fetch_track_similar(track).await?;
        debug!("{} similar tracks for {}", relations.len(), track);
        self.deps
            .metadata
            .save_track_relations(track, &relations)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SearchIndexUpdateService for TrackRelationUpdateService {
    fn name(&self) -> &'static str {
        "track-relations"
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
            .find_tracks()
            .await?
            .into_iter()
            .map(InvocationSubject::Track)
            .collect();

        run_throttled(
            self.deps.history.as_ref(),
            Calltype::TrackGetSimilar,
            &self.progress,
            subjects,
            self,
        )
        .await?;
        Ok(())
    }
}
