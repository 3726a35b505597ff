use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::throttled::{expect_artist, run_throttled, SubjectHandler};
use super::{JobDependencies, SearchIndexUpdateService, UpdateProgress};
use crate::application::ApplicationError;
use musiccabinet_domain::webservice::{Calltype, InvocationSubject};

const DESCRIPTION: &str = "artist relations";

/// Fetches similar artists for every library artist.
pub struct ArtistRelationUpdateService {
    deps: JobDependencies,
    progress: Arc<UpdateProgress>,
}

impl ArtistRelationUpdateService {
    pub fn new(deps: JobDependencies) -> Self {
        Self {
            deps,
            progress: Arc::new(UpdateProgress::new(DESCRIPTION)),
        }
    }
}

#[async_trait]
impl SubjectHandler for ArtistRelationUpdateService {
    async fn fetch_and_store(&self, subject: &InvocationSubject) -> Result<(), ApplicationError> {
        let artist = expect_artist(subject)?;
        let relations = self.deps.client.fetch_artist_similar(artist).await?;
        debug!("{} similar artists for {}", relations.len(), artist);
        self.deps
            .metadata
            .save_artist_relations(artist, &relations)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SearchIndexUpdateService for ArtistRelationUpdateService {
    fn name(&self) -> &'static str {
        "artist-relations"
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
            Calltype::ArtistGetSimilar,
            &self.progress,
            subjects,
            self,
        )
        .await?;
        Ok(())
    }
}
