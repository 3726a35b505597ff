use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::UpdateProgress;
use crate::application::ApplicationError;
use musiccabinet_domain::music::{Artist, Track};
use musiccabinet_domain::shared::DomainError;
use musiccabinet_domain::webservice::{
    Calltype, InvocationSubject, WebserviceHistoryRepository, WebserviceInvocation,
};

/// Per-subject outcome counts of one job run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateSummary {
    pub updated: usize,
    pub quarantined: usize,
    pub blocked: usize,
    /// Claimed by someone else between the check and the claim
    pub skipped: usize,
}

/// Fetches and stores metadata for one subject of a throttled job
#[async_trait]
pub(super) trait SubjectHandler: Send + Sync {
    async fn fetch_and_store(&self, subject: &InvocationSubject) -> Result<(), ApplicationError>;
}

pub(super) fn expect_artist(subject: &InvocationSubject) -> Result<&Artist, ApplicationError> {
    match subject {
        InvocationSubject::Artist(artist) => Ok(artist),
        other => Err(DomainError::InvalidInput(format!("Expected an artist, got '{}'", other)).into()),
    }
}

pub(super) fn expect_track(subject: &InvocationSubject) -> Result<&Track, ApplicationError> {
    match subject {
        InvocationSubject::Track(track) => Ok(track),
        other => Err(DomainError::InvalidInput(format!("Expected a track, got '{}'", other)).into()),
    }
}

/// Run `handler` for every subject whose invocation is currently allowed.
///
/// Each subject is claimed before the call, logged after a successful store,
/// blocked when the service does not know it and quarantined on transient
/// failures. Fatal webservice errors and store errors end the run after the
/// claim is released, leaving the subject's history as it was.
pub(super) async fn run_throttled<H>(
    history: &dyn WebserviceHistoryRepository,
    calltype: Calltype,
    progress: &UpdateProgress,
    subjects: Vec<InvocationSubject>,
    handler: &H,
) -> Result<UpdateSummary, ApplicationError>
where
    H: SubjectHandler + ?Sized,
{
    let mut invocations = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let invocation = WebserviceInvocation::new(calltype, subject)?;
        if history.is_invocation_allowed(&invocation).await? {
            invocations.push(invocation);
        }
    }

    progress.set_total_operations(invocations.len());
    info!(%calltype, subjects = invocations.len(), "Invocations due");

    let mut summary = UpdateSummary::default();
    for invocation in invocations {
        let previous = history.find_last_invocation(&invocation).await?;
        if !history.try_claim_invocation(&invocation).await? {
            debug!(%invocation, "Invocation claimed elsewhere, skipping");
            summary.skipped += 1;
            progress.add_finished_operation();
            continue;
        }

        match handler.fetch_and_store(invocation.subject()).await {
            Ok(()) => {
                history.log_invocation(&invocation).await?;
                summary.updated += 1;
            }
            Err(ApplicationError::Webservice(e)) if e.is_block() => {
                warn!(%invocation, error = %e, "Subject unknown to webservice, blocking");
                history.block_invocation(&invocation).await?;
                summary.blocked += 1;
            }
            Err(ApplicationError::Webservice(e)) if e.is_quarantine() => {
                warn!(%invocation, error = %e, "Webservice call failed, quarantining");
                history.quarantine_invocation(&invocation).await?;
                summary.quarantined += 1;
            }
            Err(e) => {
                error!(%invocation, error = %e, "Aborting update");
                // Release the claim so the subject stays due
                if let Err(restore_error) = history.restore_invocation(&invocation, previous).await
                {
                    warn!(%invocation, error = %restore_error, "Failed to release claim");
                }
                return Err(e);
            }
        }

        progress.add_finished_operation();
    }

    info!(
        %calltype,
        updated = summary.updated,
        quarantined = summary.quarantined,
        blocked = summary.blocked,
        skipped = summary.skipped,
        "Invocations finished"
    );
    Ok(summary)
}
