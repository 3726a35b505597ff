use async_trait::async_trait;

use super::{Calltype, InvocationSubject, InvocationTime, WebserviceInvocation};
use crate::shared::DomainError;

#[async_trait]
pub trait WebserviceHistoryRepository: Send + Sync {
    /// Whether a new call for this invocation is currently permitted.
    async fn is_invocation_allowed(
        &self,
        invocation: &WebserviceInvocation,
    ) -> Result<bool, DomainError>;

    /// Latest recorded invocation time, `None` when never invoked.
    async fn find_last_invocation(
        &self,
        invocation: &WebserviceInvocation,
    ) -> Result<Option<InvocationTime>, DomainError>;

    /// Record "now" as the invocation time.
    async fn log_invocation(&self, invocation: &WebserviceInvocation) -> Result<(), DomainError>;

    /// Atomically log "now" if, and only if, the invocation is allowed.
    ///
    /// Returns `false` when another record still suppresses the call, so two
    /// workers can never both claim the same pair.
    async fn try_claim_invocation(
        &self,
        invocation: &WebserviceInvocation,
    ) -> Result<bool, DomainError>;

    /// Put back the record a claim replaced, removing it when there was none.
    ///
    /// Used when a claimed call neither succeeded nor failed in a way that
    /// quarantines or blocks it.
    async fn restore_invocation(
        &self,
        invocation: &WebserviceInvocation,
        previous: Option<InvocationTime>,
    ) -> Result<(), DomainError>;

    /// Record an invocation time shortly in the future, suppressing retries
    /// after a failed call.
    async fn quarantine_invocation(
        &self,
        invocation: &WebserviceInvocation,
    ) -> Result<(), DomainError>;

    /// Record an infinitely distant invocation time.
    async fn block_invocation(&self, invocation: &WebserviceInvocation)
        -> Result<(), DomainError>;

    /// Library subjects of the calltype's scope that have no record at all
    /// for this calltype.
    async fn find_subjects_without_invocations(
        &self,
        calltype: Calltype,
    ) -> Result<Vec<InvocationSubject>, DomainError>;
}
