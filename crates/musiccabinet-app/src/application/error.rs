use musiccabinet_domain::metadata::WebserviceError;
use musiccabinet_domain::shared::{DomainError, ErrorCode};

/// Failure of an update job or of the executor running it
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Webservice error: {0}")]
    Webservice(#[from] WebserviceError),

    #[error("Update '{0}' is already running")]
    AlreadyRunning(String),

    #[error("Unknown update job: {0}")]
    UnknownJob(String),
}

impl ApplicationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApplicationError::Domain(e) => e.code(),
            ApplicationError::Webservice(e) => e.code(),
            ApplicationError::AlreadyRunning(_) => ErrorCode::UpdateAlreadyRunning,
            ApplicationError::UnknownJob(_) => ErrorCode::InvalidInput,
        }
    }

    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code().code(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ApplicationError::AlreadyRunning("artist-info".to_string());
        assert_eq!(err.format_with_code(), "[3002] Update 'artist-info' is already running");

        let err: ApplicationError = DomainError::Repository("disk full".to_string()).into();
        assert_eq!(err.code(), ErrorCode::RepositoryError);

        let err: ApplicationError = WebserviceError::Timeout("artist.getInfo".to_string()).into();
        assert_eq!(err.code(), ErrorCode::TimeoutError);
    }
}
