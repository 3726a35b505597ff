use serde::{Deserialize, Serialize};

mod normalization;

pub use normalization::normalize_name;

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Resource Not Found (2xxx)
    ArtistNotFound = 2001,
    AlbumNotFound = 2002,
    TrackNotFound = 2003,

    // Business Logic (3xxx)
    InvocationNotAllowed = 3001,
    UpdateAlreadyRunning = 3002,

    // Data & Persistence (4xxx)
    RepositoryError = 4001,
    DatabaseConstraintViolation = 4002,
    DataIntegrityError = 4003,
    SerializationError = 4004,

    // Infrastructure (5xxx)
    InfrastructureError = 5001,
    NetworkError = 5002,
    TimeoutError = 5003,
    ExternalServiceError = 5004,

    // Validation (6xxx)
    ValidationError = 6001,
    InvalidInput = 6002,
    MissingRequiredField = 6003,
}

impl ErrorCode {
    /// Get error code as integer
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCode::InvocationNotAllowed
            | ErrorCode::UpdateAlreadyRunning
            | ErrorCode::NetworkError => ErrorSeverity::Warning,

            ErrorCode::ArtistNotFound
            | ErrorCode::AlbumNotFound
            | ErrorCode::TrackNotFound
            | ErrorCode::ValidationError
            | ErrorCode::InvalidInput => ErrorSeverity::Info,

            ErrorCode::DataIntegrityError
            | ErrorCode::DatabaseConstraintViolation
            | ErrorCode::InfrastructureError => ErrorSeverity::Error,

            _ => ErrorSeverity::Warning,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorCode::NetworkError | ErrorCode::TimeoutError | ErrorCode::ExternalServiceError
        )
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl DomainError {
    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Repository(_) => ErrorCode::RepositoryError,
            DomainError::Infrastructure(_) => ErrorCode::InfrastructureError,
            DomainError::Validation(_) => ErrorCode::ValidationError,
            DomainError::DataIntegrity(_) => ErrorCode::DataIntegrityError,
            DomainError::InvalidInput(_) => ErrorCode::InvalidInput,
            DomainError::Serialization(_) => ErrorCode::SerializationError,
            DomainError::NotFound(_) => ErrorCode::ArtistNotFound,
        }
    }

    /// Get error message
    pub fn message(&self) -> &str {
        match self {
            DomainError::Repository(msg)
            | DomainError::Infrastructure(msg)
            | DomainError::Validation(msg)
            | DomainError::DataIntegrity(msg)
            | DomainError::InvalidInput(msg)
            | DomainError::Serialization(msg)
            | DomainError::NotFound(msg) => msg,
        }
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        self.code().severity()
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        self.code().is_recoverable()
    }

    /// Format error with code
    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code().code(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_formatting() {
        let err = DomainError::InvalidInput("artist name cannot be empty".to_string());
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert_eq!(
            err.format_with_code(),
            "[6002] Invalid input: artist name cannot be empty"
        );
        assert_eq!(err.message(), "artist name cannot be empty");
    }

    #[test]
    fn test_repository_errors_are_not_recoverable() {
        let err = DomainError::Repository("disk I/O error".to_string());
        assert!(!err.is_recoverable());
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_network_errors_are_recoverable() {
        assert!(ErrorCode::NetworkError.is_recoverable());
        assert!(ErrorCode::TimeoutError.is_recoverable());
        assert!(!ErrorCode::ValidationError.is_recoverable());
    }
}
