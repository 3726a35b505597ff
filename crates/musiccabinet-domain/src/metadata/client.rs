use async_trait::async_trait;

use super::{ArtistInfo, ArtistRelation, TrackRelation};
use crate::album_info::AlbumInfo;
use crate::music::{Album, Artist, Track};
use crate::shared::ErrorCode;

/// Failure of a metadata webservice call
///
/// The variant decides how the throttle reacts: unknown subjects are blocked,
/// transient failures quarantined, credential problems abort the update.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebserviceError {
    #[error("Subject not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl WebserviceError {
    /// The subject does not exist remotely, retrying is pointless
    pub fn is_block(&self) -> bool {
        matches!(self, WebserviceError::NotFound(_))
    }

    /// Worth retrying once the quarantine has passed
    pub fn is_quarantine(&self) -> bool {
        matches!(
            self,
            WebserviceError::RateLimited(_)
                | WebserviceError::Unavailable(_)
                | WebserviceError::Timeout(_)
                | WebserviceError::InvalidResponse(_)
        )
    }

    /// Every further call would fail the same way
    pub fn is_fatal(&self) -> bool {
        matches!(self, WebserviceError::Unauthorized(_))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            WebserviceError::NotFound(_) => ErrorCode::ArtistNotFound,
            WebserviceError::Timeout(_) => ErrorCode::TimeoutError,
            WebserviceError::Unavailable(_) => ErrorCode::NetworkError,
            WebserviceError::RateLimited(_)
            | WebserviceError::InvalidResponse(_)
            | WebserviceError::Unauthorized(_) => ErrorCode::ExternalServiceError,
        }
    }
}

/// External metadata service (Last.fm style API)
#[async_trait]
pub trait MetadataClient: Send + Sync {
    async fn fetch_artist_info(&self, artist: &Artist) -> Result<ArtistInfo, WebserviceError>;

    /// Most popular tracks, best first
    async fn fetch_artist_top_tracks(&self, artist: &Artist)
        -> Result<Vec<Track>, WebserviceError>;

    async fn fetch_artist_similar(
        &self,
        artist: &Artist,
    ) -> Result<Vec<ArtistRelation>, WebserviceError>;

    async fn fetch_track_similar(
        &self,
        track: &Track,
    ) -> Result<Vec<TrackRelation>, WebserviceError>;

    async fn fetch_album_info(&self, album: &Album) -> Result<AlbumInfo, WebserviceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification_is_exclusive() {
        let errors = [
            WebserviceError::NotFound("x".into()),
            WebserviceError::RateLimited("x".into()),
            WebserviceError::Unavailable("x".into()),
            WebserviceError::Timeout("x".into()),
            WebserviceError::InvalidResponse("x".into()),
            WebserviceError::Unauthorized("x".into()),
        ];
        for error in errors {
            let flags = [error.is_block(), error.is_quarantine(), error.is_fatal()];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{:?}", error);
        }
    }
}
