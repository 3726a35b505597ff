use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::DomainError;

/// Which kind of subject a calltype is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectScope {
    Artist,
    Track,
    ScrobblePage,
}

/// Categories of metadata webservice calls, each with its own cache horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Calltype {
    ArtistGetSimilar,
    ArtistGetTopTracks,
    TrackGetSimilar,
    GetScrobbledTracks,
    ArtistGetInfo,
}

impl Calltype {
    pub const ALL: [Calltype; 5] = [
        Calltype::ArtistGetSimilar,
        Calltype::ArtistGetTopTracks,
        Calltype::TrackGetSimilar,
        Calltype::GetScrobbledTracks,
        Calltype::ArtistGetInfo,
    ];

    /// Stable identifier stored in `webservice_history.calltype_id`
    pub fn database_id(&self) -> i64 {
        match self {
            Calltype::ArtistGetSimilar => 1,
            Calltype::ArtistGetTopTracks => 2,
            Calltype::TrackGetSimilar => 3,
            Calltype::GetScrobbledTracks => 4,
            Calltype::ArtistGetInfo => 5,
        }
    }

    pub fn from_database_id(id: i64) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|calltype| calltype.database_id() == id)
            .ok_or_else(|| DomainError::DataIntegrity(format!("Unknown calltype id: {}", id)))
    }

    /// Number of days a logged invocation suppresses new calls
    pub fn days_to_cache(&self) -> i64 {
        match self {
            Calltype::ArtistGetSimilar => 30,
            Calltype::ArtistGetTopTracks => 30,
            Calltype::TrackGetSimilar => 14,
            Calltype::GetScrobbledTracks => 7,
            Calltype::ArtistGetInfo => 30,
        }
    }

    pub fn scope(&self) -> SubjectScope {
        match self {
            Calltype::ArtistGetSimilar | Calltype::ArtistGetTopTracks | Calltype::ArtistGetInfo => {
                SubjectScope::Artist
            }
            Calltype::TrackGetSimilar => SubjectScope::Track,
            Calltype::GetScrobbledTracks => SubjectScope::ScrobblePage,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Calltype::ArtistGetSimilar => "artist-get-similar",
            Calltype::ArtistGetTopTracks => "artist-get-top-tracks",
            Calltype::TrackGetSimilar => "track-get-similar",
            Calltype::GetScrobbledTracks => "get-scrobbled-tracks",
            Calltype::ArtistGetInfo => "artist-get-info",
        }
    }
}

impl fmt::Display for Calltype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Calltype {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|calltype| calltype.as_str() == s)
            .ok_or_else(|| DomainError::InvalidInput(format!("Unknown calltype: {}", s)))
    }
}
