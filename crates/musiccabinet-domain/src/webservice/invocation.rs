use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::calltype::{Calltype, SubjectScope};
use crate::music::{Artist, Track};
use crate::shared::DomainError;

/// Separates artist and track keys inside a track subject key.
/// Must match `char(31)` in the SQL that rebuilds keys from library rows.
pub const SUBJECT_KEY_SEPARATOR: char = '\u{1f}';

/// What a webservice call is about
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvocationSubject {
    Artist(Artist),
    Track(Track),
    ScrobblePage(u32),
}

impl InvocationSubject {
    pub fn scope(&self) -> SubjectScope {
        match self {
            InvocationSubject::Artist(_) => SubjectScope::Artist,
            InvocationSubject::Track(_) => SubjectScope::Track,
            InvocationSubject::ScrobblePage(_) => SubjectScope::ScrobblePage,
        }
    }

    /// Normalized key identifying the subject in `webservice_history`
    pub fn key(&self) -> String {
        match self {
            InvocationSubject::Artist(artist) => format!("artist:{}", artist.key()),
            InvocationSubject::Track(track) => format!(
                "track:{}{}{}",
                track.artist().key(),
                SUBJECT_KEY_SEPARATOR,
                track.key()
            ),
            InvocationSubject::ScrobblePage(page) => format!("page:{}", page),
        }
    }
}

impl fmt::Display for InvocationSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationSubject::Artist(artist) => write!(f, "{}", artist),
            InvocationSubject::Track(track) => write!(f, "{}", track),
            InvocationSubject::ScrobblePage(page) => write!(f, "page {}", page),
        }
    }
}

/// A (calltype, subject) pair the throttle decides on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WebserviceInvocation {
    calltype: Calltype,
    subject: InvocationSubject,
}

impl WebserviceInvocation {
    pub fn new(calltype: Calltype, subject: InvocationSubject) -> Result<Self, DomainError> {
        if calltype.scope() != subject.scope() {
            return Err(DomainError::InvalidInput(format!(
                "Calltype {} cannot be invoked for {:?} subject '{}'",
                calltype,
                subject.scope(),
                subject
            )));
        }
        Ok(Self { calltype, subject })
    }

    /// Rejects a missing artist the same way an empty name is rejected
    pub fn for_artist(calltype: Calltype, artist: Option<&Artist>) -> Result<Self, DomainError> {
        let artist = artist
            .ok_or_else(|| DomainError::InvalidInput("Artist cannot be null".to_string()))?;
        Self::new(calltype, InvocationSubject::Artist(artist.clone()))
    }

    pub fn for_track(calltype: Calltype, track: Option<&Track>) -> Result<Self, DomainError> {
        let track =
            track.ok_or_else(|| DomainError::InvalidInput("Track cannot be null".to_string()))?;
        Self::new(calltype, InvocationSubject::Track(track.clone()))
    }

    pub fn for_page(calltype: Calltype, page: u32) -> Result<Self, DomainError> {
        Self::new(calltype, InvocationSubject::ScrobblePage(page))
    }

    pub fn calltype(&self) -> Calltype {
        self.calltype
    }

    pub fn subject(&self) -> &InvocationSubject {
        &self.subject
    }

    pub fn subject_key(&self) -> String {
        self.subject.key()
    }
}

impl fmt::Display for WebserviceInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.calltype, self.subject)
    }
}

/// Latest recorded invocation time for a (calltype, subject) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationTime {
    At(DateTime<Utc>),
    /// Blocked for good
    Infinity,
}

impl InvocationTime {
    /// Storage value for the infinite future
    pub const INFINITY_MILLIS: i64 = i64::MAX;

    pub fn to_millis(&self) -> i64 {
        match self {
            InvocationTime::At(time) => time.timestamp_millis(),
            InvocationTime::Infinity => Self::INFINITY_MILLIS,
        }
    }

    pub fn from_millis(millis: i64) -> Result<Self, DomainError> {
        if millis == Self::INFINITY_MILLIS {
            return Ok(InvocationTime::Infinity);
        }
        DateTime::from_timestamp_millis(millis)
            .map(InvocationTime::At)
            .ok_or_else(|| {
                DomainError::DataIntegrity(format!("Invalid invocation time: {}", millis))
            })
    }

    pub fn is_after(&self, instant: DateTime<Utc>) -> bool {
        match self {
            InvocationTime::At(time) => *time > instant,
            InvocationTime::Infinity => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artist_rejected() {
        let result = WebserviceInvocation::for_artist(Calltype::ArtistGetTopTracks, None);
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_missing_track_rejected() {
        let result = WebserviceInvocation::for_track(Calltype::TrackGetSimilar, None);
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_scope_mismatch_rejected() {
        let artist = Artist::new("Espers").unwrap();
        let result = WebserviceInvocation::for_artist(Calltype::TrackGetSimilar, Some(&artist));
        assert!(result.is_err());

        let result = WebserviceInvocation::for_page(Calltype::ArtistGetInfo, 3);
        assert!(result.is_err());
    }

    #[test]
    fn test_subject_keys_are_normalized() {
        let lower = InvocationSubject::Artist(Artist::new("björk").unwrap());
        let upper = InvocationSubject::Artist(Artist::new("BJÖRK").unwrap());
        assert_eq!(lower.key(), upper.key());
        assert_eq!(lower.key(), "artist:BJÖRK");
    }

    #[test]
    fn test_track_keys_distinguish_covers() {
        let title = "True Love Will Find You In The End";
        let original = InvocationSubject::Track(Track::from_names("Daniel Johnston", title).unwrap());
        let cover = InvocationSubject::Track(Track::from_names("Headless Heroes", title).unwrap());
        assert_ne!(original.key(), cover.key());
        assert_eq!(
            original.key(),
            format!("track:DANIEL JOHNSTON\u{1f}{}", title.to_uppercase())
        );
    }

    #[test]
    fn test_page_keys() {
        assert_eq!(InvocationSubject::ScrobblePage(4).key(), "page:4");
    }

    #[test]
    fn test_invocation_time_millis() {
        assert_eq!(
            InvocationTime::from_millis(i64::MAX).unwrap(),
            InvocationTime::Infinity
        );
        let now = DateTime::from_timestamp_millis(Utc::now().timestamp_millis()).unwrap();
        let time = InvocationTime::At(now);
        assert_eq!(InvocationTime::from_millis(time.to_millis()).unwrap(), time);
        assert!(InvocationTime::Infinity.is_after(now));
    }

    #[test]
    fn test_deserialized_subject_keeps_name_rules() {
        let subject: InvocationSubject =
            serde_json::from_str(r#"{"Artist":{"name":"Björk"}}"#).unwrap();
        assert_eq!(subject.key(), "artist:BJÖRK");

        assert!(serde_json::from_str::<InvocationSubject>(r#"{"Artist":{"name":""}}"#).is_err());
    }
}
