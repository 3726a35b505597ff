use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::shared::{normalize_name, DomainError};

fn require_name(kind: &str, name: &str) -> Result<String, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput(format!(
            "{} name cannot be empty",
            kind
        )));
    }
    Ok(trimmed.to_string())
}

/// Display name compared through its normalized form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
struct Name(String);

impl TryFrom<String> for Name {
    type Error = DomainError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        require_name("Subject", &name).map(Name)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        normalize_name(&self.0) == normalize_name(&other.0)
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        normalize_name(&self.0).hash(state);
    }
}

/// Artist value object
///
/// Keeps the capitalization it was created with for display, while equality
/// and hashing go through the normalized name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artist {
    name: Name,
}

impl Artist {
    pub fn new(name: impl AsRef<str>) -> Result<Self, DomainError> {
        let name = require_name("Artist", name.as_ref())?;
        Ok(Self { name: Name(name) })
    }

    pub fn name(&self) -> &str {
        &self.name.0
    }

    /// Normalized identity, as stored in the database
    pub fn key(&self) -> String {
        normalize_name(&self.name.0)
    }
}

impl std::fmt::Display for Artist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name.0)
    }
}

/// Track value object, identified by (artist, title)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    artist: Artist,
    name: Name,
}

impl Track {
    pub fn new(artist: Artist, name: impl AsRef<str>) -> Result<Self, DomainError> {
        let name = require_name("Track", name.as_ref())?;
        Ok(Self {
            artist,
            name: Name(name),
        })
    }

    /// Convenience constructor validating both names
    pub fn from_names(artist: impl AsRef<str>, name: impl AsRef<str>) -> Result<Self, DomainError> {
        Self::new(Artist::new(artist)?, name)
    }

    pub fn artist(&self) -> &Artist {
        &self.artist
    }

    pub fn name(&self) -> &str {
        &self.name.0
    }

    pub fn key(&self) -> String {
        normalize_name(&self.name.0)
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.artist, self.name.0)
    }
}

/// Album value object, identified by (artist, album name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Album {
    artist: Artist,
    name: Name,
}

impl Album {
    pub fn new(artist: Artist, name: impl AsRef<str>) -> Result<Self, DomainError> {
        let name = require_name("Album", name.as_ref())?;
        Ok(Self {
            artist,
            name: Name(name),
        })
    }

    pub fn from_names(artist: impl AsRef<str>, name: impl AsRef<str>) -> Result<Self, DomainError> {
        Self::new(Artist::new(artist)?, name)
    }

    pub fn artist(&self) -> &Artist {
        &self.artist
    }

    pub fn name(&self) -> &str {
        &self.name.0
    }

    pub fn key(&self) -> String {
        normalize_name(&self.name.0)
    }
}

impl std::fmt::Display for Album {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.artist, self.name.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_empty_artist_rejected() {
        assert!(matches!(Artist::new(""), Err(DomainError::InvalidInput(_))));
        assert!(matches!(Artist::new("   "), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_track_rejected() {
        let artist = Artist::new("Bill Fay").unwrap();
        assert!(Track::new(artist, "").is_err());
        assert!(Track::from_names("", "Omega").is_err());
    }

    #[test]
    fn test_artist_equality_ignores_case() {
        let a = Artist::new("Björk").unwrap();
        let b = Artist::new("BJÖRK").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.key(), "BJÖRK");
        assert_eq!(a.name(), "Björk");

        let set: HashSet<Artist> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_track_identity_includes_artist() {
        let original = Track::from_names("Daniel Johnston", "True Love Will Find You In The End").unwrap();
        let cover = Track::from_names("Headless Heroes", "True Love Will Find You In The End").unwrap();
        assert_ne!(original, cover);

        let shouted = Track::from_names("DANIEL JOHNSTON", "TRUE LOVE WILL FIND YOU IN THE END").unwrap();
        assert_eq!(original, shouted);
    }

    #[test]
    fn test_deserialized_artist_keeps_identity() {
        let artist = Artist::new("Espers").unwrap();
        let json = serde_json::to_string(&artist).unwrap();
        let restored: Artist = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, artist);
        assert_eq!(restored.name(), "Espers");
    }

    #[test]
    fn test_deserializing_blank_names_is_rejected() {
        assert!(serde_json::from_str::<Artist>(r#"{"name":""}"#).is_err());
        assert!(serde_json::from_str::<Artist>(r#"{"name":"   "}"#).is_err());
        assert!(serde_json::from_str::<Track>(r#"{"artist":{"name":"Bill Fay"},"name":""}"#).is_err());
        assert!(serde_json::from_str::<Album>(r#"{"artist":{"name":""},"name":"Omega"}"#).is_err());

        let track: Track =
            serde_json::from_str(r#"{"artist":{"name":"Bill Fay"},"name":"Omega"}"#).unwrap();
        assert_eq!(track, Track::from_names("Bill Fay", "Omega").unwrap());
    }
}
