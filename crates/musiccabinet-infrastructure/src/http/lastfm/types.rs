//! Last.fm JSON payloads.
//!
//! Last.fm encodes most numbers as strings and collapses single-element lists
//! into a bare object, so both shapes are accepted.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
pub(super) struct ErrorResponse {
    pub error: u32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) => n,
        Some(NumberOrString::String(s)) => s.trim().parse().unwrap_or(0.0),
        None => 0.0,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_f64(deserializer)?;
    Ok(value.clamp(0.0, u32::MAX as f64) as u32)
}

#[derive(Debug, Deserialize)]
pub(super) struct Image {
    #[serde(rename = "#text", default)]
    pub url: String,
    #[serde(default)]
    pub size: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct Stats {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub listeners: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub playcount: u32,
}

#[derive(Debug, Deserialize)]
pub(super) struct Bio {
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ArtistInfoResponse {
    pub artist: ArtistInfoBody,
}

#[derive(Debug, Deserialize)]
pub(super) struct ArtistInfoBody {
    #[serde(default)]
    pub image: Vec<Image>,
    #[serde(default)]
    pub stats: Stats,
    pub bio: Option<Bio>,
}

#[derive(Debug, Deserialize)]
pub(super) struct NamedArtist {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct TopTracksResponse {
    pub toptracks: TopTracks,
}

#[derive(Debug, Deserialize)]
pub(super) struct TopTracks {
    #[serde(default)]
    pub track: OneOrMany<TopTrack>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TopTrack {
    pub name: String,
    pub artist: Option<NamedArtist>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SimilarArtistsResponse {
    pub similarartists: SimilarArtists,
}

#[derive(Debug, Deserialize)]
pub(super) struct SimilarArtists {
    #[serde(default)]
    pub artist: OneOrMany<SimilarArtist>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SimilarArtist {
    pub name: String,
    #[serde(rename = "match", default, deserialize_with = "lenient_f64")]
    pub weight: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct SimilarTracksResponse {
    pub similartracks: SimilarTracks,
}

#[derive(Debug, Deserialize)]
pub(super) struct SimilarTracks {
    #[serde(default)]
    pub track: OneOrMany<SimilarTrack>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SimilarTrack {
    pub name: String,
    pub artist: NamedArtist,
    #[serde(rename = "match", default, deserialize_with = "lenient_f64")]
    pub weight: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct AlbumInfoResponse {
    pub album: AlbumInfoBody,
}

#[derive(Debug, Deserialize)]
pub(super) struct AlbumInfoBody {
    #[serde(default)]
    pub image: Vec<Image>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub listeners: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub playcount: u32,
}

/// URL of the image with the given size label, if present and non-blank
pub(super) fn image_url(images: &[Image], size: &str) -> Option<String> {
    images
        .iter()
        .find(|image| image.size == size && !image.url.trim().is_empty())
        .map(|image| image.url.clone())
}
