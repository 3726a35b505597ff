mod parse;
mod types;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::TimeoutConfig;
use musiccabinet_domain::album_info::AlbumInfo;
use musiccabinet_domain::metadata::{
    ArtistInfo, ArtistRelation, MetadataClient, TrackRelation, WebserviceError,
};
use musiccabinet_domain::music::{Album, Artist, Track};

pub use parse::map_error_code;

pub const DEFAULT_BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";

const USER_AGENT: &str = concat!("musiccabinet/", env!("CARGO_PKG_VERSION"));

/// Last.fm webservice client.
///
/// Each call is a single GET; throttling and retries belong to the caller,
/// which reacts to the [`WebserviceError`] classification.
pub struct LastFmClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl LastFmClient {
    pub fn new(api_key: impl Into<String>, base_url: &str) -> anyhow::Result<Self> {
        let timeouts = TimeoutConfig::global();
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeouts.http_request)
            .connect_timeout(timeouts.http_connect)
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid Last.fm base URL: {}", base_url))?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Call one API method and return the raw JSON body.
    async fn call(&self, method: &str, params: &[(&str, &str)]) -> Result<String, WebserviceError> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("method", method)
            .append_pair("api_key", &self.api_key)
            .append_pair("format", "json")
            .extend_pairs(params.iter().copied());

        log::debug!("Calling Last.fm {} {:?}", method, params);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                WebserviceError::Timeout(format!("{}: {}", method, e))
            } else {
                WebserviceError::Unavailable(format!("{}: {}", method, e))
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                WebserviceError::Timeout(format!("{}: {}", method, e))
            } else {
                WebserviceError::Unavailable(format!("{}: failed to read body: {}", method, e))
            }
        })?;

        // Last.fm reports API errors as JSON, often with a 4xx status
        if let Some(error) = parse::api_error(&body) {
            log::warn!("Last.fm {} failed: {}", method, error);
            return Err(error);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(WebserviceError::RateLimited(format!("{}: HTTP {}", method, status)));
        }
        if status.is_server_error() {
            return Err(WebserviceError::Unavailable(format!("{}: HTTP {}", method, status)));
        }
        if !status.is_success() {
            return Err(WebserviceError::InvalidResponse(format!(
                "{}: HTTP {}: {}",
                method,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl MetadataClient for LastFmClient {
    async fn fetch_artist_info(&self, artist: &Artist) -> Result<ArtistInfo, WebserviceError> {
        let body = self
            .call("artist.getInfo", &[("artist", artist.name())])
            .await?;
        parse::artist_info(artist, &body)
    }

    async fn fetch_artist_top_tracks(
        &self,
        artist: &Artist,
    ) -> Result<Vec<Track>, WebserviceError> {
        let body = self
            .call("artist.getTopTracks", &[("artist", artist.name())])
            .await?;
        parse::artist_top_tracks(artist, &body)
    }

    async fn fetch_artist_similar(
        &self,
        artist: &Artist,
    ) -> Result<Vec<ArtistRelation>, WebserviceError> {
        let body = self
            .call("artist.getSimilar", &[("artist", artist.name())])
            .await?;
        parse::artist_similar(&body)
    }

    async fn fetch_track_similar(
        &self,
        track: &Track,
    ) -> Result<Vec<TrackRelation>, WebserviceError> {
        let body = self
            .call(
                "track.getSimilar",
                &[("artist", track.artist().name()), ("track", track.name())],
            )
            .await?;
        parse::track_similar(&body)
    }

    async fn fetch_album_info(&self, album: &Album) -> Result<AlbumInfo, WebserviceError> {
        let body = self
            .call(
                "album.getInfo",
                &[("artist", album.artist().name()), ("album", album.name())],
            )
            .await?;
        parse::album_info(album, &body)
    }
}
