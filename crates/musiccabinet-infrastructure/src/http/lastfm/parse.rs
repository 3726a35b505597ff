use serde::de::DeserializeOwned;

use super::types::{
    image_url, AlbumInfoResponse, ArtistInfoResponse, ErrorResponse, SimilarArtistsResponse,
    SimilarTracksResponse, TopTracksResponse,
};
use musiccabinet_domain::album_info::AlbumInfo;
use musiccabinet_domain::metadata::{ArtistInfo, ArtistRelation, TrackRelation, WebserviceError};
use musiccabinet_domain::music::{Album, Artist, Track};

/// Classify a Last.fm API error code.
pub fn map_error_code(code: u32, message: &str) -> WebserviceError {
    let detail = format!("error {}: {}", code, message);
    match code {
        // Invalid parameters, which is what unknown artists/tracks/albums produce
        6 => WebserviceError::NotFound(detail),
        // Authentication failed, invalid API key, suspended API key
        4 | 10 | 26 => WebserviceError::Unauthorized(detail),
        29 => WebserviceError::RateLimited(detail),
        // Operation failed, service offline, temporarily unavailable
        8 | 11 | 16 => WebserviceError::Unavailable(detail),
        _ => WebserviceError::InvalidResponse(detail),
    }
}

pub(super) fn api_error(body: &str) -> Option<WebserviceError> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|e| map_error_code(e.error, &e.message))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, WebserviceError> {
    if let Some(error) = api_error(body) {
        return Err(error);
    }
    serde_json::from_str(body).map_err(|e| WebserviceError::InvalidResponse(e.to_string()))
}

pub(super) fn artist_info(artist: &Artist, body: &str) -> Result<ArtistInfo, WebserviceError> {
    let response: ArtistInfoResponse = decode(body)?;
    let body = response.artist;

    // Autocorrected names in the response must not replace the requested subject
    let image = image_url(&body.image, "extralarge").or_else(|| image_url(&body.image, "large"));

    Ok(ArtistInfo::new(artist.clone(), body.stats.listeners, body.stats.playcount)
        .with_image_url(image)
        .with_bio_summary(body.bio.map(|bio| bio.summary)))
}

pub(super) fn artist_top_tracks(artist: &Artist, body: &str) -> Result<Vec<Track>, WebserviceError> {
    let response: TopTracksResponse = decode(body)?;

    Ok(response
        .toptracks
        .track
        .into_vec()
        .into_iter()
        .filter_map(|track| {
            let track_artist = match track.artist {
                Some(named) => Artist::new(named.name).ok()?,
                None => artist.clone(),
            };
            Track::new(track_artist, track.name).ok()
        })
        .collect())
}

pub(super) fn artist_similar(body: &str) -> Result<Vec<ArtistRelation>, WebserviceError> {
    let response: SimilarArtistsResponse = decode(body)?;

    Ok(response
        .similarartists
        .artist
        .into_vec()
        .into_iter()
        .filter_map(|similar| {
            Artist::new(similar.name)
                .ok()
                .map(|target| ArtistRelation::new(target, similar.weight as f32))
        })
        .collect())
}

pub(super) fn track_similar(body: &str) -> Result<Vec<TrackRelation>, WebserviceError> {
    let response: SimilarTracksResponse = decode(body)?;

    Ok(response
        .similartracks
        .track
        .into_vec()
        .into_iter()
        .filter_map(|similar| {
            Track::from_names(similar.artist.name, similar.name)
                .ok()
                .map(|target| TrackRelation::new(target, similar.weight as f32))
        })
        .collect())
}

pub(super) fn album_info(album: &Album, body: &str) -> Result<AlbumInfo, WebserviceError> {
    let response: AlbumInfoResponse = decode(body)?;
    let body = response.album;

    Ok(AlbumInfo::new(album.clone())
        .with_image_urls(
            image_url(&body.image, "small"),
            image_url(&body.image, "medium"),
            image_url(&body.image, "large"),
            image_url(&body.image, "extralarge"),
        )
        .with_counts(body.listeners, body.playcount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert!(map_error_code(6, "The artist you supplied could not be found").is_block());
        assert!(map_error_code(10, "Invalid API key").is_fatal());
        assert!(map_error_code(26, "Suspended API key").is_fatal());
        assert!(map_error_code(29, "Rate limit exceeded").is_quarantine());
        assert!(map_error_code(11, "Service Offline").is_quarantine());
        assert!(map_error_code(99, "?").is_quarantine());
    }

    #[test]
    fn test_error_body_wins_over_payload() {
        let body = r#"{"error":6,"message":"The artist you supplied could not be found","links":[]}"#;
        let artist = Artist::new("Nobody Here").unwrap();
        let result = artist_info(&artist, body);
        assert!(matches!(result, Err(WebserviceError::NotFound(_))));
    }

    #[test]
    fn test_artist_info_with_string_counts() {
        let body = r##"{"artist":{"name":"Bill Fay",
            "image":[{"#text":"http://img/s.png","size":"small"},
                     {"#text":"http://img/xl.png","size":"extralarge"}],
            "stats":{"listeners":"40123","playcount":"612000"},
            "bio":{"summary":"English singer-songwriter."}}}"##;
        let artist = Artist::new("bill fay").unwrap();
        let info = artist_info(&artist, body).unwrap();
        assert_eq!(info.artist().name(), "bill fay");
        assert_eq!(info.listeners(), 40123);
        assert_eq!(info.play_count(), 612000);
        assert_eq!(info.image_url(), Some("http://img/xl.png"));
        assert_eq!(info.bio_summary(), Some("English singer-songwriter."));
    }

    #[test]
    fn test_single_similar_track_as_object() {
        let body = r#"{"similartracks":{"track":
            {"name":"Don't Let My Marigolds Die","match":"0.42","artist":{"name":"Bill Fay"}}}}"#;
        let relations = track_similar(body).unwrap();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].target.name(), "Don't Let My Marigolds Die");
        assert!((relations[0].weight - 0.42).abs() < 1e-6);
    }

    #[test]
    fn test_similar_artists_skip_blank_names() {
        let body = r#"{"similarartists":{"artist":[
            {"name":"Vashti Bunyan","match":1},
            {"name":"  ","match":0.5},
            {"name":"Espers","match":"0.31"}]}}"#;
        let relations = artist_similar(body).unwrap();
        let names: Vec<_> = relations.iter().map(|r| r.target.name()).collect();
        assert_eq!(names, vec!["Vashti Bunyan", "Espers"]);
    }

    #[test]
    fn test_top_tracks_default_to_requested_artist() {
        let body = r#"{"toptracks":{"track":[{"name":"Omega"},{"name":"Be Not So Fearful","artist":{"name":"Bill Fay"}}]}}"#;
        let artist = Artist::new("Bill Fay").unwrap();
        let tracks = artist_top_tracks(&artist, body).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].artist(), &artist);
        assert_eq!(tracks[1].name(), "Be Not So Fearful");
    }

    #[test]
    fn test_malformed_payload_is_invalid_response() {
        let artist = Artist::new("Bill Fay").unwrap();
        let result = artist_top_tracks(&artist, "<html>oops</html>");
        assert!(matches!(result, Err(WebserviceError::InvalidResponse(_))));
    }

    #[test]
    fn test_album_info_images() {
        let body = r##"{"album":{"name":"Time of the Last Persecution","artist":"Bill Fay",
            "image":[{"#text":"","size":"small"},{"#text":"http://img/m.png","size":"medium"}],
            "listeners":"9000","playcount":"81000"}}"##;
        let album = Album::from_names("Bill Fay", "Time of the Last Persecution").unwrap();
        let info = album_info(&album, body).unwrap();
        assert_eq!(info.small_image_url(), None);
        assert_eq!(info.medium_image_url(), Some("http://img/m.png"));
        assert_eq!(info.listeners(), 9000);
    }

    #[test]
    fn test_corrected_names_keep_requested_subject() {
        let body = r#"{"artist":{"name":"Beyoncé","stats":{"listeners":"5","playcount":"9"}}}"#;
        let artist = Artist::new("Beyonce").unwrap();
        let info = artist_info(&artist, body).unwrap();
        assert_eq!(info.artist().name(), "Beyonce");
        assert_eq!(info.artist().key(), "BEYONCE");

        let body = r#"{"album":{"name":"Dangerously in Love","artist":"Beyoncé","listeners":"3"}}"#;
        let album = Album::from_names("Beyonce", "Dangerously In Love").unwrap();
        let info = album_info(&album, body).unwrap();
        assert_eq!(info.album().name(), "Dangerously In Love");
        assert_eq!(info.album().artist().name(), "Beyonce");
        assert_eq!(info.listeners(), 3);
    }
}
