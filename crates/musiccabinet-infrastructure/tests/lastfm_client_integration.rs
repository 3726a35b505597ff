use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use musiccabinet_domain::metadata::{MetadataClient, WebserviceError};
use musiccabinet_domain::music::{Album, Artist, Track};
use musiccabinet_infrastructure::http::LastFmClient;

async fn client_for(server: &MockServer) -> LastFmClient {
    LastFmClient::new("test-key", &format!("{}/2.0/", server.uri())).expect("client")
}

#[tokio::test]
async fn fetches_artist_info_with_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2.0/"))
        .and(query_param("method", "artist.getInfo"))
        .and(query_param("artist", "Håll Det Äkta"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artist": {
                "name": "Håll Det Äkta",
                "image": [{"#text": "http://img/hda.png", "size": "large"}],
                "stats": {"listeners": "1200", "playcount": "34000"},
                "bio": {"summary": "Swedish hip hop."}
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let info = client
        .fetch_artist_info(&Artist::new("Håll Det Äkta").expect("artist"))
        .await
        .expect("artist info");

    assert_eq!(info.listeners(), 1200);
    assert_eq!(info.image_url(), Some("http://img/hda.png"));
}

#[tokio::test]
async fn unknown_track_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("method", "track.getSimilar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": 6,
            "message": "Track not found"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let track = Track::from_names("Nobody", "Nothing").expect("track");
    let result = client.fetch_track_similar(&track).await;

    assert!(matches!(result, Err(WebserviceError::NotFound(_))));
}

#[tokio::test]
async fn invalid_api_key_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": 10,
            "message": "Invalid API key - You must be granted a valid key by last.fm"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = client
        .fetch_artist_similar(&Artist::new("Björk").expect("artist"))
        .await;

    let error = result.expect_err("should fail");
    assert!(error.is_fatal(), "{:?}", error);
}

#[tokio::test]
async fn server_errors_are_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let album = Album::from_names("Bill Fay", "Life Is People").expect("album");
    let error = client.fetch_album_info(&album).await.expect_err("should fail");

    assert!(matches!(error, WebserviceError::Unavailable(_)));
    assert!(error.is_quarantine());
}

#[tokio::test]
async fn rate_limit_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": 29,
            "message": "Rate Limit Exceeded"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let error = client
        .fetch_artist_top_tracks(&Artist::new("Madonna").expect("artist"))
        .await
        .expect_err("should fail");

    assert!(matches!(error, WebserviceError::RateLimited(_)));
}
