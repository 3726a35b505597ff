#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use mockall::mock;
use std::sync::Arc;
use tempfile::TempDir;

use musiccabinet_app::application::services::ConfigService;
use musiccabinet_app::presentation::state::AppState;
use musiccabinet_domain::album_info::AlbumInfo;
use musiccabinet_domain::library::{LibraryRepository, MusicFile};
use musiccabinet_domain::metadata::{
    ArtistInfo, ArtistRelation, MetadataClient, TrackRelation, WebserviceError,
};
use musiccabinet_domain::music::{Album, Artist, Track};
use musiccabinet_infrastructure::persistence::Database;

mock! {
    pub Client {}

    #[async_trait]
    impl MetadataClient for Client {
        async fn fetch_artist_info(&self, artist: &Artist) -> Result<ArtistInfo, WebserviceError>;
        async fn fetch_artist_top_tracks(&self, artist: &Artist) -> Result<Vec<Track>, WebserviceError>;
        async fn fetch_artist_similar(&self, artist: &Artist) -> Result<Vec<ArtistRelation>, WebserviceError>;
        async fn fetch_track_similar(&self, track: &Track) -> Result<Vec<TrackRelation>, WebserviceError>;
        async fn fetch_album_info(&self, album: &Album) -> Result<AlbumInfo, WebserviceError>;
    }
}

/// App state over a fresh in-memory database. Keep the `TempDir` alive for
/// as long as the state is used.
pub async fn setup_state() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = ConfigService::with_dirs(dir.path().join("config"), dir.path())
        .expect("config service");

    let database = Database::in_memory()
        .await
        .expect("Failed to create in-memory database");
    database
        .run_migrations()
        .await
        .expect("Failed to run migrations");

    (AppState::new(database, Arc::new(config)), dir)
}

pub fn music_file(path: &str, artist: &str, album: Option<&str>, track: &str) -> MusicFile {
    let track = Track::from_names(artist, track).expect("valid track");
    let album = album.map(|name| Album::new(track.artist().clone(), name).expect("valid album"));
    let created = Utc::now() - Duration::days(30);
    MusicFile::new(path, track, album, created, created).expect("valid music file")
}

pub async fn add_to_library(state: &AppState, files: &[MusicFile]) {
    state
        .repositories
        .library
        .add_music_files(files)
        .await
        .expect("add music files");
}
