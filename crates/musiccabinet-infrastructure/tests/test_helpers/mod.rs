#![allow(dead_code)]

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

use musiccabinet_domain::library::{LibraryRepository, MusicFile};
use musiccabinet_domain::music::{Album, Track};
use musiccabinet_infrastructure::persistence::repositories::SqliteLibraryRepository;
use musiccabinet_infrastructure::persistence::Database;

/// Fresh migrated in-memory database
pub async fn setup_in_memory_db() -> SqlitePool {
    let db = Database::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.run_migrations().await.expect("Failed to run migrations");
    db.pool().clone()
}

pub fn music_file(path: &str, artist: &str, album: Option<&str>, track: &str) -> MusicFile {
    let track = Track::from_names(artist, track).expect("valid track");
    let album = album.map(|name| Album::new(track.artist().clone(), name).expect("valid album"));
    let created = Utc::now() - Duration::days(30);
    MusicFile::new(path, track, album, created, created).expect("valid music file")
}

/// Put files into the library so their artists and tracks become known subjects
pub async fn add_to_library(pool: &SqlitePool, files: &[MusicFile]) {
    SqliteLibraryRepository::new(Arc::new(pool.clone()))
        .add_music_files(files)
        .await
        .expect("add music files");
}
