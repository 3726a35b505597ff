use std::sync::Arc;

use musiccabinet_domain::library::LibraryRepository;
use musiccabinet_domain::music::{Artist, Track};
use musiccabinet_infrastructure::persistence::repositories::SqliteLibraryRepository;

mod test_helpers;

#[tokio::test]
async fn library_import_merges_spellings() {
    let pool = test_helpers::setup_in_memory_db().await;
    let repo = SqliteLibraryRepository::new(Arc::new(pool.clone()));

    repo.add_music_files(&[
        test_helpers::music_file("/music/bjork/joga.flac", "Björk", Some("Homogenic"), "Jóga"),
        test_helpers::music_file("/music/bjork/bachelorette.flac", "BJÖRK", Some("HOMOGENIC"), "Bachelorette"),
        test_helpers::music_file("/music/bill_fay/omega.mp3", "Bill Fay", None, "Omega"),
    ])
    .await
    .expect("add music files");

    let artists = repo.find_artists().await.expect("find artists");
    assert_eq!(artists.len(), 2);
    assert!(artists.contains(&Artist::new("björk").expect("artist")));

    let tracks = repo.find_tracks().await.expect("find tracks");
    assert_eq!(tracks.len(), 3);
    assert!(tracks.contains(&Track::from_names("Bill Fay", "Omega").expect("track")));

    let albums: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM albums")
        .fetch_one(&pool)
        .await
        .expect("count albums");
    assert_eq!(albums, 1);

    let staged: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM music_file_import")
        .fetch_one(&pool)
        .await
        .expect("count staging rows");
    assert_eq!(staged, 0, "staging table is cleared after the merge");
}

#[tokio::test]
async fn reimport_updates_existing_file() {
    let pool = test_helpers::setup_in_memory_db().await;
    let repo = SqliteLibraryRepository::new(Arc::new(pool.clone()));

    repo.add_music_files(&[test_helpers::music_file("/music/a.mp3", "Madonna", None, "Jump")])
        .await
        .expect("first import");
    repo.add_music_files(&[test_helpers::music_file("/music/a.mp3", "Madonna", None, "Hung Up")])
        .await
        .expect("second import");

    let files: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM music_files")
        .fetch_one(&pool)
        .await
        .expect("count files");
    assert_eq!(files, 1);

    let tracks = repo.find_tracks().await.expect("find tracks");
    assert_eq!(tracks, vec![Track::from_names("Madonna", "Hung Up").expect("track")]);
}

#[tokio::test]
async fn removed_files_leave_the_library() {
    let pool = test_helpers::setup_in_memory_db().await;
    let repo = SqliteLibraryRepository::new(Arc::new(pool));

    repo.add_music_files(&[
        test_helpers::music_file("/music/jump.mp3", "Madonna", None, "Jump"),
        test_helpers::music_file("/music/omega.mp3", "Bill Fay", None, "Omega"),
    ])
    .await
    .expect("add music files");

    let removed = repo
        .remove_music_files(&["/music/jump.mp3".to_string(), "/music/missing.mp3".to_string()])
        .await
        .expect("remove");
    assert_eq!(removed, 1);

    let artists = repo.find_artists().await.expect("find artists");
    assert_eq!(artists, vec![Artist::new("Bill Fay").expect("artist")]);
}

#[tokio::test]
async fn empty_import_is_a_no_op() {
    let pool = test_helpers::setup_in_memory_db().await;
    let repo = SqliteLibraryRepository::new(Arc::new(pool));

    repo.add_music_files(&[]).await.expect("empty import");
    assert_eq!(repo.remove_music_files(&[]).await.expect("empty remove"), 0);
    assert!(repo.find_artists().await.expect("find artists").is_empty());
}
