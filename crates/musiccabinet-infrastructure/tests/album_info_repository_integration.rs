use std::sync::Arc;

use musiccabinet_domain::album_info::{AlbumInfo, AlbumInfoRepository};
use musiccabinet_domain::music::{Album, Artist};
use musiccabinet_infrastructure::persistence::repositories::SqliteAlbumInfoRepository;

mod test_helpers;

fn album_info(artist: &str, album: &str, listeners: u32) -> AlbumInfo {
    let album = Album::from_names(artist, album).expect("valid album");
    AlbumInfo::new(album)
        .with_image_urls(
            Some(format!("http://img/{}/s.png", listeners)),
            Some(format!("http://img/{}/m.png", listeners)),
            Some(format!("http://img/{}/l.png", listeners)),
            Some(format!("http://img/{}/xl.png", listeners)),
        )
        .with_counts(listeners, listeners * 10)
}

#[tokio::test]
async fn empty_album_info_list_is_a_no_op() {
    let pool = test_helpers::setup_in_memory_db().await;
    let repo = SqliteAlbumInfoRepository::new(Arc::new(pool.clone()));

    repo.create_album_infos(&[]).await.expect("empty create");

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM album_info")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn album_info_round_trip_and_replace() {
    let pool = test_helpers::setup_in_memory_db().await;
    let repo = SqliteAlbumInfoRepository::new(Arc::new(pool));

    let album = Album::from_names("Bill Fay", "Life Is People").expect("album");
    assert_eq!(repo.find_album_info(&album).await.expect("find"), None);

    repo.create_album_infos(&[album_info("Bill Fay", "Life Is People", 100)])
        .await
        .expect("create");

    let stored = repo
        .find_album_info(&Album::from_names("BILL FAY", "life is people").expect("album"))
        .await
        .expect("find")
        .expect("stored");
    assert_eq!(stored.album().name(), "Life Is People");
    assert_eq!(stored.listeners(), 100);
    assert_eq!(stored.extra_large_image_url(), Some("http://img/100/xl.png"));

    repo.create_album_infos(&[album_info("Bill Fay", "Life Is People", 250)])
        .await
        .expect("update");

    let stored = repo
        .find_album_info(&album)
        .await
        .expect("find")
        .expect("stored");
    assert_eq!(stored.listeners(), 250);
    assert_eq!(stored.play_count(), 2500);
}

#[tokio::test]
async fn album_infos_for_artist() {
    let pool = test_helpers::setup_in_memory_db().await;
    let repo = SqliteAlbumInfoRepository::new(Arc::new(pool));

    repo.create_album_infos(&[
        album_info("Bill Fay", "Time of the Last Persecution", 1),
        album_info("Bill Fay", "Bill Fay", 2),
        album_info("Espers", "The Weed Tree", 3),
    ])
    .await
    .expect("create");

    let infos = repo
        .find_album_infos_for_artist(&Artist::new("bill fay").expect("artist"))
        .await
        .expect("find");
    let names: Vec<_> = infos.iter().map(|info| info.album().name()).collect();
    assert_eq!(names, vec!["Bill Fay", "Time of the Last Persecution"]);
}

#[tokio::test]
async fn album_infos_for_paths_and_missing_albums() {
    let pool = test_helpers::setup_in_memory_db().await;
    let repo = SqliteAlbumInfoRepository::new(Arc::new(pool.clone()));

    test_helpers::add_to_library(
        &pool,
        &[
            test_helpers::music_file("/music/a/1.mp3", "Espers", Some("The Weed Tree"), "Rosemary Lane"),
            test_helpers::music_file("/music/a/2.mp3", "Espers", Some("The Weed Tree"), "Black Is the Color"),
            test_helpers::music_file("/music/b/1.mp3", "Bill Fay", Some("Life Is People"), "Never Ending Happening"),
            test_helpers::music_file("/music/c/1.mp3", "Madonna", None, "Jump"),
        ],
    )
    .await;

    let missing = repo.find_albums_without_info().await.expect("missing");
    assert_eq!(missing.len(), 2);

    repo.create_album_infos(&[album_info("ESPERS", "the weed tree", 7)])
        .await
        .expect("create");

    let missing = repo.find_albums_without_info().await.expect("missing");
    assert_eq!(
        missing,
        vec![Album::from_names("Bill Fay", "Life Is People").expect("album")]
    );

    let paths = vec![
        "/music/a/1.mp3".to_string(),
        "/music/a/2.mp3".to_string(),
        "/music/b/1.mp3".to_string(),
        "/music/c/1.mp3".to_string(),
    ];
    let by_path = repo.find_album_infos_for_paths(&paths).await.expect("by path");
    assert_eq!(by_path.len(), 2);
    assert_eq!(by_path["/music/a/2.mp3"].listeners(), 7);
    // Library spelling is kept, not the import's
    assert_eq!(by_path["/music/a/1.mp3"].album().name(), "The Weed Tree");
    assert!(!by_path.contains_key("/music/b/1.mp3"));

    assert!(repo.find_album_infos_for_paths(&[]).await.expect("empty").is_empty());
}

#[tokio::test]
async fn large_imports_span_several_batches() {
    let pool = test_helpers::setup_in_memory_db().await;
    let repo = SqliteAlbumInfoRepository::new(Arc::new(pool.clone()));

    let infos: Vec<_> = (0..2500)
        .map(|i| album_info("Various Artists", &format!("Compilation {}", i), i))
        .collect();
    repo.create_album_infos(&infos).await.expect("create");

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM album_info")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(rows, 2500);

    let staged: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM album_info_import")
        .fetch_one(&pool)
        .await
        .expect("count staging rows");
    assert_eq!(staged, 0);
}
