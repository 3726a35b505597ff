//! Get-or-create helpers for the shared artist and track tables.
//!
//! They run on a caller-provided connection so the ids stay valid inside the
//! caller's transaction.

use musiccabinet_domain::music::{Artist, Track};
use musiccabinet_domain::shared::DomainError;
use sqlx::SqliteConnection;

use crate::persistence::RepositoryErrorMapper;

pub(crate) async fn ensure_artist(
    conn: &mut SqliteConnection,
    artist: &Artist,
) -> Result<i64, DomainError> {
    sqlx::query(
        "INSERT OR IGNORE INTO artists (artist_name, artist_name_capitalization) VALUES (?1, ?2)",
    )
    .bind(artist.key())
    .bind(artist.name())
    .execute(&mut *conn)
    .await
    .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Insert artist"))?;

    sqlx::query_scalar("SELECT id FROM artists WHERE artist_name = ?1")
        .bind(artist.key())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Find artist id"))
}

pub(crate) async fn ensure_track(
    conn: &mut SqliteConnection,
    track: &Track,
) -> Result<i64, DomainError> {
    let artist_id = ensure_artist(conn, track.artist()).await?;

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO tracks (artist_id, track_name, track_name_capitalization)
        VALUES (?1, ?2, ?3)
        "#,
    )
    .bind(artist_id)
    .bind(track.key())
    .bind(track.name())
    .execute(&mut *conn)
    .await
    .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Insert track"))?;

    sqlx::query_scalar("SELECT id FROM tracks WHERE artist_id = ?1 AND track_name = ?2")
        .bind(artist_id)
        .bind(track.key())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Find track id"))
}

/// Counters are INTEGER columns; anything outside `u32` is clamped.
pub(crate) fn to_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
