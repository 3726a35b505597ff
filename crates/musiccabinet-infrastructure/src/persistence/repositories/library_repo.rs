use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::IMPORT_BATCH_SIZE;
use crate::persistence::{RepositoryErrorMapper, SqliteRepositoryBase};
use musiccabinet_domain::library::{LibraryRepository, MusicFile};
use musiccabinet_domain::music::{Artist, Track};
use musiccabinet_domain::shared::DomainError;

#[derive(FromRow)]
struct ArtistRow {
    artist_name: String,
}

impl ArtistRow {
    fn try_into_artist(self) -> Result<Artist, DomainError> {
        Artist::new(self.artist_name)
    }
}

#[derive(FromRow)]
struct TrackRow {
    artist_name: String,
    track_name: String,
}

impl TrackRow {
    fn try_into_track(self) -> Result<Track, DomainError> {
        Track::from_names(self.artist_name, self.track_name)
    }
}

const MERGE_ARTISTS: &str = r#"
    INSERT OR IGNORE INTO artists (artist_name, artist_name_capitalization)
    SELECT artist_name, MIN(artist_name_capitalization)
    FROM music_file_import
    GROUP BY artist_name
"#;

const MERGE_ALBUMS: &str = r#"
    INSERT OR IGNORE INTO albums (artist_id, album_name, album_name_capitalization)
    SELECT a.id, i.album_name, MIN(i.album_name_capitalization)
    FROM music_file_import i
    JOIN artists a ON a.artist_name = i.artist_name
    WHERE i.album_name IS NOT NULL
    GROUP BY a.id, i.album_name
"#;

const MERGE_TRACKS: &str = r#"
    INSERT OR IGNORE INTO tracks (artist_id, track_name, track_name_capitalization)
    SELECT a.id, i.track_name, MIN(i.track_name_capitalization)
    FROM music_file_import i
    JOIN artists a ON a.artist_name = i.artist_name
    GROUP BY a.id, i.track_name
"#;

const MERGE_FILES: &str = r#"
    INSERT INTO music_files (path, track_id, album_id, created_at, modified_at)
    SELECT i.path, t.id, al.id, i.created_at, i.modified_at
    FROM music_file_import i
    JOIN artists a ON a.artist_name = i.artist_name
    JOIN tracks t ON t.artist_id = a.id AND t.track_name = i.track_name
    LEFT JOIN albums al ON al.artist_id = a.id AND al.album_name = i.album_name
    WHERE true
    ON CONFLICT (path) DO UPDATE SET
        track_id = excluded.track_id,
        album_id = excluded.album_id,
        modified_at = excluded.modified_at
"#;

pub struct SqliteLibraryRepository {
    base: SqliteRepositoryBase,
}

impl SqliteLibraryRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

#[async_trait]
impl LibraryRepository for SqliteLibraryRepository {
    async fn add_music_files(&self, files: &[MusicFile]) -> Result<(), DomainError> {
        if files.is_empty() {
            return Ok(());
        }

        let start = Instant::now();
        let mut tx = self.base.begin().await?;

        sqlx::query("DELETE FROM music_file_import")
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Clear music file import"))?;

        for batch in files.chunks(IMPORT_BATCH_SIZE) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
                r#"INSERT INTO music_file_import (
                    path,
                    artist_name,
                    artist_name_capitalization,
                    album_name,
                    album_name_capitalization,
                    track_name,
                    track_name_capitalization,
                    created_at,
                    modified_at
                ) "#,
            );
            builder.push_values(batch, |mut row, file| {
                let track = file.track();
                row.push_bind(file.path().to_string())
                    .push_bind(track.artist().key())
                    .push_bind(track.artist().name().to_string())
                    .push_bind(file.album().map(|album| album.key()))
                    .push_bind(file.album().map(|album| album.name().to_string()))
                    .push_bind(track.key())
                    .push_bind(track.name().to_string())
                    .push_bind(file.created_at().timestamp_millis())
                    .push_bind(file.modified_at().timestamp_millis());
            });

            builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Stage music files"))?;
        }

        for (statement, context) in [
            (MERGE_ARTISTS, "Merge imported artists"),
            (MERGE_ALBUMS, "Merge imported albums"),
            (MERGE_TRACKS, "Merge imported tracks"),
            (MERGE_FILES, "Merge imported music files"),
            ("DELETE FROM music_file_import", "Clear music file import"),
        ] {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, context))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Commit music file import"))?;

        info!(
            files = files.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Music files imported"
        );
        Ok(())
    }

    async fn remove_music_files(&self, paths: &[String]) -> Result<u64, DomainError> {
        if paths.is_empty() {
            return Ok(0);
        }

        let mut tx = self.base.begin().await?;
        let mut removed = 0;

        for batch in paths.chunks(IMPORT_BATCH_SIZE) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("DELETE FROM music_files WHERE path IN (");
            let mut separated = builder.separated(", ");
            for path in batch {
                separated.push_bind(path.as_str());
            }
            separated.push_unseparated(")");

            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Remove music files"))?;
            removed += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Commit music file removal"))?;

        Ok(removed)
    }

    async fn find_artists(&self) -> Result<Vec<Artist>, DomainError> {
        let query = r#"
            SELECT a.artist_name_capitalization AS artist_name
            FROM artists a
            WHERE EXISTS (
                SELECT 1
                FROM tracks t
                JOIN music_files f ON f.track_id = t.id
                WHERE t.artist_id = a.id
            )
            ORDER BY a.artist_name
        "#;

        let rows: Vec<ArtistRow> = self
            .base
            .fetch_all(sqlx::query_as(query), "Find library artists")
            .await?;

        rows.into_iter().map(|r| r.try_into_artist()).collect()
    }

    async fn find_tracks(&self) -> Result<Vec<Track>, DomainError> {
        let query = r#"
            SELECT
                a.artist_name_capitalization AS artist_name,
                t.track_name_capitalization AS track_name
            FROM tracks t
            JOIN artists a ON a.id = t.artist_id
            WHERE EXISTS (SELECT 1 FROM music_files f WHERE f.track_id = t.id)
            ORDER BY a.artist_name, t.track_name
        "#;

        let rows: Vec<TrackRow> = self
            .base
            .fetch_all(sqlx::query_as(query), "Find library tracks")
            .await?;

        rows.into_iter().map(|r| r.try_into_track()).collect()
    }
}
