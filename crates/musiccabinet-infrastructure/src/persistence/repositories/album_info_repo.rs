use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::entities::to_count;
use super::IMPORT_BATCH_SIZE;
use crate::persistence::{RepositoryErrorMapper, SqliteRepositoryBase};
use musiccabinet_domain::album_info::{AlbumInfo, AlbumInfoRepository};
use musiccabinet_domain::music::{Album, Artist};
use musiccabinet_domain::shared::DomainError;

#[derive(FromRow)]
struct AlbumInfoRow {
    artist_name: String,
    album_name: String,
    small_image_url: Option<String>,
    medium_image_url: Option<String>,
    large_image_url: Option<String>,
    extra_large_image_url: Option<String>,
    listeners: i64,
    play_count: i64,
}

impl AlbumInfoRow {
    fn try_into_album_info(self) -> Result<AlbumInfo, DomainError> {
        let album = Album::from_names(self.artist_name, self.album_name)?;
        Ok(AlbumInfo::new(album)
            .with_image_urls(
                self.small_image_url,
                self.medium_image_url,
                self.large_image_url,
                self.extra_large_image_url,
            )
            .with_counts(to_count(self.listeners), to_count(self.play_count)))
    }
}

#[derive(FromRow)]
struct PathAlbumInfoRow {
    path: String,
    #[sqlx(flatten)]
    info: AlbumInfoRow,
}

#[derive(FromRow)]
struct AlbumRow {
    artist_name: String,
    album_name: String,
}

const SELECT_ALBUM_INFO: &str = r#"
    SELECT
        a.artist_name_capitalization AS artist_name,
        al.album_name_capitalization AS album_name,
        ai.small_image_url,
        ai.medium_image_url,
        ai.large_image_url,
        ai.extra_large_image_url,
        ai.listeners,
        ai.play_count
    FROM album_info ai
    JOIN albums al ON al.id = ai.album_id
    JOIN artists a ON a.id = al.artist_id
"#;

const MERGE_ARTISTS: &str = r#"
    INSERT OR IGNORE INTO artists (artist_name, artist_name_capitalization)
    SELECT artist_name, MIN(artist_name_capitalization)
    FROM album_info_import
    GROUP BY artist_name
"#;

const MERGE_ALBUMS: &str = r#"
    INSERT OR IGNORE INTO albums (artist_id, album_name, album_name_capitalization)
    SELECT a.id, i.album_name, MIN(i.album_name_capitalization)
    FROM album_info_import i
    JOIN artists a ON a.artist_name = i.artist_name
    GROUP BY a.id, i.album_name
"#;

const MERGE_ALBUM_INFO: &str = r#"
    INSERT INTO album_info (
        album_id,
        small_image_url,
        medium_image_url,
        large_image_url,
        extra_large_image_url,
        listeners,
        play_count
    )
    SELECT
        al.id,
        i.small_image_url,
        i.medium_image_url,
        i.large_image_url,
        i.extra_large_image_url,
        i.listeners,
        i.play_count
    FROM album_info_import i
    JOIN artists a ON a.artist_name = i.artist_name
    JOIN albums al ON al.artist_id = a.id AND al.album_name = i.album_name
    WHERE true
    ON CONFLICT (album_id) DO UPDATE SET
        small_image_url = excluded.small_image_url,
        medium_image_url = excluded.medium_image_url,
        large_image_url = excluded.large_image_url,
        extra_large_image_url = excluded.extra_large_image_url,
        listeners = excluded.listeners,
        play_count = excluded.play_count
"#;

pub struct SqliteAlbumInfoRepository {
    base: SqliteRepositoryBase,
}

impl SqliteAlbumInfoRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

#[async_trait]
impl AlbumInfoRepository for SqliteAlbumInfoRepository {
    async fn create_album_infos(&self, album_infos: &[AlbumInfo]) -> Result<(), DomainError> {
        if album_infos.is_empty() {
            return Ok(());
        }

        let start = Instant::now();
        let mut tx = self.base.begin().await?;

        sqlx::query("DELETE FROM album_info_import")
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Clear album info import"))?;

        for batch in album_infos.chunks(IMPORT_BATCH_SIZE) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
                r#"INSERT INTO album_info_import (
                    artist_name,
                    artist_name_capitalization,
                    album_name,
                    album_name_capitalization,
                    small_image_url,
                    medium_image_url,
                    large_image_url,
                    extra_large_image_url,
                    listeners,
                    play_count
                ) "#,
            );
            builder.push_values(batch, |mut row, info| {
                let album = info.album();
                row.push_bind(album.artist().key())
                    .push_bind(album.artist().name().to_string())
                    .push_bind(album.key())
                    .push_bind(album.name().to_string())
                    .push_bind(info.small_image_url().map(str::to_string))
                    .push_bind(info.medium_image_url().map(str::to_string))
                    .push_bind(info.large_image_url().map(str::to_string))
                    .push_bind(info.extra_large_image_url().map(str::to_string))
                    .push_bind(i64::from(info.listeners()))
                    .push_bind(i64::from(info.play_count()));
            });

            builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Stage album infos"))?;
        }

        for (statement, context) in [
            (MERGE_ARTISTS, "Merge album info artists"),
            (MERGE_ALBUMS, "Merge album info albums"),
            (MERGE_ALBUM_INFO, "Merge album infos"),
            ("DELETE FROM album_info_import", "Clear album info import"),
        ] {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, context))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Commit album infos"))?;

        info!(
            album_infos = album_infos.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Album infos stored"
        );
        Ok(())
    }

    async fn find_album_info(&self, album: &Album) -> Result<Option<AlbumInfo>, DomainError> {
        let query = format!(
            "{} WHERE a.artist_name = ?1 AND al.album_name = ?2",
            SELECT_ALBUM_INFO
        );

        let row: Option<AlbumInfoRow> = self
            .base
            .fetch_optional(
                sqlx::query_as(&query)
                    .bind(album.artist().key())
                    .bind(album.key()),
                "Find album info",
            )
            .await?;

        row.map(|r| r.try_into_album_info()).transpose()
    }

    async fn find_album_infos_for_artist(
        &self,
        artist: &Artist,
    ) -> Result<Vec<AlbumInfo>, DomainError> {
        let query = format!(
            "{} WHERE a.artist_name = ?1 ORDER BY al.album_name",
            SELECT_ALBUM_INFO
        );

        let rows: Vec<AlbumInfoRow> = self
            .base
            .fetch_all(
                sqlx::query_as(&query).bind(artist.key()),
                "Find album infos for artist",
            )
            .await?;

        rows.into_iter().map(|r| r.try_into_album_info()).collect()
    }

    async fn find_album_infos_for_paths(
        &self,
        paths: &[String],
    ) -> Result<HashMap<String, AlbumInfo>, DomainError> {
        let mut album_infos = HashMap::with_capacity(paths.len());

        for batch in paths.chunks(IMPORT_BATCH_SIZE) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
                r#"SELECT
                    f.path,
                    a.artist_name_capitalization AS artist_name,
                    al.album_name_capitalization AS album_name,
                    ai.small_image_url,
                    ai.medium_image_url,
                    ai.large_image_url,
                    ai.extra_large_image_url,
                    ai.listeners,
                    ai.play_count
                FROM music_files f
                JOIN albums al ON al.id = f.album_id
                JOIN artists a ON a.id = al.artist_id
                JOIN album_info ai ON ai.album_id = al.id
                WHERE f.path IN ("#,
            );
            let mut separated = builder.separated(", ");
            for path in batch {
                separated.push_bind(path.as_str());
            }
            separated.push_unseparated(")");

            let rows: Vec<PathAlbumInfoRow> = builder
                .build_query_as()
                .fetch_all(self.base.pool())
                .await
                .map_err(|e| {
                    RepositoryErrorMapper::map_sqlx_error(e, "Find album infos for paths")
                })?;

            for row in rows {
                album_infos.insert(row.path, row.info.try_into_album_info()?);
            }
        }

        Ok(album_infos)
    }

    async fn find_albums_without_info(&self) -> Result<Vec<Album>, DomainError> {
        let query = r#"
            SELECT
                a.artist_name_capitalization AS artist_name,
                al.album_name_capitalization AS album_name
            FROM albums al
            JOIN artists a ON a.id = al.artist_id
            WHERE EXISTS (SELECT 1 FROM music_files f WHERE f.album_id = al.id)
            AND NOT EXISTS (SELECT 1 FROM album_info ai WHERE ai.album_id = al.id)
            ORDER BY a.artist_name, al.album_name
        "#;

        let rows: Vec<AlbumRow> = self
            .base
            .fetch_all(sqlx::query_as(query), "Find albums without info")
            .await?;

        rows.into_iter()
            .map(|r| Album::from_names(r.artist_name, r.album_name))
            .collect()
    }
}
