use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use super::entities::{ensure_artist, ensure_track, to_count};
use crate::persistence::{RepositoryErrorMapper, SqliteRepositoryBase};
use musiccabinet_domain::metadata::{
    ArtistInfo, ArtistRelation, MetadataRepository, TrackRelation,
};
use musiccabinet_domain::music::{Artist, Track};
use musiccabinet_domain::shared::DomainError;

#[derive(FromRow)]
struct ArtistInfoRow {
    artist_name: String,
    image_url: Option<String>,
    listeners: i64,
    play_count: i64,
    bio_summary: Option<String>,
}

impl ArtistInfoRow {
    fn try_into_artist_info(self) -> Result<ArtistInfo, DomainError> {
        let artist = Artist::new(self.artist_name)?;
        Ok(
            ArtistInfo::new(artist, to_count(self.listeners), to_count(self.play_count))
                .with_image_url(self.image_url)
                .with_bio_summary(self.bio_summary),
        )
    }
}

#[derive(FromRow)]
struct TrackRow {
    artist_name: String,
    track_name: String,
}

#[derive(FromRow)]
struct ArtistRelationRow {
    artist_name: String,
    weight: f64,
}

impl ArtistRelationRow {
    fn try_into_relation(self) -> Result<ArtistRelation, DomainError> {
        Ok(ArtistRelation::new(
            Artist::new(self.artist_name)?,
            self.weight as f32,
        ))
    }
}

#[derive(FromRow)]
struct TrackRelationRow {
    artist_name: String,
    track_name: String,
    weight: f64,
}

impl TrackRelationRow {
    fn try_into_relation(self) -> Result<TrackRelation, DomainError> {
        Ok(TrackRelation::new(
            Track::from_names(self.artist_name, self.track_name)?,
            self.weight as f32,
        ))
    }
}

pub struct SqliteMetadataRepository {
    base: SqliteRepositoryBase,
}

impl SqliteMetadataRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

#[async_trait]
impl MetadataRepository for SqliteMetadataRepository {
    async fn save_artist_info(&self, info: &ArtistInfo) -> Result<(), DomainError> {
        let mut tx = self.base.begin().await?;
        let artist_id = ensure_artist(&mut *tx, info.artist()).await?;

        let query = r#"
            INSERT INTO artist_info (artist_id, image_url, listeners, play_count, bio_summary)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (artist_id) DO UPDATE SET
                image_url = excluded.image_url,
                listeners = excluded.listeners,
                play_count = excluded.play_count,
                bio_summary = excluded.bio_summary
        "#;

        sqlx::query(query)
            .bind(artist_id)
            .bind(info.image_url())
            .bind(i64::from(info.listeners()))
            .bind(i64::from(info.play_count()))
            .bind(info.bio_summary())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Save artist info"))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Commit artist info"))
    }

    async fn find_artist_info(&self, artist: &Artist) -> Result<Option<ArtistInfo>, DomainError> {
        let query = r#"
            SELECT
                a.artist_name_capitalization AS artist_name,
                ai.image_url,
                ai.listeners,
                ai.play_count,
                ai.bio_summary
            FROM artist_info ai
            JOIN artists a ON a.id = ai.artist_id
            WHERE a.artist_name = ?1
        "#;

        let row: Option<ArtistInfoRow> = self
            .base
            .fetch_optional(sqlx::query_as(query).bind(artist.key()), "Find artist info")
            .await?;

        row.map(|r| r.try_into_artist_info()).transpose()
    }

    async fn save_artist_top_tracks(
        &self,
        artist: &Artist,
        tracks: &[Track],
    ) -> Result<(), DomainError> {
        let mut tx = self.base.begin().await?;
        let artist_id = ensure_artist(&mut *tx, artist).await?;

        sqlx::query("DELETE FROM artist_top_tracks WHERE artist_id = ?1")
            .bind(artist_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Clear artist top tracks"))?;

        for (rank, track) in tracks.iter().enumerate() {
            let track_id = ensure_track(&mut *tx, track).await?;
            sqlx::query("INSERT INTO artist_top_tracks (artist_id, track_id, rank) VALUES (?1, ?2, ?3)")
                .bind(artist_id)
                .bind(track_id)
                .bind(rank as i64)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Save artist top track"))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Commit artist top tracks"))
    }

    async fn find_artist_top_tracks(&self, artist: &Artist) -> Result<Vec<Track>, DomainError> {
        let query = r#"
            SELECT
                ta.artist_name_capitalization AS artist_name,
                t.track_name_capitalization AS track_name
            FROM artist_top_tracks tt
            JOIN artists a ON a.id = tt.artist_id
            JOIN tracks t ON t.id = tt.track_id
            JOIN artists ta ON ta.id = t.artist_id
            WHERE a.artist_name = ?1
            ORDER BY tt.rank
        "#;

        let rows: Vec<TrackRow> = self
            .base
            .fetch_all(
                sqlx::query_as(query).bind(artist.key()),
                "Find artist top tracks",
            )
            .await?;

        rows.into_iter()
            .map(|r| Track::from_names(r.artist_name, r.track_name))
            .collect()
    }

    async fn save_artist_relations(
        &self,
        source: &Artist,
        relations: &[ArtistRelation],
    ) -> Result<(), DomainError> {
        let mut tx = self.base.begin().await?;
        let source_id = ensure_artist(&mut *tx, source).await?;

        sqlx::query("DELETE FROM artist_relations WHERE source_id = ?1")
            .bind(source_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Clear artist relations"))?;

        for relation in relations {
            let target_id = ensure_artist(&mut *tx, &relation.target).await?;
            sqlx::query(
                "INSERT OR REPLACE INTO artist_relations (source_id, target_id, weight) VALUES (?1, ?2, ?3)",
            )
            .bind(source_id)
            .bind(target_id)
            .bind(f64::from(relation.weight))
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Save artist relation"))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Commit artist relations"))
    }

    async fn find_artist_relations(
        &self,
        source: &Artist,
    ) -> Result<Vec<ArtistRelation>, DomainError> {
        let query = r#"
            SELECT
                target.artist_name_capitalization AS artist_name,
                r.weight
            FROM artist_relations r
            JOIN artists source ON source.id = r.source_id
            JOIN artists target ON target.id = r.target_id
            WHERE source.artist_name = ?1
            ORDER BY r.weight DESC, target.artist_name
        "#;

        let rows: Vec<ArtistRelationRow> = self
            .base
            .fetch_all(
                sqlx::query_as(query).bind(source.key()),
                "Find artist relations",
            )
            .await?;

        rows.into_iter().map(|r| r.try_into_relation()).collect()
    }

    async fn save_track_relations(
        &self,
        source: &Track,
        relations: &[TrackRelation],
    ) -> Result<(), DomainError> {
        let mut tx = self.base.begin().await?;
        let source_id = ensure_track(&mut *tx, source).await?;

        sqlx::query("DELETE FROM track_relations WHERE source_id = ?1")
            .bind(source_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Clear track relations"))?;

        for relation in relations {
            let target_id = ensure_track(&mut *tx, &relation.target).await?;
            sqlx::query(
                "INSERT OR REPLACE INTO track_relations (source_id, target_id, weight) VALUES (?1, ?2, ?3)",
            )
            .bind(source_id)
            .bind(target_id)
            .bind(f64::from(relation.weight))
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Save track relation"))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Commit track relations"))
    }

    async fn find_track_relations(
        &self,
        source: &Track,
    ) -> Result<Vec<TrackRelation>, DomainError> {
        let query = r#"
            SELECT
                ta.artist_name_capitalization AS artist_name,
                target.track_name_capitalization AS track_name,
                r.weight
            FROM track_relations r
            JOIN tracks source ON source.id = r.source_id
            JOIN artists sa ON sa.id = source.artist_id
            JOIN tracks target ON target.id = r.target_id
            JOIN artists ta ON ta.id = target.artist_id
            WHERE sa.artist_name = ?1 AND source.track_name = ?2
            ORDER BY r.weight DESC, ta.artist_name, target.track_name
        "#;

        let rows: Vec<TrackRelationRow> = self
            .base
            .fetch_all(
                sqlx::query_as(query)
                    .bind(source.artist().key())
                    .bind(source.key()),
                "Find track relations",
            )
            .await?;

        rows.into_iter().map(|r| r.try_into_relation()).collect()
    }
}
