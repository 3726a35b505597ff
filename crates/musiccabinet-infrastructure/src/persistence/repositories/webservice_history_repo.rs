use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;
use tracing::{debug, info};

use crate::persistence::SqliteRepositoryBase;
use musiccabinet_domain::music::{Artist, Track};
use musiccabinet_domain::shared::DomainError;
use musiccabinet_domain::webservice::{
    Calltype, InvocationSubject, InvocationTime, SubjectScope, ThrottlePolicy,
    WebserviceHistoryRepository, WebserviceInvocation, DEFAULT_QUARANTINE_DAYS,
};

#[derive(FromRow)]
struct InvocationTimeRow {
    invocation_time: i64,
}

impl InvocationTimeRow {
    fn try_into_time(self) -> Result<InvocationTime, DomainError> {
        InvocationTime::from_millis(self.invocation_time)
    }
}

#[derive(FromRow)]
struct ArtistSubjectRow {
    artist_name: String,
}

impl ArtistSubjectRow {
    fn try_into_subject(self) -> Result<InvocationSubject, DomainError> {
        Ok(InvocationSubject::Artist(Artist::new(self.artist_name)?))
    }
}

#[derive(FromRow)]
struct TrackSubjectRow {
    artist_name: String,
    track_name: String,
}

impl TrackSubjectRow {
    fn try_into_subject(self) -> Result<InvocationSubject, DomainError> {
        Ok(InvocationSubject::Track(Track::from_names(
            self.artist_name,
            self.track_name,
        )?))
    }
}

pub struct SqliteWebserviceHistoryRepository {
    base: SqliteRepositoryBase,
    quarantine_period: Duration,
}

impl SqliteWebserviceHistoryRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
            quarantine_period: Duration::days(DEFAULT_QUARANTINE_DAYS),
        }
    }

    pub fn with_quarantine_period(mut self, quarantine_period: Duration) -> Self {
        self.quarantine_period = quarantine_period;
        self
    }

    pub fn quarantine_period(&self) -> Duration {
        self.quarantine_period
    }

    /// Store `time` as the latest invocation for the pair, whatever was there.
    pub async fn record_invocation_time(
        &self,
        invocation: &WebserviceInvocation,
        time: InvocationTime,
    ) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO webservice_history (calltype_id, subject_key, invocation_time)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (calltype_id, subject_key)
            DO UPDATE SET invocation_time = excluded.invocation_time
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(invocation.calltype().database_id())
                    .bind(invocation.subject_key())
                    .bind(time.to_millis()),
                "Record webservice invocation",
            )
            .await?;

        Ok(())
    }

    /// Throttle decision against an explicit clock
    pub async fn is_invocation_allowed_at(
        &self,
        invocation: &WebserviceInvocation,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let last = self.find_last_invocation(invocation).await?;
        Ok(ThrottlePolicy::is_invocation_allowed(
            invocation.calltype(),
            last,
            now,
        ))
    }
}

#[async_trait]
impl WebserviceHistoryRepository for SqliteWebserviceHistoryRepository {
    async fn is_invocation_allowed(
        &self,
        invocation: &WebserviceInvocation,
    ) -> Result<bool, DomainError> {
        self.is_invocation_allowed_at(invocation, Utc::now()).await
    }

    async fn find_last_invocation(
        &self,
        invocation: &WebserviceInvocation,
    ) -> Result<Option<InvocationTime>, DomainError> {
        let query = r#"
            SELECT invocation_time
            FROM webservice_history
            WHERE calltype_id = ?1 AND subject_key = ?2
        "#;

        let row: Option<InvocationTimeRow> = self
            .base
            .fetch_optional(
                sqlx::query_as(query)
                    .bind(invocation.calltype().database_id())
                    .bind(invocation.subject_key()),
                "Find last webservice invocation",
            )
            .await?;

        row.map(|r| r.try_into_time()).transpose()
    }

    async fn log_invocation(&self, invocation: &WebserviceInvocation) -> Result<(), DomainError> {
        debug!(%invocation, "Logging webservice invocation");
        self.record_invocation_time(invocation, InvocationTime::At(Utc::now()))
            .await
    }

    async fn try_claim_invocation(
        &self,
        invocation: &WebserviceInvocation,
    ) -> Result<bool, DomainError> {
        // The guard lets the upsert through only when the stored time has
        // expired; a fresh, quarantined or blocked record leaves 0 rows changed.
        let query = r#"
            INSERT INTO webservice_history (calltype_id, subject_key, invocation_time)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (calltype_id, subject_key)
            DO UPDATE SET invocation_time = excluded.invocation_time
            WHERE webservice_history.invocation_time <= ?4
        "#;

        let now = Utc::now();
        let cutoff = ThrottlePolicy::expiry_cutoff(invocation.calltype(), now);

        let result = self
            .base
            .execute(
                sqlx::query(query)
                    .bind(invocation.calltype().database_id())
                    .bind(invocation.subject_key())
                    .bind(now.timestamp_millis())
                    .bind(cutoff.timestamp_millis()),
                "Claim webservice invocation",
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn quarantine_invocation(
        &self,
        invocation: &WebserviceInvocation,
    ) -> Result<(), DomainError> {
        let until = ThrottlePolicy::quarantine_until(Utc::now(), self.quarantine_period);
        info!(%invocation, until_ms = until.to_millis(), "Quarantining webservice invocation");
        self.record_invocation_time(invocation, until).await
    }

    async fn block_invocation(
        &self,
        invocation: &WebserviceInvocation,
    ) -> Result<(), DomainError> {
        info!(%invocation, "Blocking webservice invocation");
        self.record_invocation_time(invocation, InvocationTime::Infinity)
            .await
    }

    async fn restore_invocation(
        &self,
        invocation: &WebserviceInvocation,
        previous: Option<InvocationTime>,
    ) -> Result<(), DomainError> {
        debug!(%invocation, ?previous, "Restoring webservice invocation");
        if let Some(time) = previous {
            return self.record_invocation_time(invocation, time).await;
        }

        let query = r#"
            DELETE FROM webservice_history
            WHERE calltype_id = ?1 AND subject_key = ?2
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(invocation.calltype().database_id())
                    .bind(invocation.subject_key()),
                "Restore webservice invocation",
            )
            .await?;

        Ok(())
    }

    async fn find_subjects_without_invocations(
        &self,
        calltype: Calltype,
    ) -> Result<Vec<InvocationSubject>, DomainError> {
        match calltype.scope() {
            SubjectScope::Artist => {
                let query = r#"
                    SELECT a.artist_name_capitalization AS artist_name
                    FROM artists a
                    WHERE EXISTS (
                        SELECT 1
                        FROM tracks t
                        JOIN music_files f ON f.track_id = t.id
                        WHERE t.artist_id = a.id
                    )
                    AND NOT EXISTS (
                        SELECT 1
                        FROM webservice_history h
                        WHERE h.calltype_id = ?1
                          AND h.subject_key = 'artist:' || a.artist_name
                    )
                    ORDER BY a.artist_name
                "#;

                let rows: Vec<ArtistSubjectRow> = self
                    .base
                    .fetch_all(
                        sqlx::query_as(query).bind(calltype.database_id()),
                        "Find artists without invocations",
                    )
                    .await?;

                rows.into_iter().map(|r| r.try_into_subject()).collect()
            }
            SubjectScope::Track => {
                let query = r#"
                    SELECT
                        a.artist_name_capitalization AS artist_name,
                        t.track_name_capitalization AS track_name
                    FROM tracks t
                    JOIN artists a ON a.id = t.artist_id
                    WHERE EXISTS (
                        SELECT 1 FROM music_files f WHERE f.track_id = t.id
                    )
                    AND NOT EXISTS (
                        SELECT 1
                        FROM webservice_history h
                        WHERE h.calltype_id = ?1
                          AND h.subject_key = 'track:' || a.artist_name || char(31) || t.track_name
                    )
                    ORDER BY a.artist_name, t.track_name
                "#;

                let rows: Vec<TrackSubjectRow> = self
                    .base
                    .fetch_all(
                        sqlx::query_as(query).bind(calltype.database_id()),
                        "Find tracks without invocations",
                    )
                    .await?;

                rows.into_iter().map(|r| r.try_into_subject()).collect()
            }
            // Scrobble pages are not library subjects
            SubjectScope::ScrobblePage => Ok(Vec::new()),
        }
    }
}
