use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::application::services::SearchIndexUpdateExecutor;
use crate::presentation::bootstrap::{build_lastfm_client, build_update_executor};
use crate::presentation::state::AppState;
use musiccabinet_domain::album_info::AlbumInfo;
use musiccabinet_domain::library::{LibraryRepository, MusicFile};
use musiccabinet_domain::metadata::{
    ArtistInfo, ArtistRelation, MetadataClient, TrackRelation, WebserviceError,
};
use musiccabinet_domain::music::{Album, Artist, Track};
use musiccabinet_domain::webservice::{Calltype, WebserviceHistoryRepository};

#[derive(Parser)]
#[command(name = "musiccabinet")]
#[command(about = "Keep a local music library's Last.fm metadata up to date")]
pub struct Cli {
    /// Directory holding config.json, the default database and logs
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Database file, overriding the configured path
    #[arg(long, global = true, value_name = "FILE")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch metadata for every subject that is due
    Update {
        /// Run only these jobs (see `jobs`); all jobs when omitted
        #[arg(short, long = "job", value_name = "NAME")]
        jobs: Vec<String>,

        /// Seconds between progress reports
        #[arg(long, value_name = "SECS", default_value = "10")]
        progress_interval: u64,
    },

    /// Add music files from a JSON array to the library
    Import {
        file: PathBuf,
    },

    /// List library subjects never invoked for a calltype
    Pending {
        /// e.g. artist-get-info, track-get-similar
        calltype: Calltype,
    },

    /// List the available update jobs
    Jobs,
}

/// One entry of an import file
#[derive(Debug, Deserialize)]
pub struct ImportedMusicFile {
    pub path: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

impl ImportedMusicFile {
    pub fn into_music_file(self, now: DateTime<Utc>) -> Result<MusicFile> {
        let track = Track::from_names(&self.artist, &self.title)?;
        let album = match self.album.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(Album::new(track.artist().clone(), name)?),
            _ => None,
        };
        let created_at = self.created_at.unwrap_or(now);
        let modified_at = self.modified_at.unwrap_or(created_at);
        Ok(MusicFile::new(self.path, track, album, created_at, modified_at)?)
    }
}

pub async fn run(command: Command, state: &AppState) -> Result<()> {
    match command {
        Command::Update {
            jobs,
            progress_interval,
        } => {
            let client = build_lastfm_client(&state.config)?;
            let executor = Arc::new(build_update_executor(state, client));
            run_updates(executor, &jobs, Duration::from_secs(progress_interval.max(1))).await
        }
        Command::Import { file } => import(state, file).await,
        Command::Pending { calltype } => {
            let subjects = state
                .repositories
                .history
                .find_subjects_without_invocations(calltype)
                .await?;
            for subject in &subjects {
                println!("{}", subject);
            }
            info!("{} subjects never invoked for {}", subjects.len(), calltype);
            Ok(())
        }
        Command::Jobs => {
            // Listing needs no API key
            let executor = build_update_executor(state, Arc::new(NoClient));
            for job in executor.jobs() {
                println!("{:<20} {}", job.name(), job.update_description());
            }
            Ok(())
        }
    }
}

async fn run_updates(
    executor: Arc<SearchIndexUpdateExecutor>,
    jobs: &[String],
    interval: Duration,
) -> Result<()> {
    let reporter = {
        let executor = executor.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                for (name, snapshot) in executor.progress_snapshots() {
                    if snapshot.total_operations > 0 && !snapshot.is_finished() {
                        info!(
                            "⏳ {}: {}/{} ({}%)",
                            name,
                            snapshot.finished_operations,
                            snapshot.total_operations,
                            snapshot.percent()
                        );
                    }
                }
            }
        })
    };

    let result = if jobs.is_empty() {
        executor.run_all().await
    } else {
        let mut result = Ok(());
        for name in jobs {
            result = executor.run_by_name(name).await;
            if result.is_err() {
                break;
            }
        }
        result
    };
    reporter.abort();

    result.map_err(|e| anyhow::anyhow!(e.format_with_code()))
}

async fn import(state: &AppState, file: PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read import file {:?}", file))?;
    let entries: Vec<ImportedMusicFile> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid import file {:?}", file))?;

    let now = Utc::now();
    let files = entries
        .into_iter()
        .map(|entry| entry.into_music_file(now))
        .collect::<Result<Vec<_>>>()?;

    state.repositories.library.add_music_files(&files).await?;
    info!("✅ Imported {} music files", files.len());
    Ok(())
}

/// Stand-in client for commands that never reach the webservice
struct NoClient;

fn no_client(subject: &dyn std::fmt::Display) -> WebserviceError {
    WebserviceError::Unauthorized(format!("no webservice client configured for {}", subject))
}

#[async_trait]
impl MetadataClient for NoClient {
    async fn fetch_artist_info(&self, artist: &Artist) -> Result<ArtistInfo, WebserviceError> {
        Err(no_client(artist))
    }

    async fn fetch_artist_top_tracks(&self, artist: &Artist) -> Result<Vec<Track>, WebserviceError> {
        Err(no_client(artist))
    }

    async fn fetch_artist_similar(
        &self,
        artist: &Artist,
    ) -> Result<Vec<ArtistRelation>, WebserviceError> {
        Err(no_client(artist))
    }

    async fn fetch_track_similar(&self, track: &Track) -> Result<Vec<TrackRelation>, WebserviceError> {
        Err(no_client(track))
    }

    async fn fetch_album_info(&self, album: &Album) -> Result<AlbumInfo, WebserviceError> {
        Err(no_client(album))
    }
}
