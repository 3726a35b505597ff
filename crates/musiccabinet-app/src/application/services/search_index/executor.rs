use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{error, info, instrument};

use super::{ProgressSnapshot, SearchIndexUpdateService};
use crate::application::ApplicationError;

/// Runs update jobs, at most one run per job at a time.
pub struct SearchIndexUpdateExecutor {
    jobs: Vec<Arc<dyn SearchIndexUpdateService>>,
    running: Mutex<HashSet<&'static str>>,
}

/// Marks a job as running until dropped
struct RunGuard<'a> {
    running: &'a Mutex<HashSet<&'static str>>,
    name: &'static str,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut running = self
            .running
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        running.remove(self.name);
    }
}

impl SearchIndexUpdateExecutor {
    pub fn new(jobs: Vec<Arc<dyn SearchIndexUpdateService>>) -> Self {
        Self {
            jobs,
            running: Mutex::new(HashSet::new()),
        }
    }

    pub fn jobs(&self) -> &[Arc<dyn SearchIndexUpdateService>] {
        &self.jobs
    }

    fn acquire(&self, name: &'static str) -> Result<RunGuard<'_>, ApplicationError> {
        let mut running = self
            .running
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !running.insert(name) {
            return Err(ApplicationError::AlreadyRunning(name.to_string()));
        }
        Ok(RunGuard {
            running: &self.running,
            name,
        })
    }

    /// Reset the job's progress and run it once.
    #[instrument(skip(self, job), fields(job = job.name()))]
    pub async fn run(&self, job: &dyn SearchIndexUpdateService) -> Result<(), ApplicationError> {
        let _guard = self.acquire(job.name())?;

        job.progress().reset();
        info!("🔄 Updating {}", job.update_description());
        let started = Instant::now();

        match job.update_search_index().await {
            Ok(()) => {
                let snapshot = job.progress().snapshot();
                info!(
                    "✅ Updated {} ({}/{} operations) in {}ms",
                    job.update_description(),
                    snapshot.finished_operations,
                    snapshot.total_operations,
                    started.elapsed().as_millis()
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    "❌ Updating {} failed after {}ms: {}",
                    job.update_description(),
                    started.elapsed().as_millis(),
                    e.format_with_code()
                );
                Err(e)
            }
        }
    }

    pub async fn run_by_name(&self, name: &str) -> Result<(), ApplicationError> {
        let job = self
            .jobs
            .iter()
            .find(|job| job.name() == name)
            .cloned()
            .ok_or_else(|| ApplicationError::UnknownJob(name.to_string()))?;
        self.run(job.as_ref()).await
    }

    /// Run every registered job in order, stopping at the first failure.
    pub async fn run_all(&self) -> Result<(), ApplicationError> {
        for job in &self.jobs {
            self.run(job.as_ref()).await?;
        }
        Ok(())
    }

    pub fn progress_snapshots(&self) -> Vec<(&'static str, ProgressSnapshot)> {
        self.jobs
            .iter()
            .map(|job| (job.name(), job.progress().snapshot()))
            .collect()
    }
}
