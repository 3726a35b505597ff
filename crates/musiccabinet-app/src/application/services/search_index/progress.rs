use serde::Serialize;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
struct ProgressState {
    total_operations: usize,
    finished_operations: usize,
}

/// Progress counter shared between a running job and its pollers.
///
/// Both counters sit behind one lock so a snapshot never pairs a new total
/// with a stale finished count.
#[derive(Debug)]
pub struct UpdateProgress {
    description: String,
    state: Mutex<ProgressState>,
}

/// Point-in-time copy of an [`UpdateProgress`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub description: String,
    pub total_operations: usize,
    pub finished_operations: usize,
}

impl ProgressSnapshot {
    pub fn is_finished(&self) -> bool {
        self.finished_operations >= self.total_operations
    }

    /// Whole percent, 100 when there is nothing to do
    pub fn percent(&self) -> u8 {
        if self.total_operations == 0 {
            return 100;
        }
        let finished = self.finished_operations.min(self.total_operations);
        (finished * 100 / self.total_operations) as u8
    }
}

impl UpdateProgress {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            state: Mutex::new(ProgressState {
                total_operations: 0,
                finished_operations: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        // Counters stay meaningful even if a holder panicked
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn reset(&self) {
        let mut state = self.lock();
        state.total_operations = 0;
        state.finished_operations = 0;
    }

    pub fn set_total_operations(&self, total: usize) {
        self.lock().total_operations = total;
    }

    pub fn add_finished_operation(&self) {
        self.lock().finished_operations += 1;
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.lock();
        ProgressSnapshot {
            description: self.description.clone(),
            total_operations: state.total_operations,
            finished_operations: state.finished_operations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_five_of_five() {
        let progress = UpdateProgress::new("artist information");
        progress.set_total_operations(5);
        for _ in 0..5 {
            progress.add_finished_operation();
        }

        let snapshot = progress.snapshot();
        assert_eq!(snapshot.total_operations, 5);
        assert_eq!(snapshot.finished_operations, 5);
        assert!(snapshot.is_finished());
        assert_eq!(snapshot.percent(), 100);
    }

    #[test]
    fn test_reset_clears_counters() {
        let progress = UpdateProgress::new("album information");
        progress.set_total_operations(3);
        progress.add_finished_operation();
        assert_eq!(progress.snapshot().percent(), 33);

        progress.reset();
        let snapshot = progress.snapshot();
        assert_eq!(snapshot.total_operations, 0);
        assert_eq!(snapshot.finished_operations, 0);
    }

    #[test]
    fn test_concurrent_snapshots_are_consistent() {
        let progress = Arc::new(UpdateProgress::new("track relations"));
        progress.set_total_operations(1000);

        let writer = {
            let progress = progress.clone();
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    progress.add_finished_operation();
                }
            })
        };

        let mut last = 0;
        while last < 1000 {
            let snapshot = progress.snapshot();
            assert_eq!(snapshot.total_operations, 1000);
            assert!(snapshot.finished_operations >= last, "counter went backwards");
            assert!(snapshot.finished_operations <= 1000);
            last = snapshot.finished_operations;
        }

        writer.join().unwrap();
        assert_eq!(progress.snapshot().finished_operations, 1000);
    }
}
