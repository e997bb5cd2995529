//! Process-wide job table.
//!
//! Single source of truth for job progress, keyed by job id. Thread-safe
//! via an interior `RwLock`; designed to be wrapped in `Arc` and shared
//! between the runner, progress subscriptions, and the HTTP layer. Progress
//! writes against a terminal record are silent no-ops so the runner's
//! completion path stays idempotent.

use std::collections::HashMap;

use tokio::sync::RwLock;

use sheetforge_core::job::{JobRecord, JobState, ProgressRecord};
use sheetforge_core::types::{new_job_id, JobId, Timestamp};
use sheetforge_core::worksheet::WorksheetDocument;

/// In-process table of job state.
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, JobRecord>>,
}

impl JobStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Create a fresh job in the `Queued` state and return its id.
    pub async fn create(&self) -> JobId {
        let id = new_job_id();
        let record = JobRecord::new(id.clone());
        self.jobs.write().await.insert(id.clone(), record);
        id
    }

    /// Progress snapshot for a job, or `None` for unknown/expired ids.
    pub async fn get(&self, id: &str) -> Option<ProgressRecord> {
        self.jobs.read().await.get(id).map(JobRecord::progress)
    }

    /// Full record for a job, or `None` for unknown/expired ids.
    pub async fn find(&self, id: &str) -> Option<JobRecord> {
        self.jobs.read().await.get(id).cloned()
    }

    /// Record step progress for a running job.
    ///
    /// Marks the job `Running`, clamps the percentage so it never
    /// decreases, and ignores writes after a terminal state. Returns
    /// whether a record was updated.
    pub async fn update_progress(
        &self,
        id: &str,
        current_step: usize,
        percent: u8,
        message: impl Into<String>,
    ) -> bool {
        let mut jobs = self.jobs.write().await;
        let Some(record) = jobs.get_mut(id) else {
            return false;
        };
        if record.is_terminal() {
            return false;
        }

        record.state = JobState::Running;
        record.current_step = current_step;
        record.percent = record.percent.max(percent);
        record.message = message.into();
        record.updated_at = chrono::Utc::now();
        true
    }

    /// Commit a finished document, moving the job to `Succeeded` at 100%.
    ///
    /// A no-op once the record is terminal. Returns whether the terminal
    /// transition happened.
    pub async fn complete(&self, id: &str, document: WorksheetDocument) -> bool {
        let mut jobs = self.jobs.write().await;
        let Some(record) = jobs.get_mut(id) else {
            return false;
        };
        if record.is_terminal() {
            return false;
        }

        let now = chrono::Utc::now();
        record.state = JobState::Succeeded;
        record.percent = 100;
        record.message = "Worksheet ready".to_string();
        record.result = Some(document);
        record.updated_at = now;
        record.finished_at = Some(now);
        true
    }

    /// Record a terminal failure with a user-facing message.
    ///
    /// The percentage stays at whatever value the job last reached, so
    /// subscribers can distinguish failed-partway from completed. A no-op
    /// once the record is terminal.
    pub async fn fail(&self, id: &str, message: impl Into<String>) -> bool {
        let mut jobs = self.jobs.write().await;
        let Some(record) = jobs.get_mut(id) else {
            return false;
        };
        if record.is_terminal() {
            return false;
        }

        let now = chrono::Utc::now();
        let message = message.into();
        record.state = JobState::Failed;
        record.error = Some(message.clone());
        record.message = message;
        record.updated_at = now;
        record.finished_at = Some(now);
        true
    }

    /// Remove a job outright. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        self.jobs.write().await.remove(id).is_some()
    }

    /// Evict terminal jobs whose `finished_at` predates the cutoff.
    ///
    /// Returns the number of evicted records. Running jobs are never
    /// touched regardless of age.
    pub async fn purge_terminal_older_than(&self, cutoff: Timestamp) -> usize {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, record| match record.finished_at {
            Some(finished) => finished >= cutoff,
            None => true,
        });
        before - jobs.len()
    }

    /// Current number of stored jobs.
    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}
