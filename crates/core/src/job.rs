//! Job state model for the asynchronous generation engine.
//!
//! A [`JobRecord`] is the unit owned by the job store; a [`ProgressRecord`]
//! is the derived snapshot exchanged with progress subscribers.

use serde::{Deserialize, Serialize};

use crate::types::{JobId, Timestamp};
use crate::worksheet::WorksheetDocument;

// ---------------------------------------------------------------------------
// Step labels
// ---------------------------------------------------------------------------

/// Plan the worksheet structure via the content generator.
pub const STEP_OUTLINE: &str = "outline";
/// Compose the exercise items for each section.
pub const STEP_COMPOSE: &str = "compose";
/// Source illustrations through the provider fallback chain.
pub const STEP_ILLUSTRATE: &str = "illustrate";
/// Assemble and commit the final document.
pub const STEP_ASSEMBLE: &str = "assemble";

/// The ordered steps of a worksheet generation job.
pub const JOB_STEPS: [&str; 4] = [STEP_OUTLINE, STEP_COMPOSE, STEP_ILLUSTRATE, STEP_ASSEMBLE];

// ---------------------------------------------------------------------------
// Job lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle state of a job.
///
/// Transitions: `Queued -> Running -> Succeeded | Failed`. Terminal states
/// are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    /// Whether this state is terminal (no further updates follow).
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Progress snapshot
// ---------------------------------------------------------------------------

/// Snapshot of a job's progress fields, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Overall completion, 0-100. Monotonically non-decreasing per job.
    #[serde(rename = "percentage")]
    pub percent: u8,
    /// Human-readable status message.
    pub message: String,
    /// Current lifecycle state.
    pub state: JobState,
}

impl ProgressRecord {
    /// Whether this snapshot is terminal.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

// ---------------------------------------------------------------------------
// Stored job record
// ---------------------------------------------------------------------------

/// The full job record owned by the job store.
///
/// Mutated exclusively by the runner that owns the job; read concurrently by
/// any number of progress subscriptions.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub id: JobId,
    /// Ordered step labels for this job.
    pub steps: Vec<&'static str>,
    /// Index of the step currently executing (or about to execute).
    pub current_step: usize,
    pub state: JobState,
    /// Overall completion, 0-100.
    pub percent: u8,
    pub message: String,
    /// Assembled document; present only once terminal-success.
    pub result: Option<WorksheetDocument>,
    /// User-facing failure detail; present only once terminal-failure.
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Set when the job reaches a terminal state; drives retention.
    pub finished_at: Option<Timestamp>,
}

impl JobRecord {
    /// Create a fresh record in the `Queued` state at 0%.
    pub fn new(id: JobId) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            steps: JOB_STEPS.to_vec(),
            current_step: 0,
            state: JobState::Queued,
            percent: 0,
            message: "Queued".to_string(),
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
            finished_at: None,
        }
    }

    /// Derive the progress snapshot exchanged with subscribers.
    pub fn progress(&self) -> ProgressRecord {
        ProgressRecord {
            percent: self.percent,
            message: self.message.clone(),
            state: self.state,
        }
    }

    /// Whether the record is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
