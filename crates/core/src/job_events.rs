//! SSE event names for job progress streaming.
//!
//! Used by the API layer when relaying progress updates to subscribers.

/// Progress update during job execution (percentage + message).
pub const EVENT_JOB_PROGRESS: &str = "job_progress";

/// Job completed successfully; terminal event.
pub const EVENT_JOB_COMPLETED: &str = "job_completed";

/// Job failed; terminal event.
pub const EVENT_JOB_FAILED: &str = "job_failed";

/// The subscribed job id is not present in the store.
pub const EVENT_UNKNOWN_JOB: &str = "unknown_job";
