//! Job runner: executes the ordered steps of a worksheet generation job.
//!
//! `start` returns a job id immediately; execution proceeds on a detached
//! task, writing progress into the [`JobStore`] after each step. The runner
//! is the sole writer for the jobs it owns.

use std::sync::Arc;

use sheetforge_core::artifact::ArtifactRequest;
use sheetforge_core::content::{ContentGenerator, GeneratorError};
use sheetforge_core::job::{JOB_STEPS, STEP_COMPOSE, STEP_OUTLINE};
use sheetforge_core::types::JobId;
use sheetforge_core::worksheet::{
    WorksheetDocument, WorksheetItem, WorksheetOutline, WorksheetRequest, WorksheetSection,
};
use sheetforge_providers::{FallbackResolver, ResolverError};

use crate::store::JobStore;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when the provider chain is exhausted for an illustration.
///
/// One policy applies uniformly to every illustration of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustionPolicy {
    /// Terminate the job as failed.
    FailJob,
    /// Continue without an image for the affected item.
    Placeholder,
}

impl ExhaustionPolicy {
    /// Read the policy from `ILLUSTRATION_EXHAUSTION_POLICY`
    /// (`fail` | `placeholder`, default `placeholder`).
    pub fn from_env() -> Self {
        match std::env::var("ILLUSTRATION_EXHAUSTION_POLICY").ok().as_deref() {
            Some("fail") => ExhaustionPolicy::FailJob,
            _ => ExhaustionPolicy::Placeholder,
        }
    }
}

/// Runner configuration.
#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    pub exhaustion_policy: ExhaustionPolicy,
}

impl RunnerConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        Self {
            exhaustion_policy: ExhaustionPolicy::from_env(),
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            exhaustion_policy: ExhaustionPolicy::Placeholder,
        }
    }
}

// ---------------------------------------------------------------------------
// Step failures
// ---------------------------------------------------------------------------

/// Unrecoverable error inside one job step.
#[derive(Debug, thiserror::Error)]
enum StepFailure {
    #[error("{step} step failed: {source}")]
    Generator {
        step: &'static str,
        source: GeneratorError,
    },

    #[error("illustration providers exhausted for '{query}'")]
    IllustrationExhausted { query: String },
}

impl StepFailure {
    /// User-facing failure message. Never includes credentials or raw
    /// upstream error bodies.
    fn user_message(&self) -> String {
        match self {
            StepFailure::Generator {
                source: GeneratorError::Unconfigured,
                ..
            } => "Content generation is not configured".to_string(),
            StepFailure::Generator { step, .. } if *step == STEP_OUTLINE => {
                "The content service failed while planning the worksheet".to_string()
            }
            StepFailure::Generator { .. } => {
                "The content service failed while composing exercises".to_string()
            }
            StepFailure::IllustrationExhausted { query } => {
                format!("Could not source an illustration for '{query}'")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Executes worksheet generation jobs.
pub struct JobRunner {
    store: Arc<JobStore>,
    resolver: Arc<FallbackResolver>,
    generator: Arc<dyn ContentGenerator>,
    config: RunnerConfig,
}

impl JobRunner {
    pub fn new(
        store: Arc<JobStore>,
        resolver: Arc<FallbackResolver>,
        generator: Arc<dyn ContentGenerator>,
        config: RunnerConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            generator,
            config,
        }
    }

    /// Create a job for the request and start executing it detached from
    /// the caller. Returns the job id immediately.
    pub async fn start(&self, request: WorksheetRequest) -> JobId {
        let id = self.store.create().await;

        let store = Arc::clone(&self.store);
        let resolver = Arc::clone(&self.resolver);
        let generator = Arc::clone(&self.generator);
        let config = self.config;
        let job_id = id.clone();

        tokio::spawn(async move {
            run_job(store, resolver, generator, config, job_id, request).await;
        });

        id
    }
}

/// Execute one job to its terminal state, isolating failures from the rest
/// of the process.
async fn run_job(
    store: Arc<JobStore>,
    resolver: Arc<FallbackResolver>,
    generator: Arc<dyn ContentGenerator>,
    config: RunnerConfig,
    id: JobId,
    request: WorksheetRequest,
) {
    tracing::info!(
        job_id = %id,
        subject = %request.subject,
        topic = %request.topic,
        "Worksheet job started",
    );

    match execute(&store, &resolver, generator.as_ref(), config, &id, &request).await {
        Ok(document) => {
            store.complete(&id, document).await;
            tracing::info!(job_id = %id, "Worksheet job completed");
        }
        Err(failure) => {
            tracing::error!(job_id = %id, error = %failure, "Worksheet job failed");
            store.fail(&id, failure.user_message()).await;
        }
    }
}

/// Round a completed-step count into an overall percentage.
fn step_percent(completed: usize, total: usize) -> u8 {
    ((completed as f64 / total as f64) * 100.0).round() as u8
}

/// Run the four steps sequentially, writing progress after each one.
async fn execute(
    store: &JobStore,
    resolver: &FallbackResolver,
    generator: &dyn ContentGenerator,
    config: RunnerConfig,
    id: &JobId,
    request: &WorksheetRequest,
) -> Result<WorksheetDocument, StepFailure> {
    let total = JOB_STEPS.len();

    store
        .update_progress(id, 0, 0, "Planning worksheet outline")
        .await;
    let outline = generator
        .outline(request)
        .await
        .map_err(|source| StepFailure::Generator {
            step: STEP_OUTLINE,
            source,
        })?;
    store
        .update_progress(id, 1, step_percent(1, total), "Outline ready")
        .await;

    let mut sections = generator
        .compose(request, &outline)
        .await
        .map_err(|source| StepFailure::Generator {
            step: STEP_COMPOSE,
            source,
        })?;
    store
        .update_progress(id, 2, step_percent(2, total), "Exercises composed")
        .await;

    illustrate(
        resolver,
        config.exhaustion_policy,
        request.prefer_generated_images,
        &mut sections,
    )
    .await?;
    store
        .update_progress(id, 3, step_percent(3, total), "Illustrations sourced")
        .await;

    Ok(assemble(request, outline, sections))
}

/// Resolve every illustration query in the composed sections.
///
/// Independent requests within the step run concurrently; the step commits
/// only after all of them have settled. Exhaustion is handled per the
/// configured policy.
async fn illustrate(
    resolver: &FallbackResolver,
    policy: ExhaustionPolicy,
    prefer_generative: bool,
    sections: &mut [Vec<WorksheetItem>],
) -> Result<(), StepFailure> {
    let mut targets = Vec::new();
    for (section_idx, items) in sections.iter().enumerate() {
        for (item_idx, item) in items.iter().enumerate() {
            if let Some(query) = &item.illustration_query {
                targets.push((section_idx, item_idx, query.clone()));
            }
        }
    }

    let calls = targets.iter().map(|(_, _, query)| {
        let request = ArtifactRequest::illustration(query.clone(), prefer_generative);
        async move { resolver.resolve(&request).await }
    });
    let results = futures::future::join_all(calls).await;

    for ((section_idx, item_idx, query), result) in targets.into_iter().zip(results) {
        match result {
            Ok(artifact) => {
                sections[section_idx][item_idx].illustration = Some(artifact);
            }
            Err(ResolverError::Exhausted { attempts, .. }) => {
                tracing::warn!(
                    query = %query,
                    attempted = attempts.len(),
                    "Illustration providers exhausted",
                );
                if policy == ExhaustionPolicy::FailJob {
                    return Err(StepFailure::IllustrationExhausted { query });
                }
            }
        }
    }

    Ok(())
}

/// Fold the outline and composed items into the final document.
fn assemble(
    request: &WorksheetRequest,
    outline: WorksheetOutline,
    sections: Vec<Vec<WorksheetItem>>,
) -> WorksheetDocument {
    let sections = outline
        .sections
        .into_iter()
        .zip(sections)
        .map(|(plan, items)| WorksheetSection {
            heading: plan.heading,
            items,
        })
        .collect();

    WorksheetDocument {
        title: outline.title,
        subject: request.subject.clone(),
        grade: request.grade.clone(),
        topic: request.topic.clone(),
        sections,
        generated_at: chrono::Utc::now(),
    }
}
