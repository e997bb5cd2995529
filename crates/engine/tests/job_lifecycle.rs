//! End-to-end lifecycle tests for the job runner and progress notifier.
//!
//! Drives real `JobStore`/`JobRunner`/`ProgressNotifier` instances with a
//! mock content generator and scripted image providers; no network calls
//! are made.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use sheetforge_core::artifact::{ArtifactRequest, ArtifactResult, Attribution};
use sheetforge_core::content::{ContentGenerator, GeneratorError};
use sheetforge_core::job::JobState;
use sheetforge_core::worksheet::{
    SectionPlan, WorksheetItem, WorksheetOutline, WorksheetRequest,
};
use sheetforge_engine::{
    ExhaustionPolicy, JobRunner, JobStore, ProgressNotifier, ProgressUpdate, RunnerConfig,
};
use sheetforge_providers::{
    FallbackResolver, ImageProvider, ProviderError, ProviderKind,
};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// How long each mocked step takes. Slower than the notifier poll interval
/// used below, so a subscriber observes every intermediate percentage.
const STEP_DELAY: Duration = Duration::from_millis(30);

/// Deterministic two-section generator: one plain section, one illustrated.
struct FixedGenerator;

#[async_trait]
impl ContentGenerator for FixedGenerator {
    async fn outline(
        &self,
        request: &WorksheetRequest,
    ) -> Result<WorksheetOutline, GeneratorError> {
        tokio::time::sleep(STEP_DELAY).await;
        Ok(WorksheetOutline {
            title: format!("{}: {}", request.subject, request.topic),
            sections: vec![
                SectionPlan {
                    heading: "Vocabulary".to_string(),
                    item_count: 1,
                    illustrate: false,
                },
                SectionPlan {
                    heading: "Label the diagram".to_string(),
                    item_count: 1,
                    illustrate: true,
                },
            ],
        })
    }

    async fn compose(
        &self,
        _request: &WorksheetRequest,
        _outline: &WorksheetOutline,
    ) -> Result<Vec<Vec<WorksheetItem>>, GeneratorError> {
        tokio::time::sleep(STEP_DELAY).await;
        Ok(vec![
            vec![WorksheetItem {
                prompt: "Define chlorophyll.".to_string(),
                answer: Some("The green pigment in leaves.".to_string()),
                illustration_query: None,
                illustration: None,
            }],
            vec![WorksheetItem {
                prompt: "Label the parts of the leaf.".to_string(),
                answer: None,
                illustration_query: Some("leaf cross section".to_string()),
                illustration: None,
            }],
        ])
    }
}

/// Generator whose compose step always fails.
struct BrokenGenerator;

#[async_trait]
impl ContentGenerator for BrokenGenerator {
    async fn outline(
        &self,
        _request: &WorksheetRequest,
    ) -> Result<WorksheetOutline, GeneratorError> {
        Ok(WorksheetOutline {
            title: "Doomed".to_string(),
            sections: vec![SectionPlan {
                heading: "Only".to_string(),
                item_count: 1,
                illustrate: false,
            }],
        })
    }

    async fn compose(
        &self,
        _request: &WorksheetRequest,
        _outline: &WorksheetOutline,
    ) -> Result<Vec<Vec<WorksheetItem>>, GeneratorError> {
        Err(GeneratorError::Unavailable("HTTP 500".to_string()))
    }
}

/// Provider returning a fixed outcome.
struct Scripted {
    name: &'static str,
    kind: ProviderKind,
    outcome: fn() -> Result<ArtifactResult, ProviderError>,
}

#[async_trait]
impl ImageProvider for Scripted {
    fn name(&self) -> &'static str {
        self.name
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn resolve(&self, _request: &ArtifactRequest) -> Result<ArtifactResult, ProviderError> {
        tokio::time::sleep(STEP_DELAY).await;
        (self.outcome)()
    }
}

fn success() -> Result<ArtifactResult, ProviderError> {
    Ok(ArtifactResult {
        url: "https://images.example/leaf.jpg".to_string(),
        attribution: Attribution {
            provider: "Search B".to_string(),
            author: Some("someone".to_string()),
            license: Some("CC0".to_string()),
            source_url: None,
        },
        resolved_by: "search-b".to_string(),
    })
}

fn provider(
    name: &'static str,
    kind: ProviderKind,
    outcome: fn() -> Result<ArtifactResult, ProviderError>,
) -> Arc<dyn ImageProvider> {
    Arc::new(Scripted {
        name,
        kind,
        outcome,
    })
}

fn request(prefer_generated: bool) -> WorksheetRequest {
    WorksheetRequest {
        subject: "Biology".to_string(),
        grade: "Grade 4".to_string(),
        topic: "Photosynthesis".to_string(),
        item_count: Some(2),
        tone: None,
        prefer_generated_images: prefer_generated,
    }
}

fn harness(
    providers: Vec<Arc<dyn ImageProvider>>,
    generator: Arc<dyn ContentGenerator>,
    policy: ExhaustionPolicy,
) -> (Arc<JobStore>, JobRunner, ProgressNotifier) {
    let store = Arc::new(JobStore::new());
    let resolver = Arc::new(FallbackResolver::new(providers, Duration::from_secs(1)));
    let runner = JobRunner::new(
        Arc::clone(&store),
        resolver,
        generator,
        RunnerConfig {
            exhaustion_policy: policy,
        },
    );
    let notifier = ProgressNotifier::with_interval(Arc::clone(&store), Duration::from_millis(5));
    (store, runner, notifier)
}

/// Drain a subscription, returning every observed percentage and the final
/// update.
async fn drain(
    notifier: &ProgressNotifier,
    job_id: &str,
) -> (Vec<u8>, Option<ProgressUpdate>) {
    let mut stream = notifier.subscribe(job_id.to_string());
    let mut percentages = Vec::new();
    let mut last = None;
    while let Some(update) = stream.recv().await {
        if let ProgressUpdate::Progress(record) = &update {
            percentages.push(record.percent);
        }
        last = Some(update);
    }
    (percentages, last)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fallback_chain_lands_on_third_provider_and_job_succeeds() {
    // Generative unavailable, first search empty, second search delivers.
    let providers = vec![
        provider("generative", ProviderKind::Generative, || {
            Err(ProviderError::Unavailable("HTTP 503".to_string()))
        }),
        provider("search-a", ProviderKind::Search, || {
            Err(ProviderError::NotFound)
        }),
        provider("search-b", ProviderKind::Search, success),
    ];
    let (store, runner, notifier) = harness(
        providers,
        Arc::new(FixedGenerator),
        ExhaustionPolicy::FailJob,
    );

    let id = runner.start(request(true)).await;
    let (percentages, last) = drain(&notifier, &id).await;

    // Observed percentages are strictly increasing step values. The 75%
    // snapshot only lasts for the assemble step, so a poller may coalesce
    // it into the terminal update; every longer-lived step is observed.
    assert!(percentages.windows(2).all(|w| w[0] < w[1]));
    assert!(percentages.iter().all(|p| [0, 25, 50, 75, 100].contains(p)));
    assert!(percentages.contains(&25));
    assert!(percentages.contains(&50));
    assert_eq!(*percentages.last().unwrap(), 100);

    let Some(ProgressUpdate::Progress(final_record)) = last else {
        panic!("expected a terminal progress record");
    };
    assert_eq!(final_record.state, JobState::Succeeded);

    // The document embeds the third provider's artifact.
    let record = store.find(&id).await.unwrap();
    let document = record.result.expect("result should be present");
    let illustrated = &document.sections[1].items[0];
    let artifact = illustrated.illustration.as_ref().expect("image attached");
    assert_eq!(artifact.resolved_by, "search-b");
}

#[tokio::test]
async fn exhausted_chain_with_fail_policy_ends_failed_at_fifty() {
    let providers = vec![
        provider("generative", ProviderKind::Generative, || {
            Err(ProviderError::Unavailable("HTTP 503".to_string()))
        }),
        provider("search-a", ProviderKind::Search, || {
            Err(ProviderError::NotFound)
        }),
        provider("search-b", ProviderKind::Search, || {
            Err(ProviderError::Unavailable("timed out".to_string()))
        }),
    ];
    let (store, runner, notifier) = harness(
        providers,
        Arc::new(FixedGenerator),
        ExhaustionPolicy::FailJob,
    );

    let id = runner.start(request(true)).await;
    let (percentages, last) = drain(&notifier, &id).await;

    let Some(ProgressUpdate::Progress(final_record)) = last else {
        panic!("expected a terminal progress record");
    };
    assert_eq!(final_record.state, JobState::Failed);
    assert_eq!(final_record.percent, 50);
    assert_eq!(*percentages.last().unwrap(), 50);
    assert!(!percentages.contains(&75));
    assert!(!percentages.contains(&100));

    let record = store.find(&id).await.unwrap();
    assert!(record.result.is_none());
    assert!(record.error.is_some());
}

#[tokio::test]
async fn exhausted_chain_with_placeholder_policy_still_succeeds() {
    let providers = vec![provider("search-a", ProviderKind::Search, || {
        Err(ProviderError::NotFound)
    })];
    let (store, runner, notifier) = harness(
        providers,
        Arc::new(FixedGenerator),
        ExhaustionPolicy::Placeholder,
    );

    let id = runner.start(request(false)).await;
    let (percentages, _) = drain(&notifier, &id).await;
    assert_eq!(*percentages.last().unwrap(), 100);

    let record = store.find(&id).await.unwrap();
    assert_eq!(record.state, JobState::Succeeded);
    let document = record.result.unwrap();
    // The illustrated item simply carries no image.
    assert!(document.sections[1].items[0].illustration.is_none());
}

#[tokio::test]
async fn generator_failure_fails_the_job_after_one_step() {
    let (store, runner, notifier) = harness(
        vec![provider("search-a", ProviderKind::Search, success)],
        Arc::new(BrokenGenerator),
        ExhaustionPolicy::Placeholder,
    );

    let id = runner.start(request(false)).await;
    let (percentages, last) = drain(&notifier, &id).await;

    let Some(ProgressUpdate::Progress(final_record)) = last else {
        panic!("expected a terminal progress record");
    };
    assert_eq!(final_record.state, JobState::Failed);
    assert_eq!(final_record.percent, 25);
    assert_eq!(*percentages.last().unwrap(), 25);

    // The stored failure is the user-facing message, not the raw upstream
    // error.
    let record = store.find(&id).await.unwrap();
    let error = record.error.unwrap();
    assert!(!error.contains("HTTP 500"), "raw upstream error leaked: {error}");
}

#[tokio::test]
async fn percentages_are_monotone_for_every_subscriber() {
    let (_, runner, notifier) = harness(
        vec![provider("search-a", ProviderKind::Search, success)],
        Arc::new(FixedGenerator),
        ExhaustionPolicy::Placeholder,
    );

    let id = runner.start(request(false)).await;

    let (a, b) = tokio::join!(drain(&notifier, &id), drain(&notifier, &id));
    for percentages in [&a.0, &b.0] {
        assert!(
            percentages.windows(2).all(|w| w[0] <= w[1]),
            "non-monotone sequence: {percentages:?}"
        );
        assert_eq!(*percentages.last().unwrap(), 100);
    }

    // Eventual agreement on the terminal record.
    assert_eq!(a.1, b.1);
}

#[tokio::test]
async fn submission_returns_before_the_job_finishes() {
    let (store, runner, _) = harness(
        vec![provider("search-a", ProviderKind::Search, success)],
        Arc::new(FixedGenerator),
        ExhaustionPolicy::Placeholder,
    );

    let id = runner.start(request(false)).await;

    // Immediately after start the job exists and is not yet terminal
    // (queued or at most mid-flight).
    let snapshot = store.get(&id).await.expect("job should exist right away");
    assert!(snapshot.percent <= 100);

    // And it eventually completes without the caller doing anything else.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if let Some(record) = store.find(&id).await {
            if record.is_terminal() {
                assert_eq!(record.state, JobState::Succeeded);
                break;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job did not reach a terminal state in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
