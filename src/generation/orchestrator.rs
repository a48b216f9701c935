use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{JoinError, JoinHandle};

use crate::error::GenerationError;
use crate::form::FormData;

use super::generator::DocumentGenerator;
use super::types::{
    DocumentError, DocumentType, GenerationResult, NarrativeItem, NarrativeType, ResponseLetter,
    ToolSelection, determine_status,
};

/// Per-artifact deadline used when none is configured.
pub const DEFAULT_ARTIFACT_TIMEOUT: Duration = Duration::from_secs(90);

/// Runs the requested artifacts side by side and folds their outcomes into a
/// single [`GenerationResult`].
///
/// Each artifact runs in its own task under its own deadline, so an error, a
/// panic or a hung upstream on one path is recorded as a [`DocumentError`]
/// and the other path still completes. There is no rollback: whatever
/// succeeded is returned as-is, and the caller decides whether to retry the
/// failed subset. Dropping the returned future aborts the artifact tasks.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    generator: Arc<dyn DocumentGenerator>,
    artifact_timeout: Duration,
}

impl GenerationOrchestrator {
    pub fn new(generator: Arc<dyn DocumentGenerator>) -> Self {
        Self {
            generator,
            artifact_timeout: DEFAULT_ARTIFACT_TIMEOUT,
        }
    }

    /// Must stay below any request timeout wrapped around the orchestrator,
    /// or a slow artifact takes the finished ones down with it.
    pub fn with_artifact_timeout(mut self, artifact_timeout: Duration) -> Self {
        self.artifact_timeout = artifact_timeout;
        self
    }

    pub fn artifact_timeout(&self) -> Duration {
        self.artifact_timeout
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    pub async fn warmup(&self) {
        if let Err(error) = self.generator.warmup().await {
            tracing::warn!(generator = self.generator.name(), error = %error, "generator warmup failed");
        }
    }

    pub async fn generate_documents(
        &self,
        selection: ToolSelection,
        form: FormData,
    ) -> GenerationResult {
        let started = Instant::now();
        let form = Arc::new(form);

        let limit = self.artifact_timeout;

        let narrative_task = selection.wants_narratives().then(|| {
            let generator = Arc::clone(&self.generator);
            let form = Arc::clone(&form);
            ArtifactTask::spawn(async move {
                with_deadline(limit, generator.generate_narratives(&form)).await
            })
        });
        let letter_task = selection.wants_letter().then(|| {
            let generator = Arc::clone(&self.generator);
            let form = Arc::clone(&form);
            ArtifactTask::spawn(async move {
                with_deadline(limit, generator.generate_letter(&form)).await
            })
        });

        let mut narratives: Vec<NarrativeItem> = Vec::new();
        let mut response_letter: Option<ResponseLetter> = None;
        let mut errors: Vec<DocumentError> = Vec::new();

        if let Some(task) = narrative_task {
            match settle(DocumentType::Narrative, task.join().await) {
                Ok(items) => narratives = items,
                Err(err) => errors.push(err),
            }
        }
        if let Some(task) = letter_task {
            match settle(DocumentType::ResponseLetter, task.join().await) {
                Ok(letter) => response_letter = Some(letter),
                Err(err) => errors.push(err),
            }
        }

        let status = determine_status(selection.requested().len(), errors.len());
        tracing::info!(
            generator = self.generator.name(),
            %selection,
            %status,
            narratives = narratives.len(),
            letter = response_letter.is_some(),
            failed = errors.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "document generation finished"
        );

        GenerationResult {
            status,
            narratives,
            response_letter,
            errors,
        }
    }

    pub async fn regenerate_narrative(
        &self,
        narrative_type: NarrativeType,
        form: &FormData,
    ) -> Result<NarrativeItem, GenerationError> {
        let work = self.generator.generate_narrative(narrative_type, form);
        with_deadline(self.artifact_timeout, work)
            .await
            .map_err(|error| {
                tracing::warn!(%narrative_type, error = %error, "narrative regeneration failed");
                GenerationError::Artifact {
                    document_type: DocumentType::Narrative,
                    detail: format!("{error:#}"),
                }
            })
    }

    pub async fn regenerate_letter(
        &self,
        form: &FormData,
    ) -> Result<ResponseLetter, GenerationError> {
        let work = self.generator.generate_letter(form);
        with_deadline(self.artifact_timeout, work)
            .await
            .map_err(|error| {
                tracing::warn!(error = %error, "response letter regeneration failed");
                GenerationError::Artifact {
                    document_type: DocumentType::ResponseLetter,
                    detail: format!("{error:#}"),
                }
            })
    }
}

/// A spawned artifact that is aborted if nobody is waiting for it anymore.
struct ArtifactTask<T>(JoinHandle<T>);

impl<T: Send + 'static> ArtifactTask<T> {
    fn spawn(work: impl Future<Output = T> + Send + 'static) -> Self {
        Self(tokio::spawn(work))
    }

    async fn join(mut self) -> Result<T, JoinError> {
        (&mut self.0).await
    }
}

impl<T> Drop for ArtifactTask<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn with_deadline<T>(
    limit: Duration,
    work: impl Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    match tokio::time::timeout(limit, work).await {
        Ok(outcome) => outcome,
        Err(_) => Err(GenerationError::TimedOut.into()),
    }
}

fn settle<T>(
    document_type: DocumentType,
    joined: Result<anyhow::Result<T>, JoinError>,
) -> Result<T, DocumentError> {
    let detail = match joined {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(error)) => format!("{error:#}"),
        Err(join_error) if join_error.is_panic() => "generation task panicked".to_string(),
        Err(_) => "generation task was cancelled".to_string(),
    };
    tracing::warn!(%document_type, detail = %detail, "artifact generation failed");
    Err(DocumentError {
        document_type,
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationStatus;
    use crate::generation::test_support::ScriptedGenerator;

    fn orchestrator(generator: ScriptedGenerator) -> GenerationOrchestrator {
        GenerationOrchestrator::new(Arc::new(generator))
    }

    #[tokio::test]
    async fn both_succeed() {
        let result = orchestrator(ScriptedGenerator::default())
            .generate_documents(ToolSelection::Both, FormData::default())
            .await;
        assert_eq!(result.status, GenerationStatus::Success);
        assert_eq!(result.narratives.len(), 5);
        assert!(result.response_letter.is_some());
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn letter_failure_is_partial() {
        let generator = ScriptedGenerator {
            fail_letter: true,
            ..ScriptedGenerator::default()
        };
        let result = orchestrator(generator)
            .generate_documents(ToolSelection::Both, FormData::default())
            .await;

        assert_eq!(result.status, GenerationStatus::PartialFail);
        assert_eq!(result.narratives.len(), 5);
        assert!(result.response_letter.is_none());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].document_type, DocumentType::ResponseLetter);
        assert!(result.errors[0].detail.contains("letter backend down"));
    }

    #[tokio::test]
    async fn narrative_failure_is_partial() {
        let generator = ScriptedGenerator {
            fail_narratives: true,
            ..ScriptedGenerator::default()
        };
        let result = orchestrator(generator)
            .generate_documents(ToolSelection::Both, FormData::default())
            .await;

        assert_eq!(result.status, GenerationStatus::PartialFail);
        assert!(result.narratives.is_empty());
        assert!(result.response_letter.is_some());
        assert_eq!(result.failed_types(), vec![DocumentType::Narrative]);
    }

    #[tokio::test]
    async fn both_fail_is_total() {
        let generator = ScriptedGenerator {
            fail_narratives: true,
            fail_letter: true,
            ..ScriptedGenerator::default()
        };
        let result = orchestrator(generator)
            .generate_documents(ToolSelection::Both, FormData::default())
            .await;

        assert_eq!(result.status, GenerationStatus::TotalFail);
        assert_eq!(result.errors.len(), 2);
    }

    #[tokio::test]
    async fn single_requested_failure_is_total_and_letter_untouched() {
        let generator = ScriptedGenerator {
            fail_narratives: true,
            ..ScriptedGenerator::default()
        };
        let letter_calls = generator.letter_calls.clone();
        let result = orchestrator(generator)
            .generate_documents(ToolSelection::Narrative, FormData::default())
            .await;

        assert_eq!(result.status, GenerationStatus::TotalFail);
        assert!(result.response_letter.is_none());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            letter_calls.load(std::sync::atomic::Ordering::SeqCst),
            0,
            "letter must not be generated when not requested"
        );
    }

    #[tokio::test]
    async fn panic_in_one_path_does_not_abort_the_other() {
        let generator = ScriptedGenerator {
            panic_letter: true,
            ..ScriptedGenerator::default()
        };
        let result = orchestrator(generator)
            .generate_documents(ToolSelection::Both, FormData::default())
            .await;

        assert_eq!(result.status, GenerationStatus::PartialFail);
        assert_eq!(result.narratives.len(), 5);
        assert_eq!(result.errors[0].detail, "generation task panicked");
    }

    #[tokio::test]
    async fn hung_narratives_time_out_and_letter_survives() {
        let generator = ScriptedGenerator {
            narrative_delay: Some(Duration::from_secs(30)),
            ..ScriptedGenerator::default()
        };
        let abandoned = generator.narrative_abandoned.clone();
        let result = orchestrator(generator)
            .with_artifact_timeout(Duration::from_millis(100))
            .generate_documents(ToolSelection::Both, FormData::default())
            .await;

        assert_eq!(result.status, GenerationStatus::PartialFail);
        assert!(result.narratives.is_empty());
        assert!(result.response_letter.is_some());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].document_type, DocumentType::Narrative);
        assert_eq!(result.errors[0].detail, "generation timed out");
        assert!(abandoned.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn dropping_the_request_aborts_artifact_tasks() {
        let generator = ScriptedGenerator {
            narrative_delay: Some(Duration::from_secs(30)),
            ..ScriptedGenerator::default()
        };
        let abandoned = generator.narrative_abandoned.clone();
        let orchestrator = orchestrator(generator);

        let outcome = tokio::time::timeout(
            Duration::from_millis(50),
            orchestrator.generate_documents(ToolSelection::Narrative, FormData::default()),
        )
        .await;
        assert!(outcome.is_err(), "caller gave up first");

        for _ in 0..50 {
            if abandoned.load(std::sync::atomic::Ordering::SeqCst) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("narrative task kept running after the caller went away");
    }

    #[tokio::test]
    async fn slow_regeneration_reports_timeout() {
        let generator = ScriptedGenerator {
            narrative_delay: Some(Duration::from_secs(30)),
            ..ScriptedGenerator::default()
        };
        let err = orchestrator(generator)
            .with_artifact_timeout(Duration::from_millis(50))
            .regenerate_narrative(NarrativeType::JobReadiness, &FormData::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "narrative generation failed: generation timed out"
        );
    }

    #[tokio::test]
    async fn letter_only_success() {
        let result = orchestrator(ScriptedGenerator::default())
            .generate_documents(ToolSelection::ResponseLetter, FormData::default())
            .await;
        assert_eq!(result.status, GenerationStatus::Success);
        assert!(result.narratives.is_empty());
        assert!(result.response_letter.is_some());
    }

    #[tokio::test]
    async fn regenerate_narrative_returns_requested_type() {
        let item = orchestrator(ScriptedGenerator::default())
            .regenerate_narrative(NarrativeType::FutureGoals, &FormData::default())
            .await
            .unwrap();
        assert_eq!(item.narrative_type, NarrativeType::FutureGoals);
    }

    #[tokio::test]
    async fn regenerate_letter_maps_failure_to_artifact_error() {
        let generator = ScriptedGenerator {
            fail_letter: true,
            ..ScriptedGenerator::default()
        };
        let err = orchestrator(generator)
            .regenerate_letter(&FormData::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Artifact {
                document_type: DocumentType::ResponseLetter,
                ..
            }
        ));
    }
}
