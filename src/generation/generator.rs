use futures_util::future::try_join_all;
use std::future::Future;
use std::pin::Pin;
use strum::IntoEnumIterator;

use crate::form::FormData;

use super::types::{NarrativeItem, NarrativeType, ResponseLetter};

pub type GenerationFuture<'a, T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'a>>;

/// Per-artifact document generation capability.
///
/// Implementations are interchangeable: template-backed, LLM-backed, or test
/// doubles. Each call produces exactly one artifact (or the full narrative
/// set) and reports failure through its `Result`; the orchestrator decides
/// what a failure means for the overall response.
pub trait DocumentGenerator: Send + Sync {
    /// Backend identifier used in logs.
    fn name(&self) -> &str;

    fn generate_narrative<'a>(
        &'a self,
        narrative_type: NarrativeType,
        form: &'a FormData,
    ) -> GenerationFuture<'a, NarrativeItem>;

    fn generate_letter<'a>(&'a self, form: &'a FormData) -> GenerationFuture<'a, ResponseLetter>;

    /// The full narrative set. Any single narrative failing fails the set.
    fn generate_narratives<'a>(
        &'a self,
        form: &'a FormData,
    ) -> GenerationFuture<'a, Vec<NarrativeItem>> {
        Box::pin(async move {
            try_join_all(NarrativeType::iter().map(|kind| self.generate_narrative(kind, form)))
                .await
        })
    }

    /// Prepare connections before the first request. No-op by default.
    fn warmup(&self) -> GenerationFuture<'_, ()> {
        Box::pin(async move { Ok(()) })
    }
}
