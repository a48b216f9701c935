//! Document generation: wire types, the pluggable generator capability, the
//! partial-failure-tolerant orchestrator, and the bundled generator backends.

mod generator;
mod llm;
mod orchestrator;
mod template;
mod types;

pub use generator::{DocumentGenerator, GenerationFuture};
pub use llm::LlmGenerator;
pub use orchestrator::{DEFAULT_ARTIFACT_TIMEOUT, GenerationOrchestrator};
pub use template::TemplateGenerator;
pub use types::{
    DocumentError, DocumentType, GenerateRequest, GenerationResult, GenerationStatus,
    NarrativeItem, NarrativeType, RegenerateLetterRequest, RegenerateLetterResponse,
    RegenerateNarrativeRequest, RegenerateNarrativeResponse, ResponseLetter, ToolSelection,
    determine_status,
};

use anyhow::Context;
use std::sync::Arc;

use crate::config::{GenerationBackend, GenerationConfig};
use crate::providers::OpenAiCompatibleProvider;

/// Build the generator selected in config.
pub fn create_generator(config: &GenerationConfig) -> anyhow::Result<Arc<dyn DocumentGenerator>> {
    match config.backend {
        GenerationBackend::Template => Ok(Arc::new(
            TemplateGenerator::new().context("create template generator")?,
        )),
        GenerationBackend::Llm => {
            let provider = OpenAiCompatibleProvider::new(
                &config.provider,
                &config.base_url,
                config.api_key.as_deref(),
            );
            let generator =
                LlmGenerator::new(Arc::new(provider), &config.model, config.temperature)
                    .context("create LLM generator")?;
            Ok(Arc::new(generator))
        }
    }
}
