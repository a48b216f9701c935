use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::config::Config;
use crate::form::{FormData, FormState, step_at, validate_form, validate_step};
use crate::generation::{
    GenerationOrchestrator, GenerationStatus, ToolSelection, create_generator,
};

use super::view::{dim, print_errors, print_step, success};

/// Run the configured generator locally and print or write the result JSON.
pub async fn generate(
    config: &Config,
    input: &Path,
    selection: ToolSelection,
    output: Option<&Path>,
) -> Result<()> {
    let raw = fs::read_to_string(input)
        .with_context(|| format!("read form data from {}", input.display()))?;
    let form: FormData = serde_json::from_str(&raw)
        .with_context(|| format!("parse form data in {}", input.display()))?;

    let state = FormState {
        data: form.clone(),
        ..FormState::new(selection)
    };
    let errors = validate_form(&state, selection);
    if !errors.is_empty() {
        print_errors(&errors);
        anyhow::bail!("form data has {} validation error(s)", errors.len());
    }

    let orchestrator = GenerationOrchestrator::new(create_generator(&config.generation)?)
        .with_artifact_timeout(Duration::from_secs(config.generation.artifact_timeout_secs));
    let result = orchestrator.generate_documents(selection, form).await;
    let json = serde_json::to_string_pretty(&result).context("serialize generation result")?;

    match output {
        Some(path) => {
            fs::write(path, &json).with_context(|| format!("write {}", path.display()))?;
            println!("  {} Result written to {}", success("✓"), path.display());
        }
        None => println!("{json}"),
    }

    if result.status == GenerationStatus::TotalFail {
        anyhow::bail!(
            "generation failed: {}",
            result.first_error_detail().unwrap_or("no detail")
        );
    }
    Ok(())
}

/// Print validation errors for a saved form state. Fails when any exist.
pub fn validate(input: &Path, step: Option<usize>) -> Result<()> {
    let raw = fs::read_to_string(input)
        .with_context(|| format!("read form state from {}", input.display()))?;
    let state: FormState = serde_json::from_str(&raw)
        .with_context(|| format!("parse form state in {}", input.display()))?;
    let tool = state.tool;

    let errors = match step {
        Some(step) => {
            let id = step_at(tool, step).with_context(|| {
                format!("step {step} is out of range for {tool} (1..={})", state.total_steps())
            })?;
            print_step(step, state.total_steps(), id.title());
            validate_step(step, &state, tool)
        }
        None => validate_form(&state, tool),
    };

    if errors.is_empty() {
        println!("  {} No validation errors", success("✓"));
        return Ok(());
    }
    print_errors(&errors);
    println!("  {}", dim(format!("{} field(s) need attention", errors.len())));
    anyhow::bail!("form state has {} validation error(s)", errors.len())
}
