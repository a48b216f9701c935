use crate::generation::ToolSelection;

use super::reducer::{PROGRAMS_SKILLS_KEY, TextField};
use super::steps::{StepId, step_at, steps_for};
use super::types::{ErrorMap, FormState};

/// Required-field check for one step. An empty map means the step may be
/// left. Steps without required fields always pass; unknown step numbers
/// produce no errors.
pub fn validate_step(step: usize, state: &FormState, tool: ToolSelection) -> ErrorMap {
    step_at(tool, step).map_or_else(ErrorMap::new, |id| validate(id, state, tool))
}

/// Union of every step's errors, checked before a request leaves the client.
pub fn validate_form(state: &FormState, tool: ToolSelection) -> ErrorMap {
    steps_for(tool)
        .iter()
        .flat_map(|&id| validate(id, state, tool))
        .collect()
}

fn validate(step: StepId, state: &FormState, tool: ToolSelection) -> ErrorMap {
    let data = &state.data;
    let mut errors = ErrorMap::new();

    match step {
        StepId::OffenseHistory => {
            for offense in &data.offenses {
                if is_blank(&offense.offense_type) {
                    errors.insert(offense.type_error_key(), "Offense type is required".into());
                }
                if is_blank(&offense.description) {
                    errors.insert(
                        offense.description_error_key(),
                        "Offense description is required".into(),
                    );
                }
            }
            require(
                &mut errors,
                TextField::ReleaseMonth,
                &data.release_month,
                "Release month is required",
            );
            require(
                &mut errors,
                TextField::ReleaseYear,
                &data.release_year,
                "Release year is required",
            );
        }
        StepId::ProgramsSkills => {
            if data.programs.is_empty() && data.skills.is_empty() {
                errors.insert(
                    PROGRAMS_SKILLS_KEY.into(),
                    "Select at least one program or skill".into(),
                );
            }
        }
        StepId::JobDetails if !tool.is_narrative_only() => {
            require(
                &mut errors,
                TextField::JobTitle,
                &data.job_title,
                "Job title is required",
            );
            require(
                &mut errors,
                TextField::EmployerName,
                &data.employer_name,
                "Employer name is required",
            );
        }
        StepId::Qualifications if data.use_resume_and_job_posting && !tool.is_narrative_only() => {
            require(
                &mut errors,
                TextField::ResumeText,
                &data.resume_text,
                "Resume text is required",
            );
            require(
                &mut errors,
                TextField::JobPostingText,
                &data.job_posting_text,
                "Job posting text is required",
            );
        }
        _ => {}
    }

    errors
}

fn require(errors: &mut ErrorMap, field: TextField, value: &str, message: &str) {
    if is_blank(value) {
        errors.insert(field.to_string(), message.to_string());
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
