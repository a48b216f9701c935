use super::types::{ErrorMap, FormData, FormState, Offense};

/// Free-text fields addressable by [`FormAction::SetText`].
///
/// The `Display` form is the field's error-map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub enum TextField {
    ReleaseMonth,
    ReleaseYear,
    AdditionalContext,
    JobTitle,
    EmployerName,
    Ownership,
    Impact,
    LessonsLearned,
    ClarifyingRelevance,
    Qualifications,
    ResumeText,
    JobPostingText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub enum FlagField {
    ClarifyingRelevanceEnabled,
    UseResumeAndJobPosting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffenseField {
    Type,
    Description,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    SetText { field: TextField, value: String },
    SetFlag { field: FlagField, value: bool },
    AddOffense(Offense),
    RemoveOffense { id: String },
    UpdateOffense {
        id: String,
        field: OffenseField,
        value: String,
    },
    SetOffensePrograms { id: String, programs: Vec<String> },
    AddProgram(String),
    RemoveProgram(String),
    AddSkill(String),
    RemoveSkill(String),
    NextStep,
    PrevStep,
    GoToStep(usize),
    SetErrors(ErrorMap),
    Reset,
}

pub(crate) const PROGRAMS_SKILLS_KEY: &str = "programsSkills";

/// Pure transition function. Validation is not performed here; callers gate
/// [`FormAction::NextStep`] with [`super::validate_step`].
pub fn reduce(mut state: FormState, action: FormAction) -> FormState {
    match action {
        FormAction::SetText { field, value } => {
            *text_slot(&mut state.data, field) = value;
            state.errors.remove(&field.to_string());
        }
        FormAction::SetFlag { field, value } => match field {
            FlagField::ClarifyingRelevanceEnabled => {
                state.data.clarifying_relevance_enabled = value;
            }
            FlagField::UseResumeAndJobPosting => {
                state.data.use_resume_and_job_posting = value;
                if !value {
                    state.errors.remove(&TextField::ResumeText.to_string());
                    state.errors.remove(&TextField::JobPostingText.to_string());
                }
            }
        },
        FormAction::AddOffense(offense) => {
            if state.data.offense(&offense.id).is_none() {
                state.data.offenses.push(offense);
            }
        }
        FormAction::RemoveOffense { id } => {
            state.data.offenses.retain(|o| o.id != id);
            let prefix = format!("offense-{id}-");
            state.errors.retain(|key, _| !key.starts_with(&prefix));
        }
        FormAction::UpdateOffense { id, field, value } => {
            if let Some(offense) = state.data.offense_mut(&id) {
                let key = match field {
                    OffenseField::Type => {
                        offense.offense_type = value;
                        offense.type_error_key()
                    }
                    OffenseField::Description => {
                        offense.description = value;
                        offense.description_error_key()
                    }
                };
                state.errors.remove(&key);
            }
        }
        FormAction::SetOffensePrograms { id, programs } => {
            if let Some(offense) = state.data.offense_mut(&id) {
                offense.programs = programs;
            }
        }
        FormAction::AddProgram(tag) => {
            if insert_tag(&mut state.data.programs, &tag) {
                state.errors.remove(PROGRAMS_SKILLS_KEY);
            }
        }
        FormAction::RemoveProgram(tag) => state.data.programs.retain(|p| *p != tag),
        FormAction::AddSkill(tag) => {
            if insert_tag(&mut state.data.skills, &tag) {
                state.errors.remove(PROGRAMS_SKILLS_KEY);
            }
        }
        FormAction::RemoveSkill(tag) => state.data.skills.retain(|s| *s != tag),
        FormAction::NextStep => {
            if state.current_step < state.total_steps() {
                state.current_step += 1;
            }
        }
        FormAction::PrevStep => {
            if state.current_step > 1 {
                state.current_step -= 1;
            }
        }
        FormAction::GoToStep(step) => {
            if (1..=state.total_steps()).contains(&step) {
                state.current_step = step;
            }
        }
        FormAction::SetErrors(errors) => state.errors = errors,
        FormAction::Reset => return FormState::new(state.tool),
    }
    state
}

fn text_slot(data: &mut FormData, field: TextField) -> &mut String {
    match field {
        TextField::ReleaseMonth => &mut data.release_month,
        TextField::ReleaseYear => &mut data.release_year,
        TextField::AdditionalContext => &mut data.additional_context,
        TextField::JobTitle => &mut data.job_title,
        TextField::EmployerName => &mut data.employer_name,
        TextField::Ownership => &mut data.ownership,
        TextField::Impact => &mut data.impact,
        TextField::LessonsLearned => &mut data.lessons_learned,
        TextField::ClarifyingRelevance => &mut data.clarifying_relevance,
        TextField::Qualifications => &mut data.qualifications,
        TextField::ResumeText => &mut data.resume_text,
        TextField::JobPostingText => &mut data.job_posting_text,
    }
}

/// Set semantics over an ordered list. Returns whether the tag was added.
fn insert_tag(tags: &mut Vec<String>, tag: &str) -> bool {
    let tag = tag.trim();
    if tag.is_empty() || tags.iter().any(|t| t == tag) {
        return false;
    }
    tags.push(tag.to_string());
    true
}
