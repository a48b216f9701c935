use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::generation::ToolSelection;

use super::steps::total_steps;

/// Field name → user-facing validation message.
pub type ErrorMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Offense {
    pub id: String,
    #[serde(rename = "type")]
    pub offense_type: String,
    pub description: String,
    pub programs: Vec<String>,
}

impl Offense {
    /// Blank offense row with a fresh id.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn type_error_key(&self) -> String {
        format!("offense-{}-type", self.id)
    }

    pub fn description_error_key(&self) -> String {
        format!("offense-{}-description", self.id)
    }
}

/// Everything the user typed. This is the payload sent to the generation
/// endpoints; step position and validation errors stay client-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormData {
    pub offenses: Vec<Offense>,
    pub release_month: String,
    pub release_year: String,
    pub programs: Vec<String>,
    pub skills: Vec<String>,
    pub additional_context: String,

    // Job application (not used by the narrative-only tool)
    pub job_title: String,
    pub employer_name: String,

    // O.I.L. reflection
    pub ownership: String,
    pub impact: String,
    pub lessons_learned: String,

    pub clarifying_relevance_enabled: bool,
    pub clarifying_relevance: String,

    pub qualifications: String,
    pub use_resume_and_job_posting: bool,
    pub resume_text: String,
    pub job_posting_text: String,
}

impl FormData {
    pub fn offense(&self, id: &str) -> Option<&Offense> {
        self.offenses.iter().find(|o| o.id == id)
    }

    pub(super) fn offense_mut(&mut self, id: &str) -> Option<&mut Offense> {
        self.offenses.iter_mut().find(|o| o.id == id)
    }

    /// Clarifying relevance text, only when the user opted in.
    pub fn effective_clarifying_relevance(&self) -> Option<&str> {
        non_blank(self.clarifying_relevance_enabled, &self.clarifying_relevance)
    }

    pub fn effective_resume_text(&self) -> Option<&str> {
        non_blank(self.use_resume_and_job_posting, &self.resume_text)
    }

    pub fn effective_job_posting_text(&self) -> Option<&str> {
        non_blank(self.use_resume_and_job_posting, &self.job_posting_text)
    }
}

fn non_blank(enabled: bool, text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (enabled && !trimmed.is_empty()).then_some(trimmed)
}

/// The wizard's working state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub tool: ToolSelection,
    pub data: FormData,
    /// 1-based position in `steps_for(tool)`.
    pub current_step: usize,
    #[serde(default)]
    pub errors: ErrorMap,
}

impl FormState {
    pub fn new(tool: ToolSelection) -> Self {
        Self {
            tool,
            data: FormData::default(),
            current_step: 1,
            errors: ErrorMap::new(),
        }
    }

    pub fn total_steps(&self) -> usize {
        total_steps(self.tool)
    }

    pub fn is_first_step(&self) -> bool {
        self.current_step <= 1
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step >= self.total_steps()
    }

    /// Restores the step invariant on state read back from storage.
    pub(crate) fn clamp_step(mut self) -> Self {
        self.current_step = self.current_step.clamp(1, self.total_steps());
        self
    }
}
