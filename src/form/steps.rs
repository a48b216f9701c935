use crate::generation::ToolSelection;

/// Identity of a wizard page, independent of where the tool's layout puts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepId {
    OffenseHistory,
    ProgramsSkills,
    AdditionalContext,
    JobDetails,
    Ownership,
    Impact,
    LessonsLearned,
    ClarifyingRelevance,
    Qualifications,
}

const FULL_LAYOUT: [StepId; 9] = [
    StepId::OffenseHistory,
    StepId::ProgramsSkills,
    StepId::AdditionalContext,
    StepId::JobDetails,
    StepId::Ownership,
    StepId::Impact,
    StepId::LessonsLearned,
    StepId::ClarifyingRelevance,
    StepId::Qualifications,
];

const NARRATIVE_LAYOUT: [StepId; 8] = [
    StepId::OffenseHistory,
    StepId::ProgramsSkills,
    StepId::AdditionalContext,
    StepId::Ownership,
    StepId::Impact,
    StepId::LessonsLearned,
    StepId::ClarifyingRelevance,
    StepId::Qualifications,
];

impl StepId {
    pub fn title(self) -> &'static str {
        match self {
            Self::OffenseHistory => "Justice Involvement",
            Self::ProgramsSkills => "Programs & Skills",
            Self::AdditionalContext => "Additional Context",
            Self::JobDetails => "Job Details",
            Self::Ownership => "Ownership",
            Self::Impact => "Impact",
            Self::LessonsLearned => "Lessons Learned",
            Self::ClarifyingRelevance => "Clarifying Relevance",
            Self::Qualifications => "Qualifications",
        }
    }
}

/// Ordered pages for a tool. The narrative-only tool has no job application,
/// so it skips the job details page.
pub fn steps_for(tool: ToolSelection) -> &'static [StepId] {
    if tool.is_narrative_only() {
        &NARRATIVE_LAYOUT
    } else {
        &FULL_LAYOUT
    }
}

pub fn total_steps(tool: ToolSelection) -> usize {
    steps_for(tool).len()
}

/// Resolves a 1-based step number.
pub fn step_at(tool: ToolSelection, step: usize) -> Option<StepId> {
    step.checked_sub(1)
        .and_then(|idx| steps_for(tool).get(idx).copied())
}

pub fn step_titles(tool: ToolSelection) -> Vec<&'static str> {
    steps_for(tool).iter().map(|s| s.title()).collect()
}
