use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Which artifacts the user asked for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ToolSelection {
    Narrative,
    ResponseLetter,
    #[default]
    Both,
}

impl ToolSelection {
    pub fn is_narrative_only(self) -> bool {
        self == Self::Narrative
    }

    pub fn wants_narratives(self) -> bool {
        matches!(self, Self::Narrative | Self::Both)
    }

    pub fn wants_letter(self) -> bool {
        matches!(self, Self::ResponseLetter | Self::Both)
    }

    /// Requested artifact types, in response order.
    pub fn requested(self) -> Vec<DocumentType> {
        let mut types = Vec::with_capacity(2);
        if self.wants_narratives() {
            types.push(DocumentType::Narrative);
        }
        if self.wants_letter() {
            types.push(DocumentType::ResponseLetter);
        }
        types
    }

    /// Narrowest selection covering `types`, if any.
    pub fn covering(types: &[DocumentType]) -> Option<Self> {
        let narrative = types.contains(&DocumentType::Narrative);
        let letter = types.contains(&DocumentType::ResponseLetter);
        match (narrative, letter) {
            (true, true) => Some(Self::Both),
            (true, false) => Some(Self::Narrative),
            (false, true) => Some(Self::ResponseLetter),
            (false, false) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum DocumentType {
    Narrative,
    ResponseLetter,
}

/// The closed set of disclosure narrative kinds.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NarrativeType {
    JusticeInvolvement,
    PersonalGrowth,
    SkillsAndExperience,
    JobReadiness,
    FutureGoals,
}

impl NarrativeType {
    pub fn title(self) -> &'static str {
        match self {
            Self::JusticeInvolvement => "Justice Involvement",
            Self::PersonalGrowth => "Personal Growth & Transformation",
            Self::SkillsAndExperience => "Skills & Experience",
            Self::JobReadiness => "Job Readiness",
            Self::FutureGoals => "Future Goals",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeItem {
    pub id: String,
    #[serde(rename = "type")]
    pub narrative_type: NarrativeType,
    pub title: String,
    pub content: String,
}

impl NarrativeItem {
    pub fn new(narrative_type: NarrativeType, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            narrative_type,
            title: narrative_type.title().to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseLetter {
    pub id: String,
    pub title: String,
    pub content: String,
}

impl ResponseLetter {
    pub const TITLE: &'static str = "Pre-Adverse Action Response Letter";

    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: Self::TITLE.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GenerationStatus {
    Success,
    PartialFail,
    TotalFail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentError {
    pub document_type: DocumentType,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub status: GenerationStatus,
    #[serde(default)]
    pub narratives: Vec<NarrativeItem>,
    #[serde(default)]
    pub response_letter: Option<ResponseLetter>,
    #[serde(default)]
    pub errors: Vec<DocumentError>,
}

impl GenerationResult {
    /// Document types that produced an error entry.
    pub fn failed_types(&self) -> Vec<DocumentType> {
        let mut failed: Vec<DocumentType> = Vec::with_capacity(self.errors.len());
        for err in &self.errors {
            if !failed.contains(&err.document_type) {
                failed.push(err.document_type);
            }
        }
        failed
    }

    pub fn first_error_detail(&self) -> Option<&str> {
        self.errors.first().map(|e| e.detail.as_str())
    }

    pub fn narrative(&self, narrative_type: NarrativeType) -> Option<&NarrativeItem> {
        self.narratives
            .iter()
            .find(|n| n.narrative_type == narrative_type)
    }
}

/// Status over the requested artifact types only.
pub fn determine_status(requested: usize, failed: usize) -> GenerationStatus {
    if failed == 0 {
        GenerationStatus::Success
    } else if failed >= requested {
        GenerationStatus::TotalFail
    } else {
        GenerationStatus::PartialFail
    }
}

// ── Wire requests ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub selection: ToolSelection,
    pub form_data: crate::form::FormData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateNarrativeRequest {
    pub narrative_type: NarrativeType,
    pub form_data: crate::form::FormData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateLetterRequest {
    pub form_data: crate::form::FormData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenerateNarrativeResponse {
    pub narrative: NarrativeItem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenerateLetterResponse {
    pub letter: ResponseLetter,
}
