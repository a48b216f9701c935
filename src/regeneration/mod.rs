//! Per-artifact regeneration budget.
//!
//! This is a client-side guardrail only; the gateway's regenerate endpoints
//! stay stateless and do not enforce it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::generation::{DocumentType, NarrativeType};

pub const MAX_REGENERATIONS: u32 = 3;

/// One regenerable artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegenerationTarget {
    Narrative(NarrativeType),
    Letter,
}

impl RegenerationTarget {
    pub fn document_type(self) -> DocumentType {
        match self {
            Self::Narrative(_) => DocumentType::Narrative,
            Self::Letter => DocumentType::ResponseLetter,
        }
    }
}

impl fmt::Display for RegenerationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Narrative(kind) => write!(f, "narrative:{kind}"),
            Self::Letter => f.write_str("letter"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegenerationCounts {
    pub narratives: BTreeMap<NarrativeType, u32>,
    pub letter: u32,
}

impl RegenerationCounts {
    pub fn count(&self, target: RegenerationTarget) -> u32 {
        match target {
            RegenerationTarget::Narrative(kind) => {
                self.narratives.get(&kind).copied().unwrap_or_default()
            }
            RegenerationTarget::Letter => self.letter,
        }
    }

    pub fn remaining(&self, target: RegenerationTarget) -> u32 {
        MAX_REGENERATIONS.saturating_sub(self.count(target))
    }

    pub fn can_regenerate(&self, target: RegenerationTarget) -> bool {
        self.count(target) < MAX_REGENERATIONS
    }

    /// Count one successful regeneration. Never exceeds [`MAX_REGENERATIONS`].
    pub fn record_regeneration(&mut self, target: RegenerationTarget) {
        let slot = match target {
            RegenerationTarget::Narrative(kind) => self.narratives.entry(kind).or_default(),
            RegenerationTarget::Letter => &mut self.letter,
        };
        *slot = slot.saturating_add(1).min(MAX_REGENERATIONS);
    }
}
