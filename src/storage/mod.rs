//! Session persistence: a string key-value store plus typed, versioned records
//! for the form draft, generated results and regeneration counters.

mod kv;
mod record;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use record::{RECORD_VERSION, RecordStore};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::form::{FormData, FormState};
use crate::generation::GenerationResult;
use crate::regeneration::RegenerationCounts;

pub const FORM_DRAFT_KEY: &str = "reentry.formDraft";
pub const RESULTS_KEY: &str = "reentry.results";
pub const REGENERATION_COUNTS_KEY: &str = "reentry.regenerationCounts";

/// A generation outcome plus the form it was produced from, so a later
/// retry or regeneration can resend the same input after the draft is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResults {
    pub result: GenerationResult,
    pub form_data: FormData,
}

/// The three records a wizard session keeps.
#[derive(Clone)]
pub struct SessionRecords {
    pub draft: RecordStore<FormState>,
    pub results: RecordStore<SavedResults>,
    pub regeneration_counts: RecordStore<RegenerationCounts>,
}

impl SessionRecords {
    pub fn new(store: Arc<dyn KeyValueStore>, max_age: Duration) -> Self {
        Self {
            draft: RecordStore::new(Arc::clone(&store), FORM_DRAFT_KEY, max_age),
            results: RecordStore::new(Arc::clone(&store), RESULTS_KEY, max_age),
            regeneration_counts: RecordStore::new(store, REGENERATION_COUNTS_KEY, max_age),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Duration::hours(24))
    }

    /// File-backed when `session_dir` is configured, in-memory otherwise.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let max_age = Duration::hours(i64::from(config.max_age_hours));
        let store: Arc<dyn KeyValueStore> = match config.resolved_session_dir() {
            Some(dir) => {
                tracing::debug!(dir = %dir.display(), "using file-backed session store");
                Arc::new(FileStore::open(dir)?)
            }
            None => Arc::new(MemoryStore::new()),
        };
        Ok(Self::new(store, max_age))
    }

    /// Drop every record. Attempts all three even if one fails.
    pub fn clear_all(&self) -> Result<(), StorageError> {
        let draft = self.draft.clear();
        let results = self.results.clear();
        let counts = self.regeneration_counts.clear();
        draft?;
        results?;
        counts?;
        tracing::info!("session records cleared");
        Ok(())
    }
}
