use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::StorageError;
use crate::generation::ToolSelection;

use super::kv::KeyValueStore;

/// Current on-disk shape of every record. Anything else reads as absent.
pub const RECORD_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    version: u32,
    tool: ToolSelection,
    saved_at: DateTime<Utc>,
    value: T,
}

/// Typed, versioned record under a single key.
///
/// `load` never fails: a missing key, an unreadable payload, a version or tool
/// mismatch and an expired record all come back as `None`, so stale state can
/// never crash the wizard.
pub struct RecordStore<T> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    max_age: Duration,
    _value: PhantomData<fn() -> T>,
}

impl<T> Clone for RecordStore<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key,
            max_age: self.max_age,
            _value: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> RecordStore<T> {
    pub fn new(store: Arc<dyn KeyValueStore>, key: &'static str, max_age: Duration) -> Self {
        Self {
            store,
            key,
            max_age,
            _value: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn save(&self, value: &T, tool: ToolSelection) -> Result<(), StorageError> {
        self.save_at(value, tool, Utc::now())
    }

    pub(crate) fn save_at(
        &self,
        value: &T,
        tool: ToolSelection,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let envelope = Envelope {
            version: RECORD_VERSION,
            tool,
            saved_at,
            value,
        };
        let json = serde_json::to_string(&envelope).map_err(|source| StorageError::Serialize {
            key: self.key.to_string(),
            source,
        })?;
        self.store.set(self.key, &json)?;
        tracing::debug!(key = self.key, %tool, "record saved");
        Ok(())
    }

    pub fn load(&self, tool: ToolSelection) -> Option<T> {
        self.load_at(tool, Utc::now())
    }

    pub(crate) fn load_at(&self, tool: ToolSelection, now: DateTime<Utc>) -> Option<T> {
        let raw = match self.store.get(self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                tracing::warn!(key = self.key, %error, "record read failed; treating as absent");
                return None;
            }
        };

        let envelope: Envelope<T> = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::warn!(key = self.key, %error, "unreadable record; treating as absent");
                return None;
            }
        };

        if envelope.version != RECORD_VERSION {
            tracing::info!(
                key = self.key,
                found = envelope.version,
                expected = RECORD_VERSION,
                "record version mismatch; ignoring"
            );
            return None;
        }
        if envelope.tool != tool {
            tracing::debug!(key = self.key, stored = %envelope.tool, requested = %tool, "record belongs to another tool");
            return None;
        }
        if now.signed_duration_since(envelope.saved_at) > self.max_age {
            tracing::info!(key = self.key, saved_at = %envelope.saved_at, "record expired; ignoring");
            return None;
        }
        Some(envelope.value)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(self.key)
    }
}
