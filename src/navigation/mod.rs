//! Leave-page protection for the form, loading and results screens.
//!
//! The guard is plain state owned by whoever drives the UI. While protected,
//! a navigation request is parked until the user confirms or cancels; a
//! confirmed exit wipes every session record before moving on.

use crate::error::StorageError;
use crate::storage::SessionRecords;

/// The router the guard hands confirmed destinations to.
pub trait Navigator {
    fn navigate(&mut self, destination: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Page was unprotected; navigation happened immediately.
    Navigated,
    /// Confirmation prompt is showing for the pending destination.
    PromptShown,
}

pub struct NavigationGuard<N> {
    navigator: N,
    records: SessionRecords,
    protected: bool,
    pending: Option<String>,
}

impl<N: Navigator> NavigationGuard<N> {
    pub fn new(navigator: N, records: SessionRecords) -> Self {
        Self {
            navigator,
            records,
            protected: false,
            pending: None,
        }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    pub fn pending_destination(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn is_prompt_shown(&self) -> bool {
        self.pending.is_some()
    }

    pub fn set_protected(&mut self, protected: bool) {
        self.protected = protected;
        if !protected {
            self.pending = None;
        }
    }

    /// A second request while the prompt is open replaces the destination.
    pub fn request_navigation(&mut self, destination: &str) -> NavigationOutcome {
        if !self.protected {
            self.navigator.navigate(destination);
            return NavigationOutcome::Navigated;
        }
        tracing::debug!(destination, "navigation intercepted");
        self.pending = Some(destination.to_string());
        NavigationOutcome::PromptShown
    }

    /// Clear session data, go to the pending destination and drop protection.
    /// Returns the destination, or `None` when no prompt was open.
    ///
    /// If the records cannot be cleared the user stays put: protection and
    /// the open prompt are kept so the exit can be retried or cancelled.
    pub fn confirm_navigation(&mut self) -> Result<Option<String>, StorageError> {
        let Some(destination) = self.pending.clone() else {
            return Ok(None);
        };
        if let Err(error) = self.records.clear_all() {
            tracing::warn!(
                %error,
                destination = %destination,
                "failed to clear session records; staying on page"
            );
            return Err(error);
        }
        self.pending = None;
        self.protected = false;
        self.navigator.navigate(&destination);
        Ok(Some(destination))
    }

    /// Close the prompt. Data and protection are untouched.
    pub fn cancel_navigation(&mut self) {
        self.pending = None;
    }
}
