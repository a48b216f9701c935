use crate::error::{ClientError, ClientErrorKind, SessionError};
use crate::form::{
    ErrorMap, FormAction, FormData, FormState, reduce, validate_form, validate_step,
};
use crate::generation::{
    DocumentType, GenerationResult, GenerationStatus, NarrativeItem, NarrativeType,
    ResponseLetter, ToolSelection, determine_status,
};
use crate::regeneration::{RegenerationCounts, RegenerationTarget};
use crate::storage::{SavedResults, SessionRecords};

use super::api::GenerationApi;

/// Which screen the wizard should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionView {
    Form,
    /// `failed` lists the artifact types for the partial-failure banner.
    Results { failed: Vec<DocumentType> },
    /// Offers "Try Again" and "Go back to form"; the form is kept either way.
    Error {
        kind: ClientErrorKind,
        message: &'static str,
        detail: Option<String>,
    },
}

/// A completed step move. The caller resets its scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepChange {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Moved(StepChange),
    /// Validation failed; errors are now in the form state.
    Blocked,
    /// The last step is valid; the next move is submission.
    ReadyToSubmit,
    AtFirstStep,
}

/// Client-side coordinator for one run through the wizard.
///
/// Owns the form state, the latest results and the regeneration budget, and
/// mirrors each of them into [`SessionRecords`] so a reopened session picks up
/// where it left off. Storage failures are logged and never block the user.
pub struct WizardSession {
    records: SessionRecords,
    state: FormState,
    saved: Option<SavedResults>,
    counts: RegenerationCounts,
    view: SessionView,
}

impl WizardSession {
    /// Rehydrate whatever the store holds for `tool`, or start fresh.
    pub fn open(tool: ToolSelection, records: SessionRecords) -> Self {
        let saved = records.results.load(tool);
        let counts = records.regeneration_counts.load(tool).unwrap_or_default();
        let state = records
            .draft
            .load(tool)
            .map_or_else(|| FormState::new(tool), FormState::clamp_step);

        let view = match &saved {
            Some(saved) => SessionView::Results {
                failed: saved.result.failed_types(),
            },
            None => SessionView::Form,
        };
        tracing::info!(
            %tool,
            step = state.current_step,
            has_results = saved.is_some(),
            "wizard session opened"
        );

        Self {
            records,
            state,
            saved,
            counts,
            view,
        }
    }

    pub fn tool(&self) -> ToolSelection {
        self.state.tool
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn view(&self) -> &SessionView {
        &self.view
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.saved.as_ref().map(|saved| &saved.result)
    }

    pub fn counts(&self) -> &RegenerationCounts {
        &self.counts
    }

    pub fn dispatch(&mut self, action: FormAction) {
        let tool = self.state.tool;
        let state = std::mem::replace(&mut self.state, FormState::new(tool));
        self.state = reduce(state, action);
    }

    pub fn advance(&mut self) -> StepOutcome {
        let from = self.state.current_step;
        let errors = validate_step(from, &self.state, self.state.tool);
        if !errors.is_empty() {
            tracing::debug!(step = from, errors = errors.len(), "step blocked by validation");
            self.dispatch(FormAction::SetErrors(errors));
            return StepOutcome::Blocked;
        }

        self.dispatch(FormAction::SetErrors(ErrorMap::new()));
        if self.state.is_last_step() {
            self.save_draft();
            return StepOutcome::ReadyToSubmit;
        }
        self.dispatch(FormAction::NextStep);
        self.save_draft();
        StepOutcome::Moved(StepChange {
            from,
            to: self.state.current_step,
        })
    }

    pub fn back(&mut self) -> StepOutcome {
        let from = self.state.current_step;
        if self.state.is_first_step() {
            return StepOutcome::AtFirstStep;
        }
        self.dispatch(FormAction::PrevStep);
        self.save_draft();
        StepOutcome::Moved(StepChange {
            from,
            to: self.state.current_step,
        })
    }

    /// Validate everything, then send one generation request.
    ///
    /// Success and partial failure land on the results view with fresh
    /// regeneration counters and the draft cleared. Anything else lands on
    /// the error view with the draft still stored.
    pub async fn submit(&mut self, api: &dyn GenerationApi) -> &SessionView {
        let tool = self.state.tool;
        let errors = validate_form(&self.state, tool);
        if !errors.is_empty() {
            tracing::debug!(errors = errors.len(), "submission blocked by validation");
            self.dispatch(FormAction::SetErrors(errors));
            self.view = SessionView::Form;
            return &self.view;
        }
        self.dispatch(FormAction::SetErrors(ErrorMap::new()));
        self.save_draft();

        match api.generate_documents(tool, &self.state.data).await {
            Ok(result) if result.status != GenerationStatus::TotalFail => {
                self.accept_results(result);
            }
            Ok(result) => {
                let detail = result.first_error_detail().map(ToString::to_string);
                self.show_error(
                    &ClientError::new(ClientErrorKind::Server, "all documents failed")
                        .with_detail(detail),
                );
            }
            Err(error) => self.show_error(&error),
        }
        &self.view
    }

    /// "Try Again" from the error view: resend the stored draft.
    pub async fn try_again(&mut self, api: &dyn GenerationApi) -> &SessionView {
        if let Some(draft) = self.records.draft.load(self.state.tool) {
            self.state = draft.clamp_step();
        }
        self.submit(api).await
    }

    /// "Go back to form": nothing is lost.
    pub fn back_to_form(&mut self) {
        self.view = SessionView::Form;
    }

    /// Regenerate only the artifact types that failed and fold them into the
    /// stored result. A failed retry leaves the stored result untouched.
    pub async fn retry_failed(&mut self, api: &dyn GenerationApi) -> Result<(), SessionError> {
        let saved = self.saved.as_ref().ok_or(SessionError::NoResults)?;
        let selection = ToolSelection::covering(&saved.result.failed_types())
            .ok_or(SessionError::NothingToRetry)?;
        let form = saved.form_data.clone();

        let retry = api.generate_documents(selection, &form).await?;

        let tool = self.state.tool;
        let saved = self.saved.as_mut().ok_or(SessionError::NoResults)?;
        merge_retry(&mut saved.result, retry, selection, tool);
        tracing::info!(%selection, status = %saved.result.status, "failed documents retried");

        self.view = SessionView::Results {
            failed: saved.result.failed_types(),
        };
        self.persist_results();
        Ok(())
    }

    pub async fn regenerate_narrative(
        &mut self,
        api: &dyn GenerationApi,
        narrative_type: NarrativeType,
    ) -> Result<NarrativeItem, SessionError> {
        let target = RegenerationTarget::Narrative(narrative_type);
        let form = self.regeneration_input(target)?;
        let item = api.regenerate_narrative(narrative_type, &form).await?;

        let saved = self.saved.as_mut().ok_or(SessionError::NoResults)?;
        let narratives = &mut saved.result.narratives;
        match narratives
            .iter_mut()
            .find(|n| n.narrative_type == narrative_type)
        {
            Some(existing) => *existing = item.clone(),
            None => {
                narratives.push(item.clone());
                narratives.sort_by_key(|n| n.narrative_type);
            }
        }
        self.finish_regeneration(target);
        Ok(item)
    }

    pub async fn regenerate_letter(
        &mut self,
        api: &dyn GenerationApi,
    ) -> Result<ResponseLetter, SessionError> {
        let target = RegenerationTarget::Letter;
        let form = self.regeneration_input(target)?;
        let letter = api.regenerate_letter(&form).await?;

        let saved = self.saved.as_mut().ok_or(SessionError::NoResults)?;
        saved.result.response_letter = Some(letter.clone());
        self.finish_regeneration(target);
        Ok(letter)
    }

    fn regeneration_input(
        &self,
        target: RegenerationTarget,
    ) -> Result<FormData, SessionError> {
        let saved = self.saved.as_ref().ok_or(SessionError::NoResults)?;
        if !self.counts.can_regenerate(target) {
            return Err(SessionError::LimitReached {
                target: target.to_string(),
            });
        }
        Ok(saved.form_data.clone())
    }

    fn finish_regeneration(&mut self, target: RegenerationTarget) {
        self.counts.record_regeneration(target);
        tracing::info!(%target, remaining = self.counts.remaining(target), "document regenerated");
        self.persist_results();
        if let Err(error) = self
            .records
            .regeneration_counts
            .save(&self.counts, self.state.tool)
        {
            tracing::warn!(%error, "failed to save regeneration counts");
        }
    }

    fn accept_results(&mut self, result: GenerationResult) {
        let tool = self.state.tool;
        tracing::info!(%tool, status = %result.status, "documents generated");
        self.view = SessionView::Results {
            failed: result.failed_types(),
        };
        self.saved = Some(SavedResults {
            result,
            form_data: self.state.data.clone(),
        });
        self.counts = RegenerationCounts::default();

        self.persist_results();
        if let Err(error) = self.records.regeneration_counts.save(&self.counts, tool) {
            tracing::warn!(%error, "failed to save regeneration counts");
        }
        if let Err(error) = self.records.draft.clear() {
            tracing::warn!(%error, "failed to clear form draft");
        }
    }

    fn show_error(&mut self, error: &ClientError) {
        tracing::warn!(kind = %error.kind, "document generation failed");
        self.view = SessionView::Error {
            kind: error.kind,
            message: error.user_message(),
            detail: error.detail.clone(),
        };
    }

    fn save_draft(&self) {
        if let Err(error) = self.records.draft.save(&self.state, self.state.tool) {
            tracing::warn!(%error, "failed to save form draft");
        }
    }

    fn persist_results(&self) {
        if let Some(saved) = &self.saved
            && let Err(error) = self.records.results.save(saved, self.state.tool)
        {
            tracing::warn!(%error, "failed to save generated documents");
        }
    }
}

fn merge_retry(
    original: &mut GenerationResult,
    retry: GenerationResult,
    retried: ToolSelection,
    tool: ToolSelection,
) {
    let retry_failed = retry.failed_types();
    if retried.wants_narratives() && !retry_failed.contains(&DocumentType::Narrative) {
        original.narratives = retry.narratives;
    }
    if retried.wants_letter() && retry.response_letter.is_some() {
        original.response_letter = retry.response_letter;
    }
    let retried_types = retried.requested();
    original
        .errors
        .retain(|e| !retried_types.contains(&e.document_type));
    original.errors.extend(retry.errors);
    original.status = determine_status(tool.requested().len(), original.failed_types().len());
}
