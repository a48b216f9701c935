use crate::support::GatewayTestServer;
use reentry::client::{GenerationClient, SessionView, StepOutcome, WizardSession};
use reentry::form::{FormAction, Offense, OffenseField, TextField};
use reentry::generation::{GenerationStatus, NarrativeType, ToolSelection};
use reentry::navigation::{NavigationGuard, Navigator};
use reentry::storage::{FileStore, SessionRecords};
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Default)]
struct Visits(Vec<String>);

impl Navigator for Visits {
    fn navigate(&mut self, destination: &str) {
        self.0.push(destination.to_string());
    }
}

fn fill_offense_step(session: &mut WizardSession) {
    session.dispatch(FormAction::AddOffense(Offense::with_id("o1")));
    session.dispatch(FormAction::UpdateOffense {
        id: "o1".into(),
        field: OffenseField::Type,
        value: "Possession".into(),
    });
    session.dispatch(FormAction::UpdateOffense {
        id: "o1".into(),
        field: OffenseField::Description,
        value: "2015 charge".into(),
    });
    session.dispatch(FormAction::SetText {
        field: TextField::ReleaseMonth,
        value: "May".into(),
    });
    session.dispatch(FormAction::SetText {
        field: TextField::ReleaseYear,
        value: "2019".into(),
    });
}

#[tokio::test]
async fn narrative_wizard_end_to_end() {
    let server = GatewayTestServer::start().await;
    let api = GenerationClient::new(&server.base_url(), None);
    let dir = TempDir::new().expect("temp session dir");
    let store = Arc::new(FileStore::open(dir.path()).expect("session dir should open"));
    let records = SessionRecords::new(store, chrono::Duration::hours(24));
    let tool = ToolSelection::Narrative;

    let mut session = WizardSession::open(tool, records.clone());
    assert_eq!(session.advance(), StepOutcome::Blocked);
    fill_offense_step(&mut session);
    assert!(matches!(session.advance(), StepOutcome::Moved(_)));

    session.dispatch(FormAction::AddProgram("Culinary Arts".into()));
    while let StepOutcome::Moved(_) = session.advance() {}
    assert_eq!(session.state().current_step, session.state().total_steps());

    // A reopened session resumes at the same step.
    let reopened = WizardSession::open(tool, records.clone());
    assert_eq!(reopened.state().current_step, session.state().current_step);

    let view = session.submit(&api).await.clone();
    assert_eq!(view, SessionView::Results { failed: vec![] });
    let result = session.result().expect("results should be kept");
    assert_eq!(result.status, GenerationStatus::Success);
    assert!(result.response_letter.is_none());

    let regenerated = session
        .regenerate_narrative(&api, NarrativeType::PersonalGrowth)
        .await
        .expect("regeneration should succeed");
    assert!(regenerated.content.contains("Culinary Arts"));

    let mut guard = NavigationGuard::new(Visits::default(), records.clone());
    guard.set_protected(true);
    guard.request_navigation("/");
    guard.cancel_navigation();
    assert!(records.results.load(tool).is_some());

    guard.request_navigation("/");
    guard
        .confirm_navigation()
        .expect("session records should clear");
    assert_eq!(guard.navigator().0, vec!["/".to_string()]);
    assert!(records.results.load(tool).is_none());
    assert!(records.regeneration_counts.load(tool).is_none());
}
