//! Wizard-side client: the HTTP API for the generation endpoints and the
//! session controller that drives form, storage and regeneration together.

mod api;
mod session;

pub use api::{ApiFuture, GenerationApi, GenerationClient};
pub use session::{SessionView, StepChange, StepOutcome, WizardSession};
