//! Multi-step disclosure form: state, reducer, step layout and validation.
//!
//! The reducer never validates. An orchestrating layer calls
//! [`validate_step`] first and only dispatches [`FormAction::NextStep`] when
//! the returned map is empty (see `client::session`).

mod reducer;
mod steps;
mod types;
mod validation;

pub use reducer::{FlagField, FormAction, OffenseField, TextField, reduce};
pub use steps::{StepId, step_at, step_titles, steps_for, total_steps};
pub use types::{ErrorMap, FormData, FormState, Offense};
pub use validation::{validate_form, validate_step};
