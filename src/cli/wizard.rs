use anyhow::{Context, Result};
use console::Term;
use dialoguer::{Confirm, Input, Select};
use std::fmt::Write as _;
use strum::IntoEnumIterator;

use crate::client::{GenerationApi, GenerationClient, SessionView, StepOutcome, WizardSession};
use crate::config::Config;
use crate::form::{FlagField, FormAction, FormData, Offense, OffenseField, StepId, TextField, step_at};
use crate::generation::{GenerationResult, NarrativeType, ToolSelection};
use crate::navigation::{NavigationGuard, NavigationOutcome, Navigator};
use crate::regeneration::RegenerationTarget;
use crate::storage::SessionRecords;

use super::view::{
    dim, print_banner, print_bullet, print_errors, print_failed_banner, print_result, print_step,
    success, yellow,
};

const HOME: &str = "home";

/// Leaving the wizard is the terminal's only navigation.
#[derive(Debug, Default)]
struct TerminalNavigator {
    left: bool,
}

impl Navigator for TerminalNavigator {
    fn navigate(&mut self, destination: &str) {
        tracing::debug!(destination, "leaving wizard");
        self.left = true;
    }
}

enum Flow {
    Continue,
    /// Stop without clearing anything; the session can be resumed.
    Pause,
}

type Guard = NavigationGuard<TerminalNavigator>;

pub async fn run(config: &Config, tool: Option<ToolSelection>) -> Result<()> {
    print_banner();
    let tool = match tool {
        Some(tool) => tool,
        None => select_tool()?,
    };

    let records = SessionRecords::from_config(&config.storage).context("open session storage")?;
    let api = GenerationClient::from_config(&config.client);
    let mut session = WizardSession::open(tool, records.clone());
    let mut guard = NavigationGuard::new(TerminalNavigator::default(), records);
    guard.set_protected(true);

    while !guard.navigator().left {
        let flow = match session.view().clone() {
            SessionView::Form => form_screen(&mut session, &api, &mut guard).await?,
            SessionView::Results { failed } => {
                print_failed_banner(&failed);
                results_screen(&mut session, &api, &mut guard, !failed.is_empty()).await?
            }
            SessionView::Error {
                message, detail, ..
            } => error_screen(&mut session, &api, &mut guard, message, detail.as_deref()).await?,
        };
        if let Flow::Pause = flow {
            println!(
                "  {}",
                dim("Completed steps are saved. Run `reentry wizard` again to pick up where you left off.")
            );
            break;
        }
    }
    Ok(())
}

fn select_tool() -> Result<ToolSelection> {
    let options = [
        "Disclosure narratives and response letter",
        "Disclosure narratives only",
        "Pre-adverse action response letter only",
    ];
    let choice = Select::new()
        .with_prompt("  What would you like to create?")
        .items(&options)
        .default(0)
        .interact()?;
    Ok(match choice {
        1 => ToolSelection::Narrative,
        2 => ToolSelection::ResponseLetter,
        _ => ToolSelection::Both,
    })
}

fn request_exit(guard: &mut Guard) -> Result<()> {
    if guard.request_navigation(HOME) == NavigationOutcome::PromptShown {
        let leave = Confirm::new()
            .with_prompt("  Leave the wizard? Your answers and documents will be deleted.")
            .default(false)
            .interact()?;
        if leave {
            match guard.confirm_navigation() {
                Ok(_) => println!("  {} Session cleared", success("✓")),
                Err(error) => {
                    println!("  {} Could not delete your saved answers: {error}", yellow("!"));
                    println!("  {}", dim("You are still in the wizard. Try exiting again."));
                    guard.cancel_navigation();
                }
            }
        } else {
            guard.cancel_navigation();
        }
    }
    Ok(())
}

fn reset_scroll() {
    // Best effort; a non-terminal stdout has nothing to clear.
    let _ = Term::stdout().clear_screen();
}

async fn generate_with_status(session: &mut WizardSession, api: &dyn GenerationApi) {
    println!();
    println!(
        "  {}",
        dim("Generating your documents. This can take a minute...")
    );
    session.submit(api).await;
}

// ── Form ────────────────────────────────────────────────────────────────────

async fn form_screen(
    session: &mut WizardSession,
    api: &dyn GenerationApi,
    guard: &mut Guard,
) -> Result<Flow> {
    let state = session.state();
    let (step, total, tool) = (state.current_step, state.total_steps(), state.tool);
    let Some(step_id) = step_at(tool, step) else {
        anyhow::bail!("step {step} is outside the {tool} layout");
    };

    print_step(step, total, step_id.title());
    print_errors(&session.state().errors);
    edit_step(session, step_id)?;

    let next_label = if session.state().is_last_step() {
        "Generate documents"
    } else {
        "Next"
    };
    let options = [
        next_label,
        "Back",
        "Finish later",
        "Exit and delete my answers",
    ];
    let choice = Select::new()
        .with_prompt("  ")
        .items(&options)
        .default(0)
        .interact()?;

    match choice {
        0 => match session.advance() {
            StepOutcome::Moved(_) => reset_scroll(),
            StepOutcome::Blocked => {
                println!("  {}", yellow("Please fix the following before continuing:"));
            }
            StepOutcome::ReadyToSubmit => generate_with_status(session, api).await,
            StepOutcome::AtFirstStep => {}
        },
        1 => {
            if let StepOutcome::Moved(_) = session.back() {
                reset_scroll();
            }
        }
        2 => return Ok(Flow::Pause),
        _ => request_exit(guard)?,
    }
    Ok(Flow::Continue)
}

fn edit_step(session: &mut WizardSession, step: StepId) -> Result<()> {
    match step {
        StepId::OffenseHistory => edit_offenses(session)?,
        StepId::ProgramsSkills => {
            print_bullet("Separate entries with commas.");
            let programs = session.state().data.programs.clone();
            edit_list(session, "Programs completed", &programs, FormAction::AddProgram, FormAction::RemoveProgram)?;
            let skills = session.state().data.skills.clone();
            edit_list(session, "Skills", &skills, FormAction::AddSkill, FormAction::RemoveSkill)?;
        }
        StepId::AdditionalContext => {
            edit_text(session, TextField::AdditionalContext, "Anything else employers should know? (optional)")?;
        }
        StepId::JobDetails => {
            edit_text(session, TextField::JobTitle, "Job title")?;
            edit_text(session, TextField::EmployerName, "Employer name")?;
        }
        StepId::Ownership => {
            print_bullet("Take ownership: what happened, in your own words.");
            edit_text(session, TextField::Ownership, "Ownership (optional)")?;
        }
        StepId::Impact => {
            print_bullet("Who was affected, and how?");
            edit_text(session, TextField::Impact, "Impact (optional)")?;
        }
        StepId::LessonsLearned => {
            edit_text(session, TextField::LessonsLearned, "Lessons learned (optional)")?;
        }
        StepId::ClarifyingRelevance => {
            let enabled = edit_flag(
                session,
                FlagField::ClarifyingRelevanceEnabled,
                "Explain why your record is not relevant to this kind of work?",
            )?;
            if enabled {
                edit_text(session, TextField::ClarifyingRelevance, "Clarifying relevance")?;
            }
        }
        StepId::Qualifications => {
            edit_text(session, TextField::Qualifications, "Qualifications (optional)")?;
            if !session.tool().is_narrative_only() {
                let enabled = edit_flag(
                    session,
                    FlagField::UseResumeAndJobPosting,
                    "Tailor the letter with your resume and the job posting?",
                )?;
                if enabled {
                    edit_text(session, TextField::ResumeText, "Resume text")?;
                    edit_text(session, TextField::JobPostingText, "Job posting text")?;
                }
            }
        }
    }
    Ok(())
}

fn edit_offenses(session: &mut WizardSession) -> Result<()> {
    let existing: Vec<Offense> = session.state().data.offenses.clone();
    for (idx, offense) in existing.iter().enumerate() {
        println!("  {}", dim(format!("Offense {}", idx + 1)));
        let keep = Confirm::new()
            .with_prompt("  Keep this offense?")
            .default(true)
            .interact()?;
        if !keep {
            session.dispatch(FormAction::RemoveOffense {
                id: offense.id.clone(),
            });
            continue;
        }
        edit_offense(session, offense)?;
    }

    loop {
        let prompt = if session.state().data.offenses.is_empty() {
            "  Add an offense?"
        } else {
            "  Add another offense?"
        };
        let add = Confirm::new()
            .with_prompt(prompt)
            .default(session.state().data.offenses.is_empty())
            .interact()?;
        if !add {
            break;
        }
        let offense = Offense::new();
        session.dispatch(FormAction::AddOffense(offense.clone()));
        edit_offense(session, &offense)?;
    }

    edit_text(session, TextField::ReleaseMonth, "Release month")?;
    edit_text(session, TextField::ReleaseYear, "Release year")?;
    Ok(())
}

fn edit_offense(session: &mut WizardSession, offense: &Offense) -> Result<()> {
    let offense_type = prompt_text("Offense type", &offense.offense_type)?;
    session.dispatch(FormAction::UpdateOffense {
        id: offense.id.clone(),
        field: OffenseField::Type,
        value: offense_type,
    });
    let description = prompt_text("Description", &offense.description)?;
    session.dispatch(FormAction::UpdateOffense {
        id: offense.id.clone(),
        field: OffenseField::Description,
        value: description,
    });
    let programs = prompt_text(
        "Programs tied to this offense (comma separated, optional)",
        &offense.programs.join(", "),
    )?;
    session.dispatch(FormAction::SetOffensePrograms {
        id: offense.id.clone(),
        programs: split_list(&programs),
    });
    Ok(())
}

fn prompt_text(label: &str, current: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(format!("  {label}"))
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?;
    Ok(value)
}

fn edit_text(session: &mut WizardSession, field: TextField, label: &str) -> Result<()> {
    let current = text_value(&session.state().data, field).to_string();
    let value = prompt_text(label, &current)?;
    if value != current {
        session.dispatch(FormAction::SetText { field, value });
    }
    Ok(())
}

fn edit_flag(session: &mut WizardSession, field: FlagField, prompt: &str) -> Result<bool> {
    let data = &session.state().data;
    let current = match field {
        FlagField::ClarifyingRelevanceEnabled => data.clarifying_relevance_enabled,
        FlagField::UseResumeAndJobPosting => data.use_resume_and_job_posting,
    };
    let value = Confirm::new()
        .with_prompt(format!("  {prompt}"))
        .default(current)
        .interact()?;
    session.dispatch(FormAction::SetFlag { field, value });
    Ok(value)
}

fn edit_list(
    session: &mut WizardSession,
    label: &str,
    current: &[String],
    add: fn(String) -> FormAction,
    remove: fn(String) -> FormAction,
) -> Result<()> {
    let entered = split_list(&prompt_text(label, &current.join(", "))?);
    for item in current {
        if !entered.contains(item) {
            session.dispatch(remove(item.clone()));
        }
    }
    for item in entered {
        session.dispatch(add(item));
    }
    Ok(())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn text_value(data: &FormData, field: TextField) -> &str {
    match field {
        TextField::ReleaseMonth => &data.release_month,
        TextField::ReleaseYear => &data.release_year,
        TextField::AdditionalContext => &data.additional_context,
        TextField::JobTitle => &data.job_title,
        TextField::EmployerName => &data.employer_name,
        TextField::Ownership => &data.ownership,
        TextField::Impact => &data.impact,
        TextField::LessonsLearned => &data.lessons_learned,
        TextField::ClarifyingRelevance => &data.clarifying_relevance,
        TextField::Qualifications => &data.qualifications,
        TextField::ResumeText => &data.resume_text,
        TextField::JobPostingText => &data.job_posting_text,
    }
}

// ── Results ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum ResultsAction {
    RetryFailed,
    RegenerateNarrative,
    RegenerateLetter,
    SaveToFile,
    FinishLater,
    StartOver,
}

async fn results_screen(
    session: &mut WizardSession,
    api: &dyn GenerationApi,
    guard: &mut Guard,
    has_failures: bool,
) -> Result<Flow> {
    let Some(result) = session.result().cloned() else {
        session.back_to_form();
        return Ok(Flow::Continue);
    };
    print_result(&result);

    let mut options: Vec<(String, ResultsAction)> = Vec::new();
    if has_failures {
        options.push(("Retry failed documents".into(), ResultsAction::RetryFailed));
    }
    if !result.narratives.is_empty() {
        options.push(("Regenerate a narrative".into(), ResultsAction::RegenerateNarrative));
    }
    if result.response_letter.is_some() {
        let remaining = session.counts().remaining(RegenerationTarget::Letter);
        options.push((
            format!("Regenerate letter ({remaining} left)"),
            ResultsAction::RegenerateLetter,
        ));
    }
    options.push(("Save documents to a file".into(), ResultsAction::SaveToFile));
    options.push(("Finish later".into(), ResultsAction::FinishLater));
    options.push(("Start over (deletes everything)".into(), ResultsAction::StartOver));

    let labels: Vec<&str> = options.iter().map(|(label, _)| label.as_str()).collect();
    let choice = Select::new()
        .with_prompt("  What next?")
        .items(&labels)
        .default(0)
        .interact()?;
    let Some((_, action)) = options.get(choice) else {
        return Ok(Flow::Continue);
    };

    match action {
        ResultsAction::RetryFailed => {
            println!("  {}", dim("Retrying the documents that failed..."));
            if let Err(error) = session.retry_failed(api).await {
                println!("  {} {error}", yellow("!"));
            }
        }
        ResultsAction::RegenerateNarrative => regenerate_narrative(session, api, &result).await?,
        ResultsAction::RegenerateLetter => {
            match session.regenerate_letter(api).await {
                Ok(_) => println!("  {} Letter regenerated", success("✓")),
                Err(error) => println!("  {} {error}", yellow("!")),
            }
        }
        ResultsAction::SaveToFile => save_to_file(&result)?,
        ResultsAction::FinishLater => return Ok(Flow::Pause),
        ResultsAction::StartOver => request_exit(guard)?,
    }
    Ok(Flow::Continue)
}

async fn regenerate_narrative(
    session: &mut WizardSession,
    api: &dyn GenerationApi,
    result: &GenerationResult,
) -> Result<()> {
    let kinds: Vec<NarrativeType> = NarrativeType::iter()
        .filter(|kind| result.narrative(*kind).is_some())
        .collect();
    let labels: Vec<String> = kinds
        .iter()
        .map(|kind| {
            let remaining = session
                .counts()
                .remaining(RegenerationTarget::Narrative(*kind));
            format!("{} ({remaining} left)", kind.title())
        })
        .collect();
    let choice = Select::new()
        .with_prompt("  Which narrative?")
        .items(&labels)
        .default(0)
        .interact()?;
    let Some(kind) = kinds.get(choice).copied() else {
        return Ok(());
    };

    match session.regenerate_narrative(api, kind).await {
        Ok(item) => println!("  {} {} regenerated", success("✓"), item.title),
        Err(error) => println!("  {} {error}", yellow("!")),
    }
    Ok(())
}

fn save_to_file(result: &GenerationResult) -> Result<()> {
    let path: String = Input::new()
        .with_prompt("  File name")
        .with_initial_text("reentry-documents.md")
        .interact_text()?;
    std::fs::write(&path, render_markdown(result)).with_context(|| format!("write {path}"))?;
    println!("  {} Saved to {path}", success("✓"));
    Ok(())
}

fn render_markdown(result: &GenerationResult) -> String {
    let mut out = String::new();
    for narrative in &result.narratives {
        let _ = writeln!(out, "## {}\n\n{}\n", narrative.title, narrative.content);
    }
    if let Some(letter) = &result.response_letter {
        let _ = writeln!(out, "## {}\n\n{}\n", letter.title, letter.content);
    }
    out
}

// ── Error ───────────────────────────────────────────────────────────────────

async fn error_screen(
    session: &mut WizardSession,
    api: &dyn GenerationApi,
    guard: &mut Guard,
    message: &str,
    detail: Option<&str>,
) -> Result<Flow> {
    println!();
    println!("  {} {message}", yellow("!"));
    if let Some(detail) = detail {
        println!("  {}", dim(detail));
    }

    let options = [
        "Try Again",
        "Go back to form",
        "Finish later",
        "Exit and delete my answers",
    ];
    let choice = Select::new()
        .with_prompt("  ")
        .items(&options)
        .default(0)
        .interact()?;
    match choice {
        0 => {
            println!("  {}", dim("Generating your documents. This can take a minute..."));
            session.try_again(api).await;
        }
        1 => session.back_to_form(),
        2 => return Ok(Flow::Pause),
        _ => request_exit(guard)?,
    }
    Ok(Flow::Continue)
}
