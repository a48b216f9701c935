use console::style;
use std::fmt::Display;

use crate::form::ErrorMap;
use crate::generation::{DocumentType, GenerationResult};

/// Green bold: success checkmarks, confirmations
pub fn success<D: Display>(text: D) -> String {
    style(text).green().bold().to_string()
}

/// Dim: subtitles, secondary text, decorative lines
pub fn dim<D: Display>(text: D) -> String {
    style(text).dim().to_string()
}

/// Yellow: warnings
pub fn yellow<D: Display>(text: D) -> String {
    style(text).yellow().to_string()
}

pub fn print_banner() {
    println!();
    println!("  {}", style("Reentry document wizard").white().bold());
    println!(
        "  {}",
        dim("Your answers stay on this machine until you choose to generate.")
    );
    println!();
}

pub fn print_step(current: usize, total: usize, title: &str) {
    println!();
    println!(
        "  {} {}",
        style(format!("[{current}/{total}]")).cyan().bold(),
        style(title).white().bold()
    );
    println!("  {}", dim("─".repeat(50)));
}

pub fn print_bullet(text: &str) {
    println!("  {} {}", style("›").cyan(), text);
}

pub fn print_errors(errors: &ErrorMap) {
    for message in errors.values() {
        println!("  {} {}", style("✗").red().bold(), message);
    }
}

fn document_label(document_type: DocumentType) -> &'static str {
    match document_type {
        DocumentType::Narrative => "Narratives",
        DocumentType::ResponseLetter => "Response letter",
    }
}

pub fn print_failed_banner(failed: &[DocumentType]) {
    if failed.is_empty() {
        return;
    }
    let labels: Vec<&str> = failed.iter().map(|t| document_label(*t)).collect();
    println!();
    println!(
        "  {} {}",
        yellow("!"),
        yellow(format!(
            "Some documents could not be generated: {}",
            labels.join(", ")
        ))
    );
}

pub fn print_result(result: &GenerationResult) {
    for narrative in &result.narratives {
        println!();
        println!("  {}", style(&narrative.title).cyan().bold());
        println!("{}", textwrap_indent(&narrative.content));
    }
    if let Some(letter) = &result.response_letter {
        println!();
        println!("  {}", style(&letter.title).cyan().bold());
        println!("{}", textwrap_indent(&letter.content));
    }
}

fn textwrap_indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
