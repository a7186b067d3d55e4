//! Terminal output formatting.
//!
//! Everything here writes to stderr; stdout carries only generated code and
//! rendered prompts.

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use testgen_core::SpecKind;

pub fn print_template(kind: SpecKind) {
    eprintln!("{} {}", "Using template:".bold(), kind.as_str().cyan());
}

pub fn print_generated(path: &std::path::Path) {
    eprintln!("{} Generated: {}", "✓".green(), path.display());
}

pub fn print_unvalidated() {
    eprintln!("{} Syntax validation skipped", "!".yellow());
}

/// Spinner shown while the backend call is in flight.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}") {
        bar.set_style(style);
    }
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
