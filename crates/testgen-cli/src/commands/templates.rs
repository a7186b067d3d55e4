//! Template inspection commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use testgen_core::{SpecKind, TemplateRegistry};

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// List available template kinds
    List,

    /// Print a template's prompt body
    Show {
        /// Template kind
        kind: SpecKind,
    },
}

pub fn execute(cmd: TemplateCommands) -> Result<()> {
    let registry = TemplateRegistry::builtin()?;

    match cmd {
        TemplateCommands::List => {
            println!("{}", "Templates".bold());
            for kind in registry.kinds() {
                let body = registry.lookup(kind)?;
                println!("  {} {:<10} {}", "●".cyan(), kind.as_str(), summary(body.source()).dimmed());
            }
        }
        TemplateCommands::Show { kind } => {
            print!("{}", registry.lookup(kind)?.source());
        }
    }

    Ok(())
}

/// First non-empty line of a template.
fn summary(source: &str) -> &str {
    source
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}
