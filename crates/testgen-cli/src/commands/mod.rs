//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::FileConfig;

pub mod generate;
pub mod templates;

/// Generate pytest suites from specifications
#[derive(Parser)]
#[command(name = "testgen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ./testgen.toml, then the user config dir)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Append logs to this file as well as stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate tests from a spec file or inline text
    Generate(generate::GenerateArgs),

    /// Inspect the built-in prompt templates
    #[command(subcommand)]
    Templates(templates::TemplateCommands),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Generate(args) => {
                let file_config = FileConfig::discover(self.config.as_deref())?;
                generate::execute(args, &file_config).await
            }
            Commands::Templates(cmd) => templates::execute(cmd),
        }
    }
}
