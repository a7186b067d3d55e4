//! `testgen generate`: spec in, validated pytest module out.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use testgen_core::pipeline::{self, Destination, Outcome, PipelineOptions};
use testgen_core::{
    render_prompt, spec, Generator, GeneratorSettings, PythonGrammar, SpecKind, SpecSource,
    TemplateRegistry, TestgenResult,
};
use testgen_llm::{create_backend, Provider};
use tracing::debug;

use crate::config::{BackendOverrides, FileConfig};
use crate::output;

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["spec_file", "spec"])))]
pub struct GenerateArgs {
    /// Spec file (YAML, JSON, TOML or plain text)
    pub spec_file: Option<PathBuf>,

    /// Inline specification text
    #[arg(short, long, value_name = "TEXT")]
    pub spec: Option<String>,

    /// Template kind: generic, register or interface (detected for structured files)
    #[arg(short, long, value_name = "KIND")]
    pub template: Option<SpecKind>,

    /// Output file (defaults to generated_tests/test_<name>.py)
    #[arg(short, long, value_name = "PATH", conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Print the generated code instead of writing a file
    #[arg(long)]
    pub stdout: bool,

    /// Skip Python syntax validation
    #[arg(long)]
    pub no_validate: bool,

    /// Print the rendered prompt and exit without calling the backend
    #[arg(long)]
    pub dry_run: bool,

    /// Model identifier
    #[arg(long, env = "TESTGEN_MODEL")]
    pub model: Option<String>,

    /// Maximum tokens to generate
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Backend provider: anthropic or ollama
    #[arg(long, env = "TESTGEN_PROVIDER")]
    pub provider: Option<Provider>,

    /// Backend endpoint override
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl GenerateArgs {
    fn source(&self) -> SpecSource {
        match (&self.spec_file, &self.spec) {
            (Some(path), _) => SpecSource::Path(path.clone()),
            (None, Some(text)) => SpecSource::Inline(text.clone()),
            (None, None) => SpecSource::Inline(String::new()),
        }
    }

    fn overrides(&self) -> BackendOverrides {
        BackendOverrides {
            provider: self.provider,
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout,
            base_url: self.base_url.clone(),
        }
    }

    fn pipeline_options(&self, file_config: &FileConfig) -> PipelineOptions {
        let destination = if self.stdout {
            Destination::Stdout
        } else if let Some(path) = &self.output {
            Destination::File(path.clone())
        } else {
            Destination::DefaultIn(file_config.output_dir())
        };

        PipelineOptions {
            skip_validation: self.no_validate,
            destination,
        }
    }
}

pub async fn execute(args: GenerateArgs, file_config: &FileConfig) -> Result<()> {
    let options = args.pipeline_options(file_config);
    let spec = spec::load(&args.source(), args.template)?;
    output::print_template(spec.kind());

    let registry = TemplateRegistry::builtin()?;

    if args.dry_run {
        let prompt = render_prompt(&registry, spec.text(), spec.kind())?;
        println!("{prompt}");
        return Ok(());
    }

    let backend_config = file_config.resolve_backend(&args.overrides());
    debug!(
        provider = %backend_config.provider,
        model = %backend_config.model,
        max_tokens = backend_config.max_tokens,
        "Resolved backend"
    );

    let backend = create_backend(&backend_config).context("Failed to set up generation backend")?;
    let generator = Generator::new(
        registry,
        backend,
        GeneratorSettings {
            model: backend_config.model.clone(),
            max_tokens: backend_config.max_tokens,
        },
    );

    let spinner = output::spinner(format!(
        "Generating tests with {} ({})",
        backend_config.provider, backend_config.model
    ));
    let result = pipeline::run(&generator, &PythonGrammar, &spec, &options).await;
    spinner.finish_and_clear();

    if skipped_validation(&result, &options) {
        output::print_unvalidated();
    }

    match result? {
        Outcome::Written { path, .. } => output::print_generated(&path),
        Outcome::Printed { code, .. } => println!("{code}"),
    }

    Ok(())
}

/// True only when a run finished with validation switched off; a run that
/// failed earlier never got that far.
fn skipped_validation(result: &TestgenResult<Outcome>, options: &PipelineOptions) -> bool {
    options.skip_validation && result.is_ok()
}
