//! End-to-end run of a loaded spec: generate → validate → save.
//!
//! Steps run strictly in order; nothing is written unless the generated code
//! validated or validation was explicitly skipped.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::error::TestgenResult;
use crate::generator::Generator;
use crate::persist;
use crate::spec::model::{Spec, SpecKind};
use crate::validate::{validate, Grammar};

/// Where validated code goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Explicit file path.
    File(PathBuf),
    /// `test_<stem>.py` inside this directory.
    DefaultIn(PathBuf),
    /// Hand the code back for printing.
    Stdout,
}

/// Per-run switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub skip_validation: bool,
    pub destination: Destination,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            skip_validation: false,
            destination: Destination::DefaultIn(PathBuf::from(persist::DEFAULT_OUTPUT_DIR)),
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written { path: PathBuf, kind: SpecKind },
    Printed { code: String, kind: SpecKind },
}

/// Run a loaded spec through generation, validation and output.
pub async fn run(
    generator: &Generator,
    grammar: &dyn Grammar,
    spec: &Spec,
    options: &PipelineOptions,
) -> TestgenResult<Outcome> {
    let kind = spec.kind();
    info!(template = %kind, "Using template");

    let raw = generator.generate(spec.text(), kind).await?;

    let code = if options.skip_validation {
        warn!("Syntax validation skipped; output is unchecked");
        raw
    } else {
        validate(&raw, grammar).into_result()?
    };

    match &options.destination {
        Destination::Stdout => Ok(Outcome::Printed { code, kind }),
        Destination::File(path) => {
            persist::save(&code, path)?;
            Ok(Outcome::Written {
                path: path.clone(),
                kind,
            })
        }
        Destination::DefaultIn(dir) => {
            let path = persist::default_output_path(spec, dir);
            persist::save(&code, &path)?;
            Ok(Outcome::Written { path, kind })
        }
    }
}
