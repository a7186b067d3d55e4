//! testgen core library
//!
//! Turns a specification into pytest code: the spec is loaded and classified,
//! a prompt template is picked for its kind, the rendered prompt goes to a
//! generation backend, and the reply is only trusted once it parses.

pub mod backend;
pub mod error;
pub mod generator;
pub mod persist;
pub mod pipeline;
pub mod spec;
pub mod template;
pub mod validate;

pub use backend::{BackendError, GenerationBackend, GenerationRequest};
pub use error::{TestgenError, TestgenResult};
pub use generator::{render_prompt, Generator, GeneratorSettings};
pub use pipeline::{Destination, Outcome, PipelineOptions};
pub use spec::model::{Spec, SpecKind, SpecOrigin, SpecSource};
pub use template::{TemplateBody, TemplateRegistry};
pub use validate::{Diagnostic, PythonGrammar, ValidatedArtifact};
