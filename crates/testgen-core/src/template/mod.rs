//! Prompt templates and the registry that maps spec kinds to them.
//!
//! Each template is a complete instruction set for the model with exactly one
//! `{{ spec }}` slot. Built-in bodies live in `templates/` and are embedded
//! at compile time; the registry is built once and handed to the generator.

use std::collections::BTreeMap;
use std::error::Error as _;

use tera::{Context, Tera};

use crate::error::{TestgenError, TestgenResult};
use crate::spec::model::SpecKind;

/// Name of the single substitution slot.
pub const SPEC_SLOT: &str = "spec";

/// Built-in template bodies, one per spec kind.
pub static BUILTIN_TEMPLATES: &[(SpecKind, &str)] = &[
    (SpecKind::Generic, include_str!("templates/generic.txt")),
    (SpecKind::Register, include_str!("templates/register.txt")),
    (SpecKind::Interface, include_str!("templates/interface.txt")),
];

/// A prompt template with one `{{ spec }}` substitution point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateBody {
    name: String,
    source: String,
}

impl TemplateBody {
    /// Check and wrap a template source.
    ///
    /// Fails unless the source parses and holds exactly one `{{ spec }}`
    /// expression and no other.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> TestgenResult<Self> {
        let name = name.into();
        let source = source.into();

        let slots = expressions(&source);
        let spec_slots = slots.iter().filter(|expr| **expr == SPEC_SLOT).count();
        if let Some(other) = slots.iter().find(|expr| **expr != SPEC_SLOT) {
            return Err(TestgenError::template(format!(
                "template '{name}' has unexpected expression '{{{{ {other} }}}}'"
            )));
        }
        if spec_slots != 1 {
            return Err(TestgenError::template(format!(
                "template '{name}' must contain exactly one '{{{{ {SPEC_SLOT} }}}}' slot, found {spec_slots}"
            )));
        }

        let mut tera = Tera::default();
        tera.add_raw_template(&name, &source)
            .map_err(|e| TestgenError::template(format!("template '{name}': {}", error_chain(&e))))?;

        Ok(Self { name, source })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw template source, slot included.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute the spec text into the slot.
    pub fn render(&self, spec_text: &str) -> TestgenResult<String> {
        let mut context = Context::new();
        context.insert(SPEC_SLOT, spec_text);

        Tera::one_off(&self.source, &context, false).map_err(|e| {
            TestgenError::template(format!("rendering '{}': {}", self.name, error_chain(&e)))
        })
    }
}

/// Immutable kind → template mapping.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<SpecKind, TemplateBody>,
}

impl TemplateRegistry {
    /// Registry holding the built-in template for every kind.
    pub fn builtin() -> TestgenResult<Self> {
        BUILTIN_TEMPLATES
            .iter()
            .try_fold(Self::builder(), |builder, (kind, source)| {
                builder.register(*kind, source)
            })
            .map(TemplateRegistryBuilder::build)
    }

    pub fn builder() -> TemplateRegistryBuilder {
        TemplateRegistryBuilder::default()
    }

    /// Template registered for `kind`.
    pub fn lookup(&self, kind: SpecKind) -> TestgenResult<&TemplateBody> {
        self.templates
            .get(&kind)
            .ok_or_else(|| TestgenError::UnknownTemplateKind {
                kind: kind.to_string(),
                available: self.kinds().map(|k| k.to_string()).collect(),
            })
    }

    /// Registered kinds in a stable order.
    pub fn kinds(&self) -> impl Iterator<Item = SpecKind> + '_ {
        self.templates.keys().copied()
    }
}

/// Construction-time builder; the finished registry has no mutation API.
#[derive(Debug, Default)]
pub struct TemplateRegistryBuilder {
    templates: BTreeMap<SpecKind, TemplateBody>,
}

impl TemplateRegistryBuilder {
    /// Add (or replace) the template for `kind`.
    pub fn register(mut self, kind: SpecKind, source: &str) -> TestgenResult<Self> {
        let body = TemplateBody::new(kind.as_str(), source)?;
        self.templates.insert(kind, body);
        Ok(self)
    }

    pub fn build(self) -> TemplateRegistry {
        TemplateRegistry {
            templates: self.templates,
        }
    }
}

/// Trimmed contents of every `{{ ... }}` expression in a template source.
fn expressions(source: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                found.push(after[..end].trim_matches(|c: char| c == '-' || c.is_whitespace()));
                rest = &after[end + 2..];
            }
            None => break,
        }
    }

    found
}

/// Flatten a tera error and its causes into one line.
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
