//! Specification loading and kind detection.
//!
//! Structured files (YAML, JSON, TOML) are parsed and classified by their
//! top-level keys. Only recognised documents are re-encoded before prompting;
//! everything else reaches the template exactly as it was written.

pub mod model;

use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{TestgenError, TestgenResult};
use model::{Spec, SpecKind, SpecOrigin, SpecSource};

/// Top-level key marking a register definition.
pub const REGISTER_KEY: &str = "register";

/// Top-level key marking an interface definition.
pub const INTERFACE_KEY: &str = "interface";

/// Structured formats recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredFormat {
    Yaml,
    Json,
    Toml,
}

impl StructuredFormat {
    /// Detect a structured format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yaml => "YAML",
            Self::Json => "JSON",
            Self::Toml => "TOML",
        }
    }
}

/// Load a spec from a file or literal text.
///
/// An explicit kind always wins over detection; the text is whatever the
/// source produced.
pub fn load(source: &SpecSource, explicit_kind: Option<SpecKind>) -> TestgenResult<Spec> {
    let spec = match source {
        SpecSource::Path(path) => load_file(path)?,
        SpecSource::Inline(text) => Spec::new(text.clone(), SpecKind::Generic, SpecOrigin::Inline),
    };

    match explicit_kind {
        Some(kind) if kind != spec.kind() => {
            debug!(detected = %spec.kind(), requested = %kind, "Template kind overridden");
            Ok(Spec::new(spec.text().to_string(), kind, spec.origin().clone()))
        }
        _ => Ok(spec),
    }
}

/// Read and classify a spec file.
pub fn load_file(path: &Path) -> TestgenResult<Spec> {
    let content = std::fs::read_to_string(path).map_err(|e| TestgenError::io(path, e))?;

    let (text, kind) = match StructuredFormat::from_path(path) {
        Some(format) => classify(&content, format, path)?,
        None => (content, SpecKind::Generic),
    };

    debug!(path = %path.display(), kind = %kind, bytes = text.len(), "Loaded spec");

    Ok(Spec::new(text, kind, SpecOrigin::File(path.to_path_buf())))
}

/// Classify structured content and pick the text that goes into the prompt.
pub fn classify(
    content: &str,
    format: StructuredFormat,
    path: &Path,
) -> TestgenResult<(String, SpecKind)> {
    if content.trim().is_empty() {
        return Ok((content.to_string(), SpecKind::Generic));
    }

    let parsed = parse_structured(content, format, path)?;

    match detect_kind(&parsed) {
        SpecKind::Generic => Ok((content.to_string(), SpecKind::Generic)),
        kind => {
            let canonical = serde_yaml::to_string(&sort_keys(parsed)).map_err(|e| {
                TestgenError::SpecParse {
                    path: path.to_path_buf(),
                    format: format.as_str(),
                    message: e.to_string(),
                }
            })?;
            Ok((canonical, kind))
        }
    }
}

/// Kind implied by a parsed document's top-level keys.
pub fn detect_kind(value: &Value) -> SpecKind {
    match value.as_mapping() {
        Some(map) if map.contains_key(REGISTER_KEY) => SpecKind::Register,
        Some(map) if map.contains_key(INTERFACE_KEY) => SpecKind::Interface,
        _ => SpecKind::Generic,
    }
}

fn parse_structured(content: &str, format: StructuredFormat, path: &Path) -> TestgenResult<Value> {
    let parse_error = |message: String| TestgenError::SpecParse {
        path: path.to_path_buf(),
        format: format.as_str(),
        message,
    };

    match format {
        StructuredFormat::Yaml => {
            serde_yaml::from_str::<Value>(content).map_err(|e| parse_error(e.to_string()))
        }
        StructuredFormat::Json => {
            let json: serde_json::Value =
                serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?;
            serde_yaml::to_value(&json).map_err(|e| parse_error(e.to_string()))
        }
        StructuredFormat::Toml => {
            let table: toml::Value =
                toml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
            serde_yaml::to_value(&table).map_err(|e| parse_error(e.to_string()))
        }
    }
}

/// Recursively order mapping keys so re-encoded specs are stable.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut entries: Vec<(Value, Value)> = map.into_iter().collect();
            entries.sort_by_cached_key(|(key, _)| key_text(key));
            Value::Mapping(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect::<Mapping>(),
            )
        }
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(sort_keys).collect()),
        Value::Tagged(mut tagged) => {
            tagged.value = sort_keys(std::mem::take(&mut tagged.value));
            Value::Tagged(tagged)
        }
        other => other,
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other).unwrap_or_default(),
    }
}
