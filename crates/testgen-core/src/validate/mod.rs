//! Sanitizing and validating model output.
//!
//! Raw output is stripped of code-fence markup and then parsed as a whole
//! document. Failures come back as a located diagnostic, never as an error.

pub mod grammar;

use std::fmt;

use serde::Serialize;
use tracing::debug;

pub use grammar::{Grammar, PythonGrammar};

use crate::error::{TestgenError, TestgenResult};

/// Code fence delimiter.
pub const FENCE: &str = "```";

/// Where and why generated code failed to parse. Line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }

    /// Build a diagnostic from a byte offset into `source`.
    pub fn at_offset(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }

        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;

        Self::new(line, column, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}: {}", self.line, self.column, self.message)
    }
}

/// Outcome of validating generated output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedArtifact {
    /// Stripped code that parsed.
    Valid { code: String },
    /// The code did not parse.
    Invalid { diagnostic: Diagnostic },
}

impl ValidatedArtifact {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Valid { code } => Some(code),
            Self::Invalid { .. } => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid { diagnostic } => Some(diagnostic),
        }
    }

    /// Turn an invalid artifact into a `ValidationFailure` error.
    pub fn into_result(self) -> TestgenResult<String> {
        match self {
            Self::Valid { code } => Ok(code),
            Self::Invalid { diagnostic } => Err(TestgenError::ValidationFailure(diagnostic)),
        }
    }
}

/// Strip one optional opening fence line (tagged, then bare) and a closing
/// fence.
///
/// The whole opening line goes, so fence metadata such as
/// `title="test_x.py"` never reaches the code.
pub fn strip_fences(raw: &str) -> &str {
    let mut code = raw.trim();

    if let Some(rest) = code.strip_prefix(FENCE) {
        code = match rest.split_once('\n') {
            Some((opening, body)) if !opening.trim().is_empty() => {
                // A tagged marker may be followed by a stray bare one.
                strip_bare_marker(body).unwrap_or(body)
            }
            Some((_, body)) => body,
            None if is_language_tag(rest.trim()) => "",
            None => rest,
        };
    }

    if let Some(body) = code.strip_suffix(FENCE) {
        code = body;
    }

    code.trim()
}

/// `code` without a leading line holding nothing but a fence marker.
fn strip_bare_marker(code: &str) -> Option<&str> {
    let rest = code.trim_start().strip_prefix(FENCE)?;
    match rest.split_once('\n') {
        Some((line, body)) if line.trim().is_empty() => Some(body),
        None if rest.trim().is_empty() => Some(""),
        _ => None,
    }
}

fn is_language_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '_' | '.' | '#'))
}

/// Sanitize raw model output and parse it against `grammar`.
pub fn validate(raw: &str, grammar: &dyn Grammar) -> ValidatedArtifact {
    let code = strip_fences(raw);

    if code.is_empty() {
        return ValidatedArtifact::Invalid {
            diagnostic: Diagnostic::new(1, 1, "empty document: no code left after stripping fences"),
        };
    }

    match grammar.check(code) {
        Ok(()) => {
            debug!(grammar = grammar.name(), lines = code.lines().count(), "Generated code parsed");
            ValidatedArtifact::Valid {
                code: code.to_string(),
            }
        }
        Err(diagnostic) => {
            debug!(grammar = grammar.name(), %diagnostic, "Generated code failed to parse");
            ValidatedArtifact::Invalid { diagnostic }
        }
    }
}

/// [`validate`] against the Python grammar.
pub fn validate_python(raw: &str) -> ValidatedArtifact {
    validate(raw, &PythonGrammar)
}
