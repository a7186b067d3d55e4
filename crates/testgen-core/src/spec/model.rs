//! Specification domain models.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TestgenError;

/// Extensions dropped when deriving an output name from a spec file.
const STEM_EXTENSIONS: &[&str] = &["yaml", "yml", "json", "toml", "txt", "spec", "md"];

/// Template category a spec is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecKind {
    /// Free-text function description.
    Generic,
    /// Hardware register definition (top-level `register` key).
    Register,
    /// Bus/peripheral interface definition (top-level `interface` key).
    Interface,
}

impl SpecKind {
    /// Every kind, in registry order.
    pub const ALL: [SpecKind; 3] = [Self::Generic, Self::Register, Self::Interface];

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Register => "register",
            Self::Interface => "interface",
        }
    }
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecKind {
    type Err = TestgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| TestgenError::UnknownTemplateKind {
                kind: s.to_string(),
                available: Self::ALL.iter().map(|k| k.as_str().to_string()).collect(),
            })
    }
}

/// Where a spec is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    Path(PathBuf),
    Inline(String),
}

/// Where a loaded spec came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecOrigin {
    File(PathBuf),
    Inline,
}

/// A loaded specification. Immutable once built by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spec {
    text: String,
    kind: SpecKind,
    origin: SpecOrigin,
}

impl Spec {
    pub(crate) fn new(text: String, kind: SpecKind, origin: SpecOrigin) -> Self {
        Self { text, kind, origin }
    }

    /// Text handed to the prompt template.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> SpecKind {
        self.kind
    }

    pub fn origin(&self) -> &SpecOrigin {
        &self.origin
    }

    /// Base name of the spec file without its spec extension.
    ///
    /// Returns `None` for inline specs.
    pub fn stem(&self) -> Option<String> {
        match &self.origin {
            SpecOrigin::File(path) => Some(file_stem(path)),
            SpecOrigin::Inline => None,
        }
    }
}

fn file_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && STEM_EXTENSIONS.contains(&ext.to_lowercase().as_str()) =>
        {
            stem.to_string()
        }
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip_names() {
        for kind in SpecKind::ALL {
            assert_eq!(kind.as_str().parse::<SpecKind>().unwrap(), kind);
        }
        assert_eq!(" Register ".parse::<SpecKind>().unwrap(), SpecKind::Register);
    }

    #[test]
    fn test_unknown_kind_lists_available() {
        let err = "timing".parse::<SpecKind>().unwrap_err();
        match err {
            TestgenError::UnknownTemplateKind { kind, available } => {
                assert_eq!(kind, "timing");
                assert_eq!(available, vec!["generic", "register", "interface"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stem_strips_spec_extension() {
        let spec = Spec::new(
            String::new(),
            SpecKind::Register,
            SpecOrigin::File(PathBuf::from("specs/ctrl_status.yaml")),
        );
        assert_eq!(spec.stem().as_deref(), Some("ctrl_status"));

        let spec = Spec::new(
            String::new(),
            SpecKind::Generic,
            SpecOrigin::File(PathBuf::from("checksum.txt")),
        );
        assert_eq!(spec.stem().as_deref(), Some("checksum"));
    }

    #[test]
    fn test_stem_keeps_unknown_extension() {
        let spec = Spec::new(
            String::new(),
            SpecKind::Generic,
            SpecOrigin::File(PathBuf::from("notes/i2c.v2")),
        );
        assert_eq!(spec.stem().as_deref(), Some("i2c.v2"));
    }

    #[test]
    fn test_inline_has_no_stem() {
        let spec = Spec::new("f(x)".into(), SpecKind::Generic, SpecOrigin::Inline);
        assert!(spec.stem().is_none());
    }
}
