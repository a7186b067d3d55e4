//! Optional `testgen.toml` configuration.
//!
//! ```toml
//! [backend]
//! provider = "ollama"
//! model = "llama3.1"
//! max_tokens = 2048
//! timeout_secs = 300
//! base_url = "http://gpu-box:11434"
//!
//! [output]
//! dir = "tests/generated"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use testgen_core::{TestgenError, TestgenResult};
use testgen_llm::{BackendConfig, Provider};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "testgen.toml";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub backend: BackendSection,
    pub output: OutputSection,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendSection {
    pub provider: Option<Provider>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub dir: Option<PathBuf>,
}

/// Backend values given on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct BackendOverrides {
    pub provider: Option<Provider>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub base_url: Option<String>,
}

impl FileConfig {
    /// Load the explicit file, or the first of `./testgen.toml` and
    /// `<config_dir>/testgen/config.toml` that exists.
    ///
    /// An explicit path that cannot be read is an error; missing implicit
    /// files just mean defaults.
    pub fn discover(explicit: Option<&Path>) -> TestgenResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidates = [
            Some(PathBuf::from(CONFIG_FILE_NAME)),
            dirs::config_dir().map(|dir| dir.join("testgen").join("config.toml")),
        ];

        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                return Self::load(&path);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load(path: &Path) -> TestgenResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| TestgenError::io(path, e))?;
        let config = Self::parse(&text)
            .map_err(|e| TestgenError::config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Merge with overrides; anything unset falls back to provider defaults.
    pub fn resolve_backend(&self, overrides: &BackendOverrides) -> BackendConfig {
        let file = &self.backend;
        let provider = overrides.provider.or(file.provider).unwrap_or_default();
        let defaults = BackendConfig::for_provider(provider);

        BackendConfig {
            provider,
            model: overrides
                .model
                .clone()
                .or_else(|| file.model.clone())
                .unwrap_or(defaults.model),
            max_tokens: overrides
                .max_tokens
                .or(file.max_tokens)
                .unwrap_or(defaults.max_tokens),
            timeout: overrides
                .timeout_secs
                .or(file.timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            base_url: overrides.base_url.clone().or_else(|| file.base_url.clone()),
        }
    }

    /// Directory for `test_<stem>.py` when no `--output` is given.
    pub fn output_dir(&self) -> PathBuf {
        self.output
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(testgen_core::persist::DEFAULT_OUTPUT_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[backend]
provider = "ollama"
model = "codellama"
timeout_secs = 300

[output]
dir = "tests/generated"
"#;

    #[test]
    fn test_parse_sample() {
        let config = FileConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.backend.provider, Some(Provider::Ollama));
        assert_eq!(config.backend.model.as_deref(), Some("codellama"));
        assert_eq!(config.backend.max_tokens, None);
        assert_eq!(config.output_dir(), PathBuf::from("tests/generated"));
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(FileConfig::parse("").unwrap(), FileConfig::default());
        assert_eq!(FileConfig::default().output_dir(), PathBuf::from("generated_tests"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(FileConfig::parse("[backend]\nmodle = \"x\"\n").is_err());
        assert!(FileConfig::parse("[backend]\nprovider = \"openai\"\n").is_err());
    }

    #[test]
    fn test_defaults_without_file_or_overrides() {
        let resolved = FileConfig::default().resolve_backend(&BackendOverrides::default());
        assert_eq!(resolved, BackendConfig::default());
    }

    #[test]
    fn test_file_values_used() {
        let config = FileConfig::parse(SAMPLE).unwrap();
        let resolved = config.resolve_backend(&BackendOverrides::default());
        assert_eq!(resolved.provider, Provider::Ollama);
        assert_eq!(resolved.model, "codellama");
        assert_eq!(resolved.max_tokens, 4096);
        assert_eq!(resolved.timeout, Duration::from_secs(300));
        assert_eq!(resolved.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_overrides_win_over_file() {
        let config = FileConfig::parse(SAMPLE).unwrap();
        let overrides = BackendOverrides {
            model: Some("llama3.1:70b".to_string()),
            max_tokens: Some(1024),
            base_url: Some("http://gpu-box:11434".to_string()),
            ..Default::default()
        };
        let resolved = config.resolve_backend(&overrides);
        assert_eq!(resolved.provider, Provider::Ollama);
        assert_eq!(resolved.model, "llama3.1:70b");
        assert_eq!(resolved.max_tokens, 1024);
        assert_eq!(resolved.base_url(), "http://gpu-box:11434");
    }

    #[test]
    fn test_provider_override_picks_its_default_model() {
        let overrides = BackendOverrides {
            provider: Some(Provider::Ollama),
            ..Default::default()
        };
        let resolved = FileConfig::default().resolve_backend(&overrides);
        assert_eq!(resolved.model, "llama3.1");
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = FileConfig::discover(Some(&path)).unwrap();
        assert_eq!(config.backend.model.as_deref(), Some("codellama"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::discover(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, TestgenError::Io { .. }));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[backend\n").unwrap();

        let err = FileConfig::load(&path).unwrap_err();
        assert!(matches!(err, TestgenError::Config(_)));
    }
}
