//! Writing generated tests to disk.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{TestgenError, TestgenResult};
use crate::spec::model::Spec;

/// Default directory for generated tests.
pub const DEFAULT_OUTPUT_DIR: &str = "generated_tests";

/// Extension of generated test files.
pub const OUTPUT_EXTENSION: &str = "py";

/// Default destination for a spec: `<dir>/test_<stem>.py`, or
/// `<dir>/test_output.py` for inline specs.
pub fn default_output_path(spec: &Spec, output_dir: &Path) -> PathBuf {
    let stem = spec.stem().unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("test_{stem}.{OUTPUT_EXTENSION}"))
}

/// Write `code` to `destination`, creating missing parent directories and
/// overwriting any existing file.
pub fn save(code: &str, destination: &Path) -> TestgenResult<()> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| TestgenError::io(parent, e))?;
    }

    std::fs::write(destination, code).map_err(|e| TestgenError::io(destination, e))?;

    info!(path = %destination.display(), bytes = code.len(), "Saved generated tests");
    Ok(())
}
