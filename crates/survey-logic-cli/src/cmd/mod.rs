pub mod check;
pub mod replay;
pub mod schema;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use survey_logic::Survey;

pub fn load_survey(path: &Path) -> Result<Survey> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read survey {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse survey {}", path.display()))
}

/// Writes `payload` to `path`, creating missing parent directories.
pub fn write_output(path: &Path, payload: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent {}", parent.display()))?;
    }
    fs::write(path, payload).with_context(|| format!("failed to write {}", path.display()))
}

pub(crate) fn is_cbor(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("cbor"))
}
