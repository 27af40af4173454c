use crate::report::RunResult;
use anyhow::{Context, Result};
use std::path::Path;

/// Write the run result to a JSON file
pub fn write_result(result: &RunResult, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(result)
        .context("Failed to serialize run result to JSON")?;

    std::fs::write(path, &json)
        .with_context(|| format!("Failed to write run result to {:?}", path))?;

    Ok(())
}
