//! Writing the final manifest JSON, subject to the done hook.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::TOOL_NAME;
use crate::hooks::RevisionHooks;
use crate::models::ManifestMap;

/// Run the done hook and write the manifest JSON it returns.
///
/// Returns `true` when a file was written. A hook returning `false` skips
/// persistence entirely; any return value other than `false` or an object is
/// a fatal configuration error.
pub fn persist_manifest<H: RevisionHooks>(
    hooks: &H,
    manifest_file: &Path,
    manifest: &ManifestMap,
    verbose: bool,
) -> Result<bool> {
    let payload = match hooks.done(manifest_file, manifest) {
        Value::Bool(false) => return Ok(false),
        Value::Object(map) => Value::Object(map),
        other => {
            return Err(anyhow!(
                "[{TOOL_NAME}] the done hook must return either false or a manifest object, got {other}"
            ));
        }
    };

    let json = serde_json::to_string_pretty(&payload).with_context(|| {
        format!("failed to serialize manifest for {}", manifest_file.display())
    })?;
    write_json_file(manifest_file, &json)?;

    if verbose {
        println!(
            "[{TOOL_NAME}] saved manifest file '{}':",
            manifest_file.display()
        );
        println!("{json}");
    }

    Ok(true)
}

/// Write JSON text to a file, creating parent directories as needed.
pub fn write_json_file(file: &Path, json: &str) -> Result<()> {
    if let Some(parent) = file.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(file, json).with_context(|| format!("failed to write {}", file.display()))
}
