//! Source discovery
//!
//! A batch run takes a directory whose immediate subdirectories each hold
//! one source's log file. Discovery is sorted by name so runs are
//! reproducible regardless of filesystem iteration order. Finding nothing
//! is an explicit, non-fatal outcome for the caller to report.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// One discovered source: display name and log file path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// `<subdirectory>/<log file name>`
    pub name: String,
    pub path: PathBuf,
}

/// Find `<subdir>/<log_file_name>` under every immediate subdirectory
pub fn discover_sources(input_dir: &Path, log_file_name: &str) -> Result<Vec<SourceEntry>> {
    if !input_dir.is_dir() {
        bail!("input directory does not exist: {}", input_dir.display());
    }

    let mut entries = Vec::new();
    let dir = std::fs::read_dir(input_dir)
        .with_context(|| format!("failed to list {}", input_dir.display()))?;
    for entry in dir {
        let entry = entry.with_context(|| format!("failed to list {}", input_dir.display()))?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let path = entry.path().join(log_file_name);
        if path.is_file() {
            let name = format!("{}/{log_file_name}", entry.file_name().to_string_lossy());
            entries.push(SourceEntry { name, path });
        }
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
