//! Show recent log entries.

use anyhow::{anyhow, Result};
use std::fs;

use crate::logging;

/// Number of lines printed from the newest log file.
const TAIL_LINES: usize = 50;

/// Prints the tail of the most recent log file.
///
/// # Errors
/// - If the log directory cannot be read
pub fn handle_logs() -> Result<()> {
    let dir = logging::log_dir()?;

    let log_files: Vec<_> = fs::read_dir(&dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_string_lossy().to_string();
            if name.starts_with("parrot.log") {
                let modified = fs::metadata(&path).ok()?.modified().ok()?;
                Some((path, modified))
            } else {
                None
            }
        })
        .collect();

    let (newest, _) = log_files
        .iter()
        .max_by_key(|(_, modified)| *modified)
        .ok_or_else(|| anyhow!("No log files found in {}", dir.display()))?
        .clone();

    let content = fs::read_to_string(&newest)?;
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(TAIL_LINES);

    println!("{} (last {} lines):", newest.display(), lines.len() - start);
    println!();
    for line in &lines[start..] {
        println!("{line}");
    }

    Ok(())
}
