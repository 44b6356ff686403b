//! Transcribe a pre-recorded audio file.

use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::transcription;

/// Transcribes an existing audio file and prints the text to stdout.
///
/// # Errors
/// - If the file does not exist
/// - If transcription fails
pub async fn handle_transcribe(file: PathBuf) -> Result<()> {
    if !file.exists() {
        return Err(anyhow!("Audio file not found: {}", file.display()));
    }

    let config = AppConfig::load()?;
    let backend = super::record::recognizer_from_config(&config);

    let text = transcription::transcribe(&backend, &file).await?;
    println!("{text}");
    Ok(())
}
