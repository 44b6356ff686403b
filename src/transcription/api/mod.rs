//! Recognition backends.
//!
//! `Remote` posts the clip bytes to an inference endpoint and parses the
//! JSON reply. `Fixture` returns a canned transcript so the rest of the
//! pipeline can run without a model or network.

mod huggingface;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

/// Connection settings for the remote recognition endpoint.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// Model identifier appended to the endpoint, e.g. "openai/whisper-small"
    pub model_id: String,
    /// Base inference URL
    pub endpoint: String,
    /// Bearer token, if the endpoint requires one
    pub api_key: Option<String>,
}

/// A speech recognition backend: audio bytes in, text out.
#[derive(Debug, Clone)]
pub enum RecognizerBackend {
    /// Remote inference endpoint
    Remote(RecognizerConfig),
    /// Canned transcript, for tests and offline runs
    Fixture(String),
}

/// Result object produced by a recognition call.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionResponse {
    /// The transcribed text
    pub text: String,
}

impl RecognizerBackend {
    /// Runs recognition on raw audio bytes.
    ///
    /// # Errors
    /// - If the network request fails or the endpoint returns an error status
    /// - If the response cannot be parsed
    pub async fn infer(&self, audio: Vec<u8>) -> Result<TranscriptionResponse> {
        match self {
            RecognizerBackend::Remote(config) => huggingface::infer(config, audio).await,
            RecognizerBackend::Fixture(text) => Ok(TranscriptionResponse { text: text.clone() }),
        }
    }
}

/// Transcribes an audio file: read bytes, call the backend, trim the text.
///
/// # Errors
/// - If the audio file cannot be read from disk
/// - If the backend call fails
pub async fn transcribe(backend: &RecognizerBackend, audio_path: &Path) -> Result<String> {
    let audio = std::fs::read(audio_path)
        .map_err(|e| anyhow!("Failed to read audio file {}: {e}", audio_path.display()))?;

    tracing::info!(
        "Transcribing {} ({} bytes)",
        audio_path.display(),
        audio.len()
    );

    let response = backend.infer(audio).await?;
    Ok(response.text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_clip() -> PathBuf {
        let path = std::env::temp_dir().join(format!("parrot_fixture_{}.wav", std::process::id()));
        std::fs::write(&path, b"RIFF....WAVE").unwrap();
        path
    }

    #[tokio::test]
    async fn fixture_backend_returns_trimmed_text() {
        let path = fixture_clip();
        let backend = RecognizerBackend::Fixture("  hello from the clip \n".to_string());

        let text = transcribe(&backend, &path).await.unwrap();
        assert_eq!(text, "hello from the clip");

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let backend = RecognizerBackend::Fixture("unused".to_string());
        let missing = std::env::temp_dir().join("parrot_does_not_exist.wav");

        let result = transcribe(&backend, &missing).await;
        assert!(result.is_err());
    }
}
