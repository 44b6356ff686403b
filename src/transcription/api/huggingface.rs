//! Hugging Face style inference endpoint.
//!
//! Posts the raw audio bytes to `<endpoint>/<model_id>` and expects a JSON
//! body with a `text` field back. Authentication is an optional bearer
//! token; without one, public endpoints still answer at a lower rate limit.

use anyhow::{anyhow, Result};

use super::{RecognizerConfig, TranscriptionResponse};

/// Sends audio bytes to the inference endpoint and parses the reply.
pub(super) async fn infer(
    config: &RecognizerConfig,
    audio: Vec<u8>,
) -> Result<TranscriptionResponse> {
    let url = format!(
        "{}/{}",
        config.endpoint.trim_end_matches('/'),
        config.model_id
    );

    tracing::debug!(
        "Inference call: POST {} ({} bytes, auth: {})",
        url,
        audio.len(),
        if config.api_key.is_some() { "bearer" } else { "none" }
    );

    let client = reqwest::Client::new();
    let mut request = client
        .post(&url)
        .header(reqwest::header::CONTENT_TYPE, "audio/wav")
        .body(audio);
    if let Some(key) = &config.api_key {
        request = request.bearer_auth(key);
    }

    let response = match request.send().await {
        Ok(resp) => resp,
        Err(e) => {
            let message = if e.is_connect() {
                "Failed to connect to the inference endpoint. Check your internet connection."
                    .to_string()
            } else if e.is_timeout() {
                "Request to the inference endpoint timed out.".to_string()
            } else {
                format!("Inference network error: {e}")
            };
            return Err(anyhow!(message));
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let human_readable = match status.as_u16() {
            401 => "Inference API token is invalid or expired.".to_string(),
            403 => "You don't have permission to use this model.".to_string(),
            429 => "Too many requests to the inference endpoint. Please wait and try again."
                .to_string(),
            503 => format!(
                "The model is still loading on the inference endpoint. Try again shortly. ({error_body})"
            ),
            500 | 502 | 504 => {
                "The inference endpoint is experiencing issues. Please try again later.".to_string()
            }
            _ => format!("Inference API error (status {status}): {error_body}"),
        };

        return Err(anyhow!(human_readable));
    }

    let transcription: TranscriptionResponse = response
        .json()
        .await
        .map_err(|e| anyhow!("Failed to parse inference response: {e}"))?;

    tracing::debug!(
        "Inference response: {} characters of text",
        transcription.text.len()
    );

    Ok(transcription)
}
