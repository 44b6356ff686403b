//! Configuration file handling.
//!
//! Loads the application configuration from a TOML file in the user's
//! config directory, creating it with defaults on first run. Every field
//! carries a serde default so partial files keep working.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Visualization shown while recording.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationType {
    /// Low-pass filtered waveform, amplitude over time
    #[default]
    Waveform,
    /// Frequency spectrum of the live frames
    Spectrum,
}

impl std::fmt::Display for VisualizationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waveform => write!(f, "waveform"),
            Self::Spectrum => write!(f, "spectrum"),
        }
    }
}

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Input device: "default", a numeric index, or a device name
    /// (see `parrot list-devices`)
    #[serde(default = "default_device")]
    pub device: String,
    /// Requested sample rate in Hz (actual may differ by device)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Fixed length of each recorded clip in seconds
    #[serde(default = "default_clip_duration")]
    pub clip_duration_secs: f64,
    /// Clip filename, overwritten each session
    #[serde(default = "default_clip_filename")]
    pub clip_filename: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            sample_rate: default_sample_rate(),
            clip_duration_secs: default_clip_duration(),
            clip_filename: default_clip_filename(),
        }
    }
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_clip_duration() -> f64 {
    10.0
}

fn default_clip_filename() -> String {
    "clip0.wav".to_string()
}

/// Visualization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizerConfig {
    /// Samples per visualization frame
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,
    /// Low-pass cutoff frequency in Hz
    #[serde(default = "default_cutoff_hz")]
    pub cutoff_hz: f64,
    /// Butterworth filter order
    #[serde(default = "default_filter_order")]
    pub filter_order: usize,
    /// "waveform" (filtered amplitude) or "spectrum" (FFT view)
    #[serde(default)]
    pub visualization: VisualizationType,
    /// Reference level in dBFS for 100% on the level meter
    #[serde(default = "default_reference_level_db")]
    pub reference_level_db: i8,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            frame_size: default_frame_size(),
            cutoff_hz: default_cutoff_hz(),
            filter_order: default_filter_order(),
            visualization: VisualizationType::default(),
            reference_level_db: default_reference_level_db(),
        }
    }
}

fn default_frame_size() -> usize {
    1024
}

fn default_cutoff_hz() -> f64 {
    500.0
}

fn default_filter_order() -> usize {
    5
}

fn default_reference_level_db() -> i8 {
    -20
}

/// Recognition model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier on the inference endpoint, or "fixture:<text>"
    /// to skip the network and report a canned transcript
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Base inference URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Environment variable holding the API token (optional at runtime)
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_model_id() -> String {
    "openai/whisper-small".to_string()
}

fn default_endpoint() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

fn default_api_key_env() -> String {
    "HF_API_TOKEN".to_string()
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub visualizer: VisualizerConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

impl AppConfig {
    /// Loads the configuration, writing a default file on first run.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If an existing file cannot be read or is malformed TOML
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            let config = AppConfig::default();
            config.save()?;
            tracing::info!("Created default configuration at {}", path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| anyhow!("Failed to read {}: {e}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| anyhow!("Malformed config {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Writes the configuration to the config file.
    ///
    /// # Errors
    /// - If the file cannot be written
    pub fn save(&self) -> Result<()> {
        let path = config_path()?;
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        tracing::debug!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Resolves where the current clip lives: beside the executable when
    /// that directory is known, else under the working directory.
    pub fn clip_path(&self) -> PathBuf {
        let dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        dir.join(&self.audio.clip_filename)
    }
}

/// Path to the config file, creating the parent directory if needed.
fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    let path = home.join(".config").join("parrot").join("parrot.toml");
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.audio.clip_duration_secs, 10.0);
        assert_eq!(config.audio.clip_filename, "clip0.wav");
        assert_eq!(config.visualizer.frame_size, 1024);
        assert_eq!(config.visualizer.cutoff_hz, 500.0);
        assert_eq!(config.visualizer.filter_order, 5);
        assert_eq!(config.visualizer.visualization, VisualizationType::Waveform);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [audio]
            clip_duration_secs = 5.0

            [visualizer]
            visualization = "spectrum"
            "#,
        )
        .unwrap();
        assert_eq!(config.audio.clip_duration_secs, 5.0);
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.visualizer.visualization, VisualizationType::Spectrum);
        assert_eq!(config.visualizer.cutoff_hz, 500.0);
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = AppConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.model.model_id, config.model.model_id);
        assert_eq!(parsed.visualizer.frame_size, config.visualizer.frame_size);
    }

    #[test]
    fn clip_path_uses_configured_filename() {
        let config = AppConfig::default();
        assert!(config.clip_path().ends_with("clip0.wav"));
    }
}
