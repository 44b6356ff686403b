//! Application configuration.
//!
//! TOML file in the user's config directory, created with defaults on
//! first run. The API token is read from the environment, never stored.

pub mod file;

pub use file::{AppConfig, AudioConfig, ModelConfig, VisualizationType, VisualizerConfig};
