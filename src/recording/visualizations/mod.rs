//! Visualization pipelines for the recording display.
//!
//! `waveform` is the default view: each frame is windowed, low-pass
//! filtered, and plotted as amplitude. `spectrum` is the FFT alternative.

pub mod filter;
pub mod spectrum;
pub mod waveform;

pub use spectrum::SpectrumView;
pub use waveform::{display_bins, WaveformPipeline};
