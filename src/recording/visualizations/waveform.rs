//! Windowed, low-pass-filtered waveform for the live display.
//!
//! Each captured frame is normalized to ±1.0, shaped by a half-sine window,
//! and run through the Butterworth low-pass filter. The filtered frame is
//! what the recording screen plots.

use anyhow::Result;
use std::f64::consts::PI;

use super::filter::{self, FilterCoefficients};

/// Per-frame processing pipeline for the waveform view.
///
/// Holds the precomputed window and filter coefficients; both are fixed for
/// the process lifetime and cheap to clone into the visualizer worker.
#[derive(Debug, Clone)]
pub struct WaveformPipeline {
    window: Vec<f64>,
    coeffs: FilterCoefficients,
}

impl WaveformPipeline {
    /// Builds the pipeline for a fixed frame size.
    ///
    /// # Errors
    /// - If the filter design parameters are invalid
    pub fn new(frame_size: usize, cutoff_hz: f64, sample_rate: u32, order: usize) -> Result<Self> {
        let window = (0..frame_size)
            .map(|i| (i as f64 * PI / frame_size as f64).sin())
            .collect();
        let coeffs = filter::design_low_pass(cutoff_hz, sample_rate, order)?;
        Ok(Self { window, coeffs })
    }

    /// Processes one frame of i16 PCM samples into the filtered waveform.
    ///
    /// Samples are scaled to ±1.0, multiplied elementwise by the window,
    /// and filtered. The filter runs from rest on every frame.
    pub fn process(&self, frame: &[i16]) -> Vec<f64> {
        let shaped: Vec<f64> = frame
            .iter()
            .zip(&self.window)
            .map(|(&sample, &w)| sample as f64 / 32768.0 * w)
            .collect();
        filter::apply(&self.coeffs, &shaped)
    }

    /// Number of samples per frame the pipeline expects.
    pub fn frame_size(&self) -> usize {
        self.window.len()
    }
}

/// Buckets a filtered frame into `width` amplitude bins scaled 0-100.
///
/// Each bin takes the peak absolute value of its slice of the frame, which
/// keeps short bursts visible at narrow terminal widths.
pub fn display_bins(filtered: &[f64], width: usize) -> Vec<u64> {
    if width == 0 || filtered.is_empty() {
        return vec![0; width];
    }

    let mut bins = vec![0u64; width];
    for (i, bin) in bins.iter_mut().enumerate() {
        let start = i * filtered.len() / width;
        let end = (((i + 1) * filtered.len()) / width).max(start + 1);
        let peak = filtered[start..end.min(filtered.len())]
            .iter()
            .fold(0.0f64, |acc, &y| acc.max(y.abs()));
        *bin = (peak * 100.0).clamp(0.0, 100.0) as u64;
    }
    bins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_tapers_to_zero_at_edges() {
        let pipeline = WaveformPipeline::new(1024, 500.0, 44100, 5).unwrap();
        assert_eq!(pipeline.window[0], 0.0);
        assert!(pipeline.window[512] > 0.99);
        assert!(pipeline.window[1023] < 0.01);
    }

    #[test]
    fn process_preserves_frame_length() {
        let pipeline = WaveformPipeline::new(1024, 500.0, 44100, 5).unwrap();
        let frame = vec![1000i16; 1024];
        assert_eq!(pipeline.process(&frame).len(), 1024);
    }

    #[test]
    fn high_frequency_frame_comes_out_quiet() {
        let pipeline = WaveformPipeline::new(1024, 500.0, 44100, 5).unwrap();

        // Alternating full-scale samples: energy at the Nyquist frequency
        let buzz: Vec<i16> = (0..1024)
            .map(|i| if i % 2 == 0 { i16::MAX } else { i16::MIN })
            .collect();
        let filtered = pipeline.process(&buzz);
        let peak = filtered.iter().fold(0.0f64, |acc, &y| acc.max(y.abs()));
        assert!(peak < 0.05, "Nyquist buzz should be filtered out, peak {peak}");
    }

    #[test]
    fn display_bins_scale_and_clamp() {
        let flat = vec![0.5f64; 100];
        let bins = display_bins(&flat, 10);
        assert_eq!(bins.len(), 10);
        assert!(bins.iter().all(|&b| b == 50));

        let loud = vec![4.0f64; 100];
        assert!(display_bins(&loud, 4).iter().all(|&b| b == 100));
    }

    #[test]
    fn display_bins_handle_degenerate_widths() {
        assert!(display_bins(&[], 5).iter().all(|&b| b == 0));
        assert!(display_bins(&[0.5], 0).is_empty());
    }
}
