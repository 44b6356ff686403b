//! Frequency spectrum view of the live frames.
//!
//! Alternative to the filtered waveform: shows energy distribution across
//! the speech band instead of amplitude over time.

use rustfft::{num_complex::Complex, FftPlanner};

/// Lower edge of the displayed band in Hz.
const BAND_LOW_HZ: f32 = 80.0;
/// Upper edge of the displayed band in Hz.
const BAND_HIGH_HZ: f32 = 4000.0;
/// Magnitudes below this many dB under full scale are drawn as silence.
const FLOOR_DB: f32 = -60.0;

/// Stateful spectrum view with an internal FFT planner and smoothed bins.
pub struct SpectrumView {
    planner: FftPlanner<f32>,
    bins: Vec<u64>,
}

impl SpectrumView {
    pub fn new(width: usize) -> Self {
        Self {
            planner: FftPlanner::new(),
            bins: vec![0; width],
        }
    }

    /// Feeds one frame of samples, smoothing against the previous bins.
    pub fn update(&mut self, frame: &[i16], sample_rate: u32) {
        if frame.is_empty() || self.bins.is_empty() {
            return;
        }

        let fft_size = frame.len().next_power_of_two();
        let mut buffer: Vec<Complex<f32>> = frame
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                // Hann window keeps bin leakage down
                let w = 0.5
                    * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / frame.len() as f32).cos());
                Complex::new(s as f32 / 32768.0 * w, 0.0)
            })
            .collect();
        buffer.resize(fft_size, Complex::new(0.0, 0.0));

        self.planner.plan_fft_forward(fft_size).process(&mut buffer);

        let hz_per_bin = sample_rate as f32 / fft_size as f32;
        let first = (BAND_LOW_HZ / hz_per_bin) as usize;
        let last = ((BAND_HIGH_HZ / hz_per_bin) as usize).min(fft_size / 2);

        let band = last.saturating_sub(first).max(1);
        let width = self.bins.len();
        for (column, bin) in self.bins.iter_mut().enumerate() {
            let lo = first + column * band / width;
            let hi = (first + (column + 1) * band / width).max(lo + 1).min(last.max(lo + 1));

            let mut magnitude = 0.0f32;
            for value in &buffer[lo..hi.min(buffer.len() / 2).max(lo)] {
                magnitude = magnitude.max(value.norm());
            }

            let db = if magnitude > 1e-10 {
                20.0 * magnitude.log10()
            } else {
                FLOOR_DB
            };
            let level = ((db - FLOOR_DB) / -FLOOR_DB * 100.0).clamp(0.0, 100.0) as u64;

            // Smooth toward the new value so the display does not flicker
            *bin = (*bin + level) / 2;
        }
    }

    /// Resizes the view to a new terminal width, clearing stale bins.
    pub fn resize(&mut self, width: usize) {
        if width != self.bins.len() {
            self.bins = vec![0; width];
        }
    }

    pub fn bins(&self) -> &[u64] {
        &self.bins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone_frame(freq_hz: f32, sample_rate: u32, len: usize, amplitude: f32) -> Vec<i16> {
        (0..len)
            .map(|i| {
                let x = (2.0 * PI * freq_hz * i as f32 / sample_rate as f32).sin();
                (x * amplitude * 32767.0) as i16
            })
            .collect()
    }

    #[test]
    fn tone_lights_up_some_bins() {
        let mut view = SpectrumView::new(40);
        let frame = tone_frame(440.0, 44100, 1024, 0.9);
        view.update(&frame, 44100);
        view.update(&frame, 44100);
        assert!(view.bins().iter().any(|&b| b > 20));
    }

    #[test]
    fn silence_stays_dark() {
        let mut view = SpectrumView::new(40);
        view.update(&vec![0i16; 1024], 44100);
        assert!(view.bins().iter().all(|&b| b < 5));
    }

    #[test]
    fn resize_changes_bin_count() {
        let mut view = SpectrumView::new(40);
        view.resize(80);
        assert_eq!(view.bins().len(), 80);
    }
}
