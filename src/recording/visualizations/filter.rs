//! Digital Butterworth low-pass filter.
//!
//! The coefficient pair is designed once at startup from the cutoff
//! frequency, sample rate, and filter order, then applied per frame to the
//! windowed waveform. The design follows the classic recipe: analog
//! Butterworth poles, bilinear transform, unity gain at DC.

use anyhow::{anyhow, Result};
use rustfft::num_complex::Complex;
use std::f64::consts::PI;

/// Transfer function coefficients for an IIR low-pass filter.
///
/// `b` holds the numerator and `a` the denominator, both in descending
/// powers of z, with `a[0]` normalized to 1.
#[derive(Debug, Clone)]
pub struct FilterCoefficients {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}

/// Designs a digital Butterworth low-pass filter.
///
/// # Arguments
/// * `cutoff_hz` - Cutoff frequency in Hz (must be below Nyquist)
/// * `sample_rate` - Sample rate in Hz
/// * `order` - Filter order (number of poles)
///
/// # Errors
/// - If the order is zero
/// - If the cutoff is not strictly between 0 and the Nyquist frequency
pub fn design_low_pass(cutoff_hz: f64, sample_rate: u32, order: usize) -> Result<FilterCoefficients> {
    if order == 0 {
        return Err(anyhow!("Filter order must be at least 1"));
    }
    let fs = sample_rate as f64;
    let nyquist = fs / 2.0;
    if !(cutoff_hz > 0.0 && cutoff_hz < nyquist) {
        return Err(anyhow!(
            "Cutoff {cutoff_hz} Hz must lie between 0 and the Nyquist frequency {nyquist} Hz"
        ));
    }

    // Pre-warp the cutoff so the digital response hits it exactly
    let warped = 2.0 * fs * (PI * cutoff_hz / fs).tan();

    // Left-half-plane poles of the analog prototype, scaled to the cutoff
    let analog_poles: Vec<Complex<f64>> = (0..order)
        .map(|k| {
            let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
            Complex::new(theta.cos(), theta.sin()) * warped
        })
        .collect();

    // Bilinear transform maps each analog pole into the z-plane; the
    // low-pass numerator picks up `order` zeros at z = -1
    let fs2 = 2.0 * fs;
    let digital_poles: Vec<Complex<f64>> = analog_poles
        .iter()
        .map(|s| (Complex::new(fs2, 0.0) + s) / (Complex::new(fs2, 0.0) - s))
        .collect();

    let a: Vec<f64> = poly_from_roots(&digital_poles)
        .into_iter()
        .map(|c| c.re)
        .collect();
    let mut b: Vec<f64> = binomial_row(order);

    // Scale the numerator for unity gain at DC (z = 1)
    let a_sum: f64 = a.iter().sum();
    let b_sum: f64 = b.iter().sum();
    let gain = a_sum / b_sum;
    for coeff in &mut b {
        *coeff *= gain;
    }

    Ok(FilterCoefficients { b, a })
}

/// Applies the filter to a signal with zero initial state.
///
/// Direct form II transposed, matching the per-frame behavior of the
/// visualization loop: every frame starts from rest.
pub fn apply(coeffs: &FilterCoefficients, input: &[f64]) -> Vec<f64> {
    let n = coeffs.a.len().max(coeffs.b.len());
    let mut b = coeffs.b.clone();
    let mut a = coeffs.a.clone();
    b.resize(n, 0.0);
    a.resize(n, 0.0);

    let mut state = vec![0.0f64; n - 1];
    let mut output = Vec::with_capacity(input.len());

    for &x in input {
        let y = b[0] * x + state.first().copied().unwrap_or(0.0);
        for i in 0..state.len() {
            let carry = state.get(i + 1).copied().unwrap_or(0.0);
            state[i] = b[i + 1] * x + carry - a[i + 1] * y;
        }
        output.push(y);
    }

    output
}

/// Expands a monic polynomial from its roots, coefficients in descending powers.
fn poly_from_roots(roots: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut coeffs = vec![Complex::new(1.0, 0.0)];
    for &root in roots {
        coeffs.push(Complex::new(0.0, 0.0));
        for i in (1..coeffs.len()).rev() {
            let prev = coeffs[i - 1];
            coeffs[i] -= root * prev;
        }
    }
    coeffs
}

/// Binomial coefficients of (z + 1)^order as floats.
fn binomial_row(order: usize) -> Vec<f64> {
    let mut row = vec![1.0f64];
    for _ in 0..order {
        let mut next = vec![1.0f64; row.len() + 1];
        for i in 1..row.len() {
            next[i] = row[i - 1] + row[i];
        }
        row = next;
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq_hz: f64, sample_rate: u32, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq_hz * i as f64 / sample_rate as f64).sin())
            .collect()
    }

    fn rms(signal: &[f64]) -> f64 {
        (signal.iter().map(|x| x * x).sum::<f64>() / signal.len() as f64).sqrt()
    }

    #[test]
    fn unity_gain_at_dc() {
        let coeffs = design_low_pass(500.0, 44100, 5).unwrap();
        let b_sum: f64 = coeffs.b.iter().sum();
        let a_sum: f64 = coeffs.a.iter().sum();
        assert!((b_sum / a_sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn coefficient_lengths_match_order() {
        let coeffs = design_low_pass(500.0, 44100, 5).unwrap();
        assert_eq!(coeffs.b.len(), 6);
        assert_eq!(coeffs.a.len(), 6);
        assert!((coeffs.a[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn attenuates_tone_above_cutoff() {
        let sample_rate = 44100;
        let coeffs = design_low_pass(500.0, sample_rate, 5).unwrap();
        let input = tone(5000.0, sample_rate, sample_rate as usize);
        let output = apply(&coeffs, &input);

        // Skip the transient, measure steady state
        let settled = &output[output.len() / 2..];
        let ratio = rms(settled) / rms(&input);
        assert!(ratio < 0.05, "expected strong attenuation, got ratio {ratio}");
    }

    #[test]
    fn passes_tone_below_cutoff() {
        let sample_rate = 44100;
        let coeffs = design_low_pass(500.0, sample_rate, 5).unwrap();
        let input = tone(100.0, sample_rate, sample_rate as usize);
        let output = apply(&coeffs, &input);

        let settled = &output[output.len() / 2..];
        let ratio = rms(settled) / rms(&input[input.len() / 2..]);
        assert!(
            (0.8..1.2).contains(&ratio),
            "expected near-unity passband, got ratio {ratio}"
        );
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(design_low_pass(500.0, 44100, 0).is_err());
        assert!(design_low_pass(0.0, 44100, 5).is_err());
        assert!(design_low_pass(30000.0, 44100, 5).is_err());
    }

    #[test]
    fn output_stays_finite() {
        let coeffs = design_low_pass(500.0, 44100, 5).unwrap();
        let input = tone(440.0, 44100, 4096);
        let output = apply(&coeffs, &input);
        assert_eq!(output.len(), input.len());
        assert!(output.iter().all(|y| y.is_finite()));
    }
}
