//! Fixed-duration clip capture.
//!
//! Records from the configured input device for a fixed number of seconds,
//! blocking the calling thread, then persists the clip as a 16-bit PCM
//! stereo WAV, overwriting any previous clip at the same path.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use hound::WavWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Channel count of the persisted clip. Mono devices are duplicated up,
/// wider devices are reduced to their first pair.
pub const CLIP_CHANNELS: u16 = 2;

/// Result of a completed clip capture.
#[derive(Debug)]
pub struct RecordedClip {
    pub path: PathBuf,
    pub sample_rate: u32,
    /// Samples per channel in the written file
    pub frames: usize,
}

/// Records a clip of the given duration and writes it to `path`.
///
/// Blocks for the full duration. The clip always holds exactly
/// `duration × rate` frames: a capture that comes up short at the tail is
/// padded with silence rather than producing a variable-length file.
///
/// # Errors
/// - If the device is unavailable or stream creation fails
/// - If the WAV file cannot be written
pub fn record_clip(
    device_name: &str,
    requested_rate: u32,
    duration_secs: f64,
    path: &Path,
) -> Result<RecordedClip> {
    let device = super::open_input_device(device_name)?;
    let device_config = device.default_input_config()?;
    let sample_rate = device_config.sample_rate().0;
    let channels = device_config.channels() as usize;

    if sample_rate != requested_rate {
        tracing::warn!(
            "Requested sample rate {}Hz but device uses {}Hz. Recording at device rate.",
            requested_rate,
            sample_rate
        );
    }

    let frame_target = clip_frame_target(duration_secs, sample_rate);
    let capture_target = frame_target * channels;

    tracing::info!(
        "Recording clip: {:.1}s at {}Hz, {} device channels -> {}",
        duration_secs,
        sample_rate,
        channels,
        path.display()
    );

    let captured: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::with_capacity(capture_target)));
    let sink = Arc::clone(&captured);

    let stream = device.build_input_stream(
        &device_config.into(),
        move |data: &[i16], _: &cpal::InputCallbackInfo| {
            let mut samples = sink.lock().unwrap();
            let remaining = capture_target.saturating_sub(samples.len());
            samples.extend_from_slice(&data[..data.len().min(remaining)]);
        },
        |err| {
            tracing::error!("Recording stream error: {}", err);
        },
        None,
    )?;

    stream.play()?;
    std::thread::sleep(Duration::from_secs_f64(duration_secs));
    drop(stream);

    let native = captured.lock().unwrap().clone();
    if native.len() < capture_target {
        tracing::debug!(
            "Capture came up {} samples short; padding with silence",
            capture_target - native.len()
        );
    }

    let mut interleaved = to_stereo(&native, channels);
    interleaved.resize(frame_target * CLIP_CHANNELS as usize, 0);

    write_clip(path, &interleaved, sample_rate)?;

    let file_size = std::fs::metadata(path)?.len();
    tracing::info!(
        "Clip saved: {} ({} frames, {} bytes)",
        path.display(),
        frame_target,
        file_size
    );

    Ok(RecordedClip {
        path: path.to_path_buf(),
        sample_rate,
        frames: frame_target,
    })
}

/// Samples per channel for a clip of the given duration.
pub fn clip_frame_target(duration_secs: f64, sample_rate: u32) -> usize {
    (duration_secs * sample_rate as f64).round() as usize
}

/// Converts interleaved device samples to interleaved stereo.
fn to_stereo(samples: &[i16], channels: usize) -> Vec<i16> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().flat_map(|&s| [s, s]).collect(),
        2 => samples.to_vec(),
        n => samples
            .chunks_exact(n)
            .flat_map(|chunk| [chunk[0], chunk[1]])
            .collect(),
    }
}

/// Writes interleaved stereo samples as a 16-bit PCM WAV.
fn write_clip(path: &Path, interleaved: &[i16], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: CLIP_CHANNELS,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)
        .map_err(|e| anyhow!("Failed to create clip file {}: {e}", path.display()))?;
    for &sample in interleaved {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_wav(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("parrot_test_{}_{}.wav", std::process::id(), name))
    }

    #[test]
    fn frame_target_matches_duration_times_rate() {
        assert_eq!(clip_frame_target(10.0, 44100), 441_000);
        assert_eq!(clip_frame_target(0.5, 16000), 8_000);
        // Rounding stays within one sample
        assert_eq!(clip_frame_target(1.0 / 3.0, 3), 1);
    }

    #[test]
    fn mono_input_is_duplicated_to_stereo() {
        assert_eq!(to_stereo(&[1, 2], 1), vec![1, 1, 2, 2]);
    }

    #[test]
    fn stereo_input_passes_through() {
        assert_eq!(to_stereo(&[1, 2, 3, 4], 2), vec![1, 2, 3, 4]);
    }

    #[test]
    fn wide_input_keeps_first_pair() {
        assert_eq!(to_stereo(&[1, 2, 3, 4, 5, 6], 3), vec![1, 2, 4, 5]);
    }

    #[test]
    fn written_clip_has_expected_shape() {
        let path = temp_wav("shape");
        let duration = 0.5;
        let rate = 8000;
        let frames = clip_frame_target(duration, rate);

        let interleaved: Vec<i16> = (0..frames * 2).map(|i| (i % 100) as i16).collect();
        write_clip(&path, &interleaved, rate).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, CLIP_CHANNELS);
        assert_eq!(spec.sample_rate, rate);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len() as usize, frames * CLIP_CHANNELS as usize);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn rewriting_overwrites_previous_clip() {
        let path = temp_wav("overwrite");
        write_clip(&path, &[1, 1, 2, 2], 8000).unwrap();
        write_clip(&path, &[5, 5], 8000).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 2);

        std::fs::remove_file(&path).ok();
    }
}
