//! Live mono frame tap for the visualizer.
//!
//! A cpal input stream pushes mono-averaged samples into a bounded ring
//! buffer; the visualizer worker pulls fixed-size frames back out. The
//! buffer tolerates overflow by discarding the oldest samples, favoring
//! continuity of the display over completeness.

use anyhow::Result;
use cpal::traits::{DeviceTrait, StreamTrait};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// How many whole frames the ring buffer may hold before old samples drop.
const MAX_BUFFERED_FRAMES: usize = 8;

/// Source of fixed-size sample frames for the visualization loop.
pub trait FrameInput {
    /// Returns the next full frame, or `None` if one is not available yet.
    fn read_frame(&mut self) -> Option<Vec<i16>>;
}

/// Live audio tap: owns the input stream and the shared ring buffer.
///
/// The cpal stream is not `Send`, so the tap stays on the thread that
/// opened it; workers take a [`FrameReader`] over the shared buffer instead.
pub struct FrameTap {
    shared: Arc<Mutex<VecDeque<i16>>>,
    frame_size: usize,
    _stream: cpal::Stream,
}

impl FrameTap {
    /// Opens the visualization capture on the given device.
    ///
    /// The stream runs for the process lifetime; multi-channel input is
    /// averaged down to mono before it reaches the buffer.
    ///
    /// # Errors
    /// - If the device is unavailable or stream creation fails
    pub fn open(device_name: &str, frame_size: usize) -> Result<Self> {
        let device = super::open_input_device(device_name)?;
        let device_config = device.default_input_config()?;
        let channels = device_config.channels() as usize;

        tracing::debug!(
            "Visualization tap: {}Hz, {} channels, {} samples per frame",
            device_config.sample_rate().0,
            channels,
            frame_size
        );

        let shared: Arc<Mutex<VecDeque<i16>>> = Arc::new(Mutex::new(VecDeque::new()));
        let buffer = Arc::clone(&shared);
        let capacity = frame_size * MAX_BUFFERED_FRAMES;

        let stream = device.build_input_stream(
            &device_config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let mut queue = buffer.lock().unwrap();
                push_mono(&mut queue, data, channels);
                // Overflow is dropped silently; a stale display beats a stall
                while queue.len() > capacity {
                    queue.pop_front();
                }
            },
            |err| {
                tracing::error!("Visualization stream error: {}", err);
            },
            None,
        )?;
        stream.play()?;

        Ok(Self {
            shared,
            frame_size,
            _stream: stream,
        })
    }

    /// Returns a `Send` handle that reads frames from the shared buffer.
    pub fn reader(&self) -> FrameReader {
        FrameReader {
            shared: Arc::clone(&self.shared),
            frame_size: self.frame_size,
        }
    }
}

/// Frame-reading handle over the tap's ring buffer.
pub struct FrameReader {
    shared: Arc<Mutex<VecDeque<i16>>>,
    frame_size: usize,
}

impl FrameInput for FrameReader {
    fn read_frame(&mut self) -> Option<Vec<i16>> {
        let mut queue = self.shared.lock().unwrap();
        if queue.len() < self.frame_size {
            return None;
        }
        Some(queue.drain(..self.frame_size).collect())
    }
}

/// Averages interleaved multi-channel samples down to mono and appends them.
fn push_mono(queue: &mut VecDeque<i16>, data: &[i16], channels: usize) {
    match channels {
        0 => {}
        1 => queue.extend(data.iter().copied()),
        n => {
            for chunk in data.chunks_exact(n) {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                queue.push_back((sum / n as i32) as i16);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_mono_passes_single_channel_through() {
        let mut queue = VecDeque::new();
        push_mono(&mut queue, &[1, 2, 3], 1);
        assert_eq!(queue, VecDeque::from(vec![1, 2, 3]));
    }

    #[test]
    fn push_mono_averages_stereo_pairs() {
        let mut queue = VecDeque::new();
        push_mono(&mut queue, &[100, 200, -50, 50], 2);
        assert_eq!(queue, VecDeque::from(vec![150, 0]));
    }

    #[test]
    fn reader_returns_whole_frames_only() {
        let shared = Arc::new(Mutex::new(VecDeque::from(vec![7i16; 10])));
        let mut reader = FrameReader {
            shared: Arc::clone(&shared),
            frame_size: 4,
        };

        assert_eq!(reader.read_frame(), Some(vec![7; 4]));
        assert_eq!(reader.read_frame(), Some(vec![7; 4]));
        // Two samples left: not a full frame
        assert_eq!(reader.read_frame(), None);
        assert_eq!(shared.lock().unwrap().len(), 2);
    }
}
