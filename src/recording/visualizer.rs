//! Visualizer worker: the streaming half of a recording session.
//!
//! A dedicated thread pulls frames from the live tap, runs them through the
//! waveform pipeline, and ships the result to the UI over a channel. The
//! stop condition is an explicit message, checked once per iteration at the
//! top of the loop, so the last in-flight frame always completes before the
//! worker exits. Stopping joins the thread, which makes "visualizer has
//! stopped" an observable fact rather than a hope.

use std::sync::mpsc::{self, Sender, TryRecvError};
use std::thread::JoinHandle;
use std::time::Duration;

use super::frames::FrameInput;
use super::visualizations::WaveformPipeline;

/// One processed frame, as delivered to the display.
#[derive(Debug, Clone)]
pub struct VisualFrame {
    /// Raw mono samples, for level metering and the spectrum view
    pub samples: Vec<i16>,
    /// Low-pass filtered waveform, for the default view
    pub filtered: Vec<f64>,
}

/// Handle to a running visualizer worker.
pub struct Visualizer {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl Visualizer {
    /// Spawns the worker thread and starts streaming immediately.
    pub fn spawn<I>(input: I, pipeline: WaveformPipeline, frames: Sender<VisualFrame>) -> Self
    where
        I: FrameInput + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel();
        let handle = std::thread::spawn(move || {
            stream_frames(input, &pipeline, &frames, &stop_rx);
            tracing::debug!("Visualizer worker exited");
        });
        Self { stop_tx, handle }
    }

    /// Signals the worker to stop and waits for it to finish.
    ///
    /// Returns only after the worker has observed the stop message and
    /// completed its final frame.
    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        if self.handle.join().is_err() {
            tracing::warn!("Visualizer worker panicked");
        }
    }
}

/// The streaming loop. Stop is observed between frames, never mid-frame.
fn stream_frames(
    mut input: impl FrameInput,
    pipeline: &WaveformPipeline,
    frames: &Sender<VisualFrame>,
    stop_rx: &mpsc::Receiver<()>,
) {
    loop {
        match stop_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        match input.read_frame() {
            Some(samples) => {
                let filtered = pipeline.process(&samples);
                if frames.send(VisualFrame { samples, filtered }).is_err() {
                    // Display side went away; nothing left to stream for
                    break;
                }
            }
            // No full frame buffered yet; yield to the capture callback
            None => std::thread::sleep(Duration::from_millis(5)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingFrames {
        reads: Arc<AtomicUsize>,
    }

    impl FrameInput for CountingFrames {
        fn read_frame(&mut self) -> Option<Vec<i16>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Some(vec![1000; 64])
        }
    }

    fn pipeline() -> WaveformPipeline {
        WaveformPipeline::new(64, 500.0, 44100, 5).unwrap()
    }

    #[test]
    fn stop_sent_first_prevents_any_frame() {
        let reads = Arc::new(AtomicUsize::new(0));
        let input = CountingFrames {
            reads: Arc::clone(&reads),
        };
        let (frame_tx, _frame_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel();

        stop_tx.send(()).unwrap();
        stream_frames(input, &pipeline(), &frame_tx, &stop_rx);

        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn worker_stops_and_joins() {
        let reads = Arc::new(AtomicUsize::new(0));
        let input = CountingFrames {
            reads: Arc::clone(&reads),
        };
        let (frame_tx, frame_rx) = mpsc::channel();

        let visualizer = Visualizer::spawn(input, pipeline(), frame_tx);

        // Frames flow while streaming
        let frame = frame_rx
            .recv_timeout(Duration::from_secs(1))
            .expect("worker should produce frames");
        assert_eq!(frame.samples.len(), 64);
        assert_eq!(frame.filtered.len(), 64);

        visualizer.stop();
        let after_join = reads.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(reads.load(Ordering::SeqCst), after_join);

        // Sender side is gone once the worker exits
        while frame_rx.try_recv().is_ok() {}
        assert!(frame_rx.try_recv().is_err());
    }

    #[test]
    fn sequential_sessions_are_safe() {
        for _ in 0..2 {
            let reads = Arc::new(AtomicUsize::new(0));
            let input = CountingFrames {
                reads: Arc::clone(&reads),
            };
            let (frame_tx, frame_rx) = mpsc::channel();
            let visualizer = Visualizer::spawn(input, pipeline(), frame_tx);
            frame_rx
                .recv_timeout(Duration::from_secs(1))
                .expect("worker should produce frames");
            visualizer.stop();
        }
    }
}
