//! The record-and-transcribe workflow.
//!
//! One session per trigger: start the visualizer worker, record the clip
//! for its fixed duration, stop and join the worker, transcribe, report.
//! Sessions are strictly sequential; a new trigger is only accepted once
//! the previous session has fully completed.

use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::recording::visualizations::WaveformPipeline;
use crate::recording::{record_clip, FrameTap, RecordingTui, UiCommand, Visualizer};
use crate::transcription::{self, RecognizerBackend, RecognizerConfig};

/// Runs the recording screen until the user quits.
///
/// The visualization tap and the filter coefficients are set up once here;
/// each session reuses them.
///
/// # Errors
/// - If configuration, the audio device, or the terminal cannot be set up
/// - If a session fails (the error propagates after the terminal is restored)
pub async fn handle_record() -> Result<()> {
    tracing::info!("=== parrot recorder started ===");

    let config = AppConfig::load()?;
    tracing::info!(
        "Configuration: device={}, rate={}Hz, clip={}s, cutoff={}Hz order {}",
        config.audio.device,
        config.audio.sample_rate,
        config.audio.clip_duration_secs,
        config.visualizer.cutoff_hz,
        config.visualizer.filter_order
    );

    // Filter coefficients are designed once per process
    let pipeline = WaveformPipeline::new(
        config.visualizer.frame_size,
        config.visualizer.cutoff_hz,
        config.audio.sample_rate,
        config.visualizer.filter_order,
    )?;

    // The live tap opens at startup; a failure here is fatal
    let tap = FrameTap::open(&config.audio.device, pipeline.frame_size())?;

    let trigger = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, Arc::clone(&trigger))
        .map_err(|e| anyhow!("Failed to register signal handler: {e}"))?;

    let mut tui = RecordingTui::new(
        config.audio.sample_rate,
        config.visualizer.reference_level_db,
        config.visualizer.visualization,
    )?;
    tui.push_status("Press Enter to record & transcribe.");

    let result = run_screen(&mut tui, &tap, &pipeline, &config, &trigger).await;

    tui.cleanup()?;
    tracing::info!("=== parrot recorder exited ===");
    result
}

async fn run_screen(
    tui: &mut RecordingTui,
    tap: &FrameTap,
    pipeline: &WaveformPipeline,
    config: &AppConfig,
    trigger: &AtomicBool,
) -> Result<()> {
    loop {
        let start = match tui.handle_input(Duration::from_millis(50))? {
            UiCommand::Quit => break,
            UiCommand::StartSession => true,
            UiCommand::Continue => trigger.swap(false, Ordering::Relaxed),
        };

        if start {
            run_session(tui, tap, pipeline, config).await?;
        } else {
            tui.render()?;
        }
    }
    Ok(())
}

/// One full session: signal start, record, signal stop (joined), transcribe,
/// report.
async fn run_session(
    tui: &mut RecordingTui,
    tap: &FrameTap,
    pipeline: &WaveformPipeline,
    config: &AppConfig,
) -> Result<()> {
    let clip_path = config.clip_path();

    tui.session_started();
    tui.push_status("Start speaking...");
    tui.render()?;

    let (frame_tx, frame_rx) = mpsc::channel();
    let visualizer = Visualizer::spawn(tap.reader(), pipeline.clone(), frame_tx);

    let recording = {
        let device = config.audio.device.clone();
        let rate = config.audio.sample_rate;
        let duration = config.audio.clip_duration_secs;
        let path = clip_path.clone();
        tokio::task::spawn_blocking(move || record_clip(&device, rate, duration, &path))
    };

    while !recording.is_finished() {
        while let Ok(frame) = frame_rx.try_recv() {
            tui.update_frame(&frame);
        }
        tui.render()?;
        // Keys pressed mid-session are drained and ignored; a session
        // cannot be cancelled once started
        let _ = tui.handle_input(Duration::ZERO)?;
        tokio::time::sleep(Duration::from_millis(33)).await;
    }

    let clip = recording
        .await
        .map_err(|e| anyhow!("Recording task failed: {e}"))??;

    // Stop is a message plus a join: when this returns, the worker has
    // finished its last frame
    visualizer.stop();
    tui.session_ended();
    tui.push_status("Stop speaking.");

    // Render whatever the worker shipped before it stopped
    while let Ok(frame) = frame_rx.try_recv() {
        tui.update_frame(&frame);
    }
    tui.render()?;

    tracing::info!(
        "Clip recorded: {} frames at {}Hz",
        clip.frames,
        clip.sample_rate
    );

    let backend = recognizer_from_config(config);
    let text = transcription::transcribe(&backend, &clip.path).await?;

    tracing::info!("Transcription completed: {}", text);
    tui.push_status(format!("You said: {text}"));
    tui.render()?;

    Ok(())
}

/// Builds the recognition backend from config, pulling the token from the
/// environment variable the config names.
pub(crate) fn recognizer_from_config(config: &AppConfig) -> RecognizerBackend {
    // "fixture:<text>" skips the network entirely; useful for offline demos
    if let Some(text) = config.model.model_id.strip_prefix("fixture:") {
        return RecognizerBackend::Fixture(text.to_string());
    }

    let api_key = std::env::var(&config.model.api_key_env).ok();
    if api_key.is_none() {
        tracing::warn!(
            "No API token in ${}; calling the inference endpoint unauthenticated",
            config.model.api_key_env
        );
    }
    RecognizerBackend::Remote(RecognizerConfig {
        model_id: config.model.model_id.clone(),
        endpoint: config.model.endpoint.clone(),
        api_key,
    })
}
