//! Recording screen: live visualization, status log, and key handling.
//!
//! Renders the filtered waveform (or spectrum) as a sparkline, appends
//! session status lines ("Start speaking...", "Stop speaking.",
//! "You said: ..."), and maps keys to session commands.

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    widgets::{Paragraph, Sparkline},
};
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

use crate::config::VisualizationType;

use super::visualizations::{display_bins, SpectrumView};
use super::visualizer::VisualFrame;

/// How many status lines the log keeps.
const STATUS_LINES: usize = 32;

/// User command resolved from key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    /// No actionable key pressed
    Continue,
    /// Run one record-and-transcribe session (Enter or 'r')
    StartSession,
    /// Leave the application (Escape, 'q', or Ctrl+C)
    Quit,
}

/// Terminal UI for the recording workflow.
pub struct RecordingTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    visualization: VisualizationType,
    spectrum: SpectrumView,
    wave_bins: Vec<u64>,
    status: Vec<String>,
    sample_rate: u32,
    reference_level_db: i8,
    last_level: u8,
    peak_hold: u8,
    peak_hold_time: Instant,
    session_start: Option<Instant>,
}

impl RecordingTui {
    /// Enters the alternate screen and sets up the display.
    ///
    /// # Errors
    /// - If raw mode or the alternate screen cannot be entered
    pub fn new(
        sample_rate: u32,
        reference_level_db: i8,
        visualization: VisualizationType,
    ) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        let width = terminal.size()?.width as usize;

        Ok(Self {
            terminal,
            visualization,
            spectrum: SpectrumView::new(width),
            wave_bins: vec![0; width],
            status: Vec::new(),
            sample_rate,
            reference_level_db,
            last_level: 0,
            peak_hold: 0,
            peak_hold_time: Instant::now(),
            session_start: None,
        })
    }

    /// Appends a line to the status log.
    pub fn push_status(&mut self, line: impl Into<String>) {
        self.status.push(line.into());
        if self.status.len() > STATUS_LINES {
            self.status.remove(0);
        }
    }

    pub fn session_started(&mut self) {
        self.session_start = Some(Instant::now());
    }

    pub fn session_ended(&mut self) {
        self.session_start = None;
        self.last_level = 0;
    }

    /// Ingests one processed frame from the visualizer worker.
    pub fn update_frame(&mut self, frame: &VisualFrame) {
        let width = self
            .terminal
            .size()
            .map(|s| s.width as usize)
            .unwrap_or(self.wave_bins.len());

        match self.visualization {
            VisualizationType::Waveform => {
                self.wave_bins = display_bins(&frame.filtered, width);
            }
            VisualizationType::Spectrum => {
                self.spectrum.resize(width);
                self.spectrum.update(&frame.samples, self.sample_rate);
            }
        }

        self.track_level(&frame.samples);
    }

    /// Draws the visualization, status log, and footer.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(&mut self) -> Result<()> {
        let bins: Vec<u64> = match self.visualization {
            VisualizationType::Waveform => self.wave_bins.clone(),
            VisualizationType::Spectrum => self.spectrum.bins().to_vec(),
        };
        let footer_text = self.footer_line();
        let status: Vec<Line> = self
            .status
            .iter()
            .map(|line| Line::from(line.clone()))
            .collect();

        self.terminal.draw(|frame| {
            let area = frame.area();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Percentage(55),
                    Constraint::Min(3),
                    Constraint::Length(1),
                ])
                .split(area);

            let sparkline = Sparkline::default().data(&bins).max(100).style(
                Style::default()
                    .bg(Color::Rgb(0, 0, 0))
                    .fg(Color::Rgb(206, 224, 220)),
            );
            frame.render_widget(sparkline, chunks[0]);

            let visible = status
                .len()
                .saturating_sub(chunks[1].height as usize);
            let log = Paragraph::new(status[visible..].to_vec())
                .style(Style::default().fg(Color::Rgb(185, 207, 212)));
            frame.render_widget(log, chunks[1]);

            let footer = Paragraph::new(footer_text).style(
                Style::default()
                    .fg(Color::Rgb(185, 207, 212))
                    .bg(Color::Rgb(0, 0, 0)),
            );
            frame.render_widget(footer, chunks[2]);
        })?;

        Ok(())
    }

    /// Polls for a key and maps it to a command.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self, timeout: Duration) -> Result<UiCommand> {
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Enter | KeyCode::Char('r') => UiCommand::StartSession,
                    KeyCode::Char('q') | KeyCode::Esc => UiCommand::Quit,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        UiCommand::Quit
                    }
                    _ => UiCommand::Continue,
                });
            }
        }
        Ok(UiCommand::Continue)
    }

    /// Restores the terminal.
    ///
    /// # Errors
    /// - If raw mode cannot be disabled or the screen restored
    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal
            .show_cursor()
            .map_err(|e| anyhow!("Failed to restore cursor: {e}"))?;
        Ok(())
    }

    /// RMS level of the latest frame as a percentage of the reference level,
    /// with a 3-second peak hold.
    fn track_level(&mut self, samples: &[i16]) {
        if samples.is_empty() {
            return;
        }

        let sum_of_squares: i64 = samples.iter().map(|&x| (x as i64).pow(2)).sum();
        let rms = ((sum_of_squares / samples.len() as i64) as f32).sqrt();

        let db_fs = if rms > 0.0 {
            20.0 * (rms / 32767.0).log10()
        } else {
            -160.0
        };

        let min_db = self.reference_level_db as f32 - 40.0;
        let level = ((db_fs - min_db) / 40.0 * 100.0).clamp(0.0, 100.0) as u8;

        self.last_level = level;
        if level > self.peak_hold || self.peak_hold_time.elapsed().as_secs() >= 3 {
            self.peak_hold = level;
            self.peak_hold_time = Instant::now();
        }
    }

    fn footer_line(&self) -> String {
        match self.session_start {
            Some(started) => {
                let secs = started.elapsed().as_secs();
                format!(
                    "● {}:{:02} / {}% / peak {}%",
                    secs / 60,
                    secs % 60,
                    self.last_level,
                    self.peak_hold
                )
            }
            None => "Enter/r: record & transcribe · q/Esc: quit".to_string(),
        }
    }
}
