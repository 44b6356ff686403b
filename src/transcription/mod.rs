//! Speech-to-text: the opaque recognition call behind a narrow seam.
//!
//! The recognizer takes raw audio bytes and returns a result object with a
//! text field. Keeping the seam narrow means the session flow can be
//! exercised with a fixture backend instead of a live model.

pub mod api;

pub use api::{transcribe, RecognizerBackend, RecognizerConfig, TranscriptionResponse};
