//! Application command handlers.
//!
//! # Commands
//! - `record`: the record-and-transcribe session screen (default)
//! - `transcribe`: transcribe a pre-recorded audio file
//! - `list_devices`: list available audio input devices
//! - `logs`: display recent log entries

pub mod list_devices;
pub mod logs;
pub mod record;
pub mod transcribe;

pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use record::handle_record;
pub use transcribe::handle_transcribe;
