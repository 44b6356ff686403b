//! List available audio input devices.

use anyhow::anyhow;
use cpal::traits::{DeviceTrait, HostTrait};

use crate::recording::suppress_alsa_warnings;

/// Prints every input device with its index, name, and default config.
///
/// # Errors
/// - If the audio host cannot enumerate devices
pub fn handle_list_devices() -> Result<(), anyhow::Error> {
    let (host, devices) = suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        let devices: Vec<cpal::Device> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate audio devices: {e}"))?
            .filter(|d| d.name().is_ok())
            .collect();
        Ok((host, devices))
    })?;

    if devices.is_empty() {
        println!("No audio input devices found on this system.");
        return Ok(());
    }

    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    println!("Available audio input devices:");
    println!();
    for (index, device) in devices.iter().enumerate() {
        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        let marker = if default_name.as_ref() == Some(&name) {
            " [DEFAULT]"
        } else {
            ""
        };
        let config = match device.default_input_config() {
            Ok(c) => format!("{}Hz, {} channels", c.sample_rate().0, c.channels()),
            Err(_) => "configuration unavailable".to_string(),
        };
        println!("  {index}: {name}{marker} ({config})");
    }

    Ok(())
}
