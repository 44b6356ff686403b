//! Audio capture feature: the clip recorder, the live visualization tap,
//! the visualizer worker, and the recording screen.

pub mod frames;
pub mod recorder;
pub mod ui;
pub mod visualizations;
pub mod visualizer;

pub use frames::{FrameInput, FrameTap};
pub use recorder::{record_clip, RecordedClip};
pub use ui::{RecordingTui, UiCommand};
pub use visualizer::{VisualFrame, Visualizer};

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Opens an input device by name, numeric index, or "default".
///
/// # Errors
/// - If no device matches, or device enumeration fails
pub(crate) fn open_input_device(device_spec: &str) -> Result<cpal::Device> {
    let device = suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        if device_spec == "default" {
            host.default_input_device()
                .ok_or_else(|| anyhow!("No audio input device available"))
        } else {
            find_device_by_spec(&host, device_spec)
        }
    })?;

    let name = device.name().unwrap_or_else(|_| "Unknown device".to_string());
    tracing::info!("Input device: {}", name);
    Ok(device)
}

/// Finds an input device by numeric index or exact name.
fn find_device_by_spec(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    if let Ok(index) = device_spec.parse::<usize>() {
        let devices: Vec<_> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
            .collect();
        if index < devices.len() {
            return Ok(devices.into_iter().nth(index).unwrap());
        }
        return Err(anyhow!(
            "Device index {} is out of range (0-{})",
            index,
            devices.len().saturating_sub(1)
        ));
    }

    let devices = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;
    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(anyhow!(
        "Audio input device '{device_spec}' not found. Use 'parrot list-devices' to see available devices."
    ))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}
