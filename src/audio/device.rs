//! Microphone enumeration using cpal

use cpal::traits::{DeviceTrait, HostTrait};
use serde::Serialize;

/// An audio input device the user can record from
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDevice {
    /// Host-reported device name, also used as its identifier in config
    pub name: String,
    /// Whether this is the system default input device
    pub is_default: bool,
    /// Default sample rate, when the device reports one
    pub sample_rate: Option<u32>,
    /// Default channel count, when the device reports one
    pub channels: Option<u16>,
}

/// Display name for a device, tolerant of hosts that cannot report one
pub fn device_display_name(device: &cpal::Device) -> String {
    device.name().unwrap_or_else(|_| "Unknown".to_string())
}

/// List all available input devices on the default host
pub fn list_input_devices() -> Vec<InputDevice> {
    let host = cpal::default_host();
    tracing::info!("CPAL host: {}", host.id().name());

    let default_name = host.default_input_device().map(|d| device_display_name(&d));
    if default_name.is_none() {
        tracing::warn!("No default input device found");
    }

    let devices: Vec<InputDevice> = host
        .input_devices()
        .map(|iter| {
            iter.map(|device| {
                let name = device_display_name(&device);
                let config = device.default_input_config().ok();
                tracing::debug!("Found input device: '{}' ({:?})", name, config);
                InputDevice {
                    is_default: Some(&name) == default_name.as_ref(),
                    sample_rate: config.as_ref().map(|c| c.sample_rate().0),
                    channels: config.as_ref().map(|c| c.channels()),
                    name,
                }
            })
            .collect()
        })
        .unwrap_or_default();

    tracing::info!("Found {} input devices", devices.len());
    devices
}

/// Resolve the device to record from
///
/// Uses the configured device when it is present, otherwise the system default.
pub fn recording_device(device_name: Option<&str>) -> Option<cpal::Device> {
    let host = cpal::default_host();

    if let Some(wanted) = device_name {
        let found = host.input_devices().ok().and_then(|mut iter| {
            iter.find(|device| device_display_name(device) == wanted)
        });
        if let Some(device) = found {
            tracing::info!("Using configured input device: {}", wanted);
            return Some(device);
        }
        tracing::warn!(
            "Configured input device '{}' not found, falling back to default",
            wanted
        );
    }

    let device = host.default_input_device();
    match device {
        Some(ref d) => tracing::info!("Using default input device: '{}'", device_display_name(d)),
        None => tracing::error!("No default input device available"),
    }
    device
}
