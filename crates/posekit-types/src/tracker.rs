//! Tracker identity and hardware telemetry shared between the skeleton and
//! the data feed.

use serde::{Deserialize, Serialize};

/// Stable identity of a tracker: the device it is attached to (absent for
/// computed trackers) plus its index on that device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackerId {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<u8>,
    pub tracker_num: u8,
}

impl TrackerId {
    pub fn new(device_id: u8, tracker_num: u8) -> Self {
        Self {
            device_id: Some(device_id),
            tracker_num,
        }
    }

    /// Identity of a tracker that has no physical device.
    pub fn computed(tracker_num: u8) -> Self {
        Self {
            device_id: None,
            tracker_num,
        }
    }
}

/// Connection status reported by a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackerStatus {
    #[default]
    Disconnected,
    Ok,
    Busy,
    Error,
    Occluded,
}

impl TrackerStatus {
    /// Wire code.  The data feed offsets this by one so that zero means
    /// "unset".
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Whether samples from a tracker in this state should drive the pose.
    pub fn is_usable(self) -> bool {
        matches!(self, TrackerStatus::Ok | TrackerStatus::Busy)
    }
}

/// Hardware telemetry sampled from a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackerTelemetry {
    /// Packets received per second.
    pub tps: f32,
    /// Round-trip time in milliseconds.
    pub ping: u32,
    /// Signal strength in dBm.
    pub signal_strength: i16,
    /// MCU temperature in degrees Celsius.
    pub temperature: Option<f32>,
    pub battery_voltage: Option<f32>,
    /// Battery level in percent (0–100).
    pub battery_level: Option<f32>,
}
