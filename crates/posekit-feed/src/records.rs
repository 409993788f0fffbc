//! Data-feed records and the masks that select their optional fields.
//!
//! Every optional field is `Option` and skipped when serialized, so a
//! consumer that asked for nothing but rotations receives nothing else.

use glam::{Quat, Vec3};
use posekit_types::{BodyPart, TrackerId};
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Masks
// ────────────────────────────────────────────────────────────────────────────

/// Independent inclusion flags for [`TrackerData`] fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerDataMask {
    pub info: bool,
    pub status: bool,
    pub position: bool,
    pub rotation: bool,
    pub temp: bool,
}

impl TrackerDataMask {
    pub const ALL: Self = Self {
        info: true,
        status: true,
        position: true,
        rotation: true,
        temp: true,
    };

    pub const NONE: Self = Self {
        info: false,
        status: false,
        position: false,
        rotation: false,
        temp: false,
    };
}

/// Selects device-level fields and, optionally, per-tracker data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceDataMask {
    /// Include devices at all.
    pub device_data: bool,
    /// Include each device's trackers with these fields.
    pub tracker_data: Option<TrackerDataMask>,
}

/// What a data-feed subscriber asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFeedConfig {
    pub devices: Option<DeviceDataMask>,
    pub synthetic_trackers: Option<TrackerDataMask>,
    pub bone_data: bool,
}

impl DataFeedConfig {
    /// Everything the feed can produce.
    pub fn everything() -> Self {
        Self {
            devices: Some(DeviceDataMask {
                device_data: true,
                tracker_data: Some(TrackerDataMask::ALL),
            }),
            synthetic_trackers: Some(TrackerDataMask::ALL),
            bone_data: true,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Records
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_part: Option<BodyPart>,
    pub editable: bool,
    pub computed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mounting_orientation: Option<Quat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerData {
    pub tracker_id: TrackerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<TrackerInfo>,
    /// Status code offset by one; zero is reserved for "unset".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Quat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<f32>,
}

/// Link and power state of a device, taken from its first tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HardwareStatus {
    pub status: u8,
    pub tps: u16,
    pub ping: u32,
    pub rssi: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcu_temp: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_voltage: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_pct: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceData {
    pub id: u8,
    pub hardware_status: HardwareStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trackers: Option<Vec<TrackerData>>,
}

/// World-space state of one shareable bone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneData {
    pub body_part: BodyPart,
    pub rotation_g: Quat,
    pub head_position_g: Vec3,
    pub bone_length: f32,
}

/// One data-feed frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataFeedUpdate {
    /// Tick the frame was built from.
    pub generation: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<DeviceData>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthetic_trackers: Option<Vec<TrackerData>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bones: Option<Vec<BoneData>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tracker_data_serializes_only_id() {
        let data = TrackerData {
            tracker_id: TrackerId::new(4, 1),
            info: None,
            status: None,
            position: None,
            rotation: None,
            temp: None,
        };
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(json, r#"{"tracker_id":{"device_id":4,"tracker_num":1}}"#);
    }

    #[test]
    fn default_feed_config_requests_nothing() {
        let config = DataFeedConfig::default();
        assert!(config.devices.is_none());
        assert!(config.synthetic_trackers.is_none());
        assert!(!config.bone_data);
    }
}
