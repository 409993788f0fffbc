//! Builders turning trackers and a posed skeleton into data-feed records.
//!
//! All builders are read-only: they take trackers and skeletons by shared
//! reference and never mutate pose state.  [`build_update`] reads the
//! skeleton under a [`SharedSkeleton`] read lock so the whole frame comes
//! from one completed tick.

use std::collections::BTreeMap;

use posekit_skeleton::{SharedSkeleton, Skeleton, Tracker};
use tracing::debug;

use crate::records::{
    BoneData, DataFeedConfig, DataFeedUpdate, DeviceData, DeviceDataMask, HardwareStatus,
    TrackerData, TrackerDataMask, TrackerInfo,
};

/// One tracker record with the fields selected by `mask`.
pub fn tracker_data(mask: &TrackerDataMask, tracker: &dyn Tracker) -> TrackerData {
    let info = mask.info.then(|| TrackerInfo {
        body_part: Some(tracker.body_part()).filter(|p| *p != posekit_types::BodyPart::None),
        editable: !tracker.is_computed(),
        computed: tracker.is_computed(),
        mounting_orientation: tracker.mounting_rotation(),
    });

    TrackerData {
        tracker_id: tracker.id(),
        info,
        status: mask.status.then(|| tracker.status().id() + 1),
        position: if mask.position { tracker.position() } else { None },
        rotation: mask.rotation.then(|| tracker.rotation()),
        temp: if mask.temp { tracker.telemetry().temperature } else { None },
    }
}

/// Device link state reported by `tracker`.
pub fn hardware_status(tracker: &dyn Tracker) -> HardwareStatus {
    let telemetry = tracker.telemetry();
    HardwareStatus {
        status: tracker.status().id(),
        tps: telemetry.tps.clamp(0.0, u16::MAX as f32) as u16,
        ping: telemetry.ping,
        rssi: telemetry.signal_strength,
        mcu_temp: telemetry.temperature,
        battery_voltage: telemetry.battery_voltage,
        battery_pct: telemetry.battery_level.map(|l| l.clamp(0.0, 100.0) as u8),
    }
}

/// One device record.  The device's hardware status comes from its first
/// tracker.
///
/// Returns `None` when the mask excludes device data or the device has no
/// trackers.
pub fn device_data(id: u8, mask: &DeviceDataMask, trackers: &[&dyn Tracker]) -> Option<DeviceData> {
    if !mask.device_data {
        return None;
    }
    let first = trackers.first()?;
    Some(DeviceData {
        id,
        hardware_status: hardware_status(*first),
        trackers: mask
            .tracker_data
            .map(|tracker_mask| trackers.iter().map(|t| tracker_data(&tracker_mask, *t)).collect()),
    })
}

/// Group hardware trackers by device id and build one record per device, in
/// device-id order.  Trackers within a device are ordered by tracker number.
pub fn devices_data(mask: &DeviceDataMask, trackers: &[Box<dyn Tracker>]) -> Vec<DeviceData> {
    let mut by_device: BTreeMap<u8, Vec<&dyn Tracker>> = BTreeMap::new();
    for tracker in trackers {
        if let Some(device) = tracker.id().device_id {
            by_device.entry(device).or_default().push(tracker.as_ref());
        }
    }

    by_device
        .into_iter()
        .filter_map(|(id, mut device_trackers)| {
            device_trackers.sort_by_key(|t| t.id().tracker_num);
            device_data(id, mask, &device_trackers)
        })
        .collect()
}

/// Records for every computed tracker.
pub fn synthetic_trackers_data(
    mask: &TrackerDataMask,
    trackers: &[Box<dyn Tracker>],
) -> Vec<TrackerData> {
    trackers
        .iter()
        .filter(|t| t.is_computed())
        .map(|t| tracker_data(mask, t.as_ref()))
        .collect()
}

/// World-space data for each shareable bone.
pub fn bones_data(skeleton: &dyn Skeleton) -> Vec<BoneData> {
    let tree = skeleton.tree();
    skeleton
        .shareable_bone_info()
        .into_iter()
        .map(|bone| BoneData {
            body_part: bone.body_part(),
            rotation_g: bone.global_rotation(tree),
            head_position_g: tree.node(bone.head_node()).world().translation,
            bone_length: bone.length(),
        })
        .collect()
}

/// Assemble a frame for one subscriber from an already-locked skeleton.
pub fn build_update_from(
    config: &DataFeedConfig,
    skeleton: &dyn Skeleton,
    generation: u64,
) -> DataFeedUpdate {
    let trackers = skeleton.trackers();
    DataFeedUpdate {
        generation,
        devices: config.devices.map(|mask| devices_data(&mask, trackers)),
        synthetic_trackers: config
            .synthetic_trackers
            .map(|mask| synthetic_trackers_data(&mask, trackers)),
        bones: config.bone_data.then(|| bones_data(skeleton)),
    }
}

/// Assemble a frame from the last completed tick of `shared`.
pub fn build_update<S: Skeleton>(config: &DataFeedConfig, shared: &SharedSkeleton<S>) -> DataFeedUpdate {
    let pose = shared.read();
    let update = build_update_from(config, &*pose, pose.generation());
    debug!(
        generation = update.generation,
        devices = update.devices.as_ref().map_or(0, Vec::len),
        bones = update.bones.as_ref().map_or(0, Vec::len),
        "Data feed frame built"
    );
    update
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use posekit_skeleton::{FullBodySkeleton, SimTracker, SkeletonConfig, TrackerSample};
    use posekit_types::{BodyPart, TrackerId, TrackerStatus, TrackerTelemetry};

    fn telemetry() -> TrackerTelemetry {
        TrackerTelemetry {
            tps: 100.4,
            ping: 12,
            signal_strength: -60,
            temperature: Some(31.5),
            battery_voltage: Some(3.9),
            battery_level: Some(87.0),
        }
    }

    fn tracker(device: Option<u8>, num: u8, part: BodyPart) -> Box<dyn Tracker> {
        let id = match device {
            Some(d) => TrackerId::new(d, num),
            None => TrackerId::computed(num),
        };
        let mut t = SimTracker::new(id, part).with_telemetry(telemetry());
        t.ingest(TrackerSample {
            rotation: Quat::from_rotation_y(0.5),
            position: Some(Vec3::new(1.0, 2.0, 3.0)),
            status: TrackerStatus::Ok,
        });
        t.boxed()
    }

    #[test]
    fn mask_gates_every_optional_field() {
        let t = tracker(Some(1), 0, BodyPart::Chest);

        let none = tracker_data(&TrackerDataMask::NONE, t.as_ref());
        assert_eq!(none.tracker_id, TrackerId::new(1, 0));
        assert!(none.info.is_none());
        assert!(none.status.is_none());
        assert!(none.position.is_none());
        assert!(none.rotation.is_none());
        assert!(none.temp.is_none());

        let all = tracker_data(&TrackerDataMask::ALL, t.as_ref());
        assert_eq!(all.status, Some(TrackerStatus::Ok.id() + 1));
        assert_eq!(all.position, Some(Vec3::new(1.0, 2.0, 3.0)));
        let rotation = all.rotation.unwrap();
        assert!(rotation.dot(Quat::from_rotation_y(0.5)).abs() > 1.0 - 1e-5);
        assert_eq!(all.temp, Some(31.5));
        let info = all.info.unwrap();
        assert_eq!(info.body_part, Some(BodyPart::Chest));
        assert!(info.editable);
        assert!(!info.computed);
    }

    #[test]
    fn position_and_rotation_are_independent() {
        let t = tracker(Some(1), 0, BodyPart::Chest);
        let mask = TrackerDataMask {
            position: true,
            ..TrackerDataMask::NONE
        };
        let data = tracker_data(&mask, t.as_ref());
        assert!(data.position.is_some());
        assert!(data.rotation.is_none());
    }

    #[test]
    fn hardware_status_comes_from_first_tracker() {
        let status = hardware_status(tracker(Some(1), 0, BodyPart::Hip).as_ref());
        assert_eq!(status.status, TrackerStatus::Ok.id());
        assert_eq!(status.tps, 100);
        assert_eq!(status.rssi, -60);
        assert_eq!(status.battery_pct, Some(87));
    }

    #[test]
    fn devices_group_trackers_and_skip_computed() {
        let trackers = vec![
            tracker(Some(2), 1, BodyPart::LeftFoot),
            tracker(Some(1), 0, BodyPart::Hip),
            tracker(Some(2), 0, BodyPart::LeftLowerLeg),
            tracker(None, 0, BodyPart::Chest),
        ];
        let mask = DeviceDataMask {
            device_data: true,
            tracker_data: Some(TrackerDataMask::NONE),
        };
        let devices = devices_data(&mask, &trackers);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id, 1);
        assert_eq!(devices[1].id, 2);
        let nums: Vec<u8> = devices[1]
            .trackers
            .as_ref()
            .unwrap()
            .iter()
            .map(|t| t.tracker_id.tracker_num)
            .collect();
        assert_eq!(nums, vec![0, 1]);
    }

    #[test]
    fn device_mask_off_yields_no_devices() {
        let trackers = vec![tracker(Some(1), 0, BodyPart::Hip)];
        let mask = DeviceDataMask {
            device_data: false,
            tracker_data: Some(TrackerDataMask::ALL),
        };
        assert!(devices_data(&mask, &trackers).is_empty());

        let mask = DeviceDataMask {
            device_data: true,
            tracker_data: None,
        };
        assert!(devices_data(&mask, &trackers)[0].trackers.is_none());
    }

    #[test]
    fn synthetic_trackers_are_computed_only() {
        let trackers = vec![
            tracker(Some(1), 0, BodyPart::Hip),
            tracker(None, 5, BodyPart::Chest),
        ];
        let data = synthetic_trackers_data(&TrackerDataMask::ALL, &trackers);
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].tracker_id, TrackerId::computed(5));
        assert!(data[0].info.unwrap().computed);
    }

    #[test]
    fn update_follows_feed_config() {
        let skeleton = FullBodySkeleton::new(
            vec![tracker(Some(1), 0, BodyPart::Hip)],
            SkeletonConfig::default(),
        )
        .unwrap();
        let shared = SharedSkeleton::new(skeleton);
        shared.tick();

        let update = build_update(&DataFeedConfig::default(), &shared);
        assert_eq!(update.generation, 1);
        assert!(update.devices.is_none());
        assert!(update.bones.is_none());

        let update = build_update(&DataFeedConfig::everything(), &shared);
        assert_eq!(update.devices.unwrap().len(), 1);
        let bones = update.bones.unwrap();
        assert_eq!(bones.len(), shared.read().shareable_bone_info().len());
        let hip = bones.iter().find(|b| b.body_part == BodyPart::Hip).unwrap();
        assert!((hip.bone_length - 0.04).abs() < 1e-5);
    }
}
