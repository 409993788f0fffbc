//! Simulated tracker set and a deterministic walking animation for the demo
//! loop.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use posekit_skeleton::{SimTracker, Skeleton, Tracker, TrackerSample};
use posekit_types::{BodyPart, TrackerId, TrackerStatus, TrackerTelemetry};

/// Stride frequency in Hz.
const STRIDE_HZ: f32 = 0.8;
/// Standing head height in metres.
const HEAD_HEIGHT: f32 = 1.7;

const DEMO_TRACKERS: &[(Option<u8>, u8, BodyPart)] = &[
    (Some(0), 0, BodyPart::Head),
    (Some(1), 0, BodyPart::Chest),
    (Some(1), 1, BodyPart::Hip),
    (Some(2), 0, BodyPart::LeftUpperLeg),
    (Some(2), 1, BodyPart::LeftLowerLeg),
    (Some(3), 0, BodyPart::RightUpperLeg),
    (Some(3), 1, BodyPart::RightLowerLeg),
    (Some(4), 0, BodyPart::LeftLowerArm),
    (Some(5), 0, BodyPart::RightLowerArm),
    (None, 0, BodyPart::Waist),
];

/// One simulated tracker per demo body part, plus a computed waist tracker.
pub fn demo_trackers() -> Vec<Box<dyn Tracker>> {
    DEMO_TRACKERS
        .iter()
        .map(|&(device, num, part)| {
            let id = match device {
                Some(d) => TrackerId::new(d, num),
                None => TrackerId::computed(num),
            };
            let telemetry = TrackerTelemetry {
                tps: 100.0,
                ping: 8 + u32::from(num),
                signal_strength: -55,
                temperature: Some(30.0),
                battery_voltage: Some(3.95),
                battery_level: Some(90.0 - f32::from(device.unwrap_or(0)) * 5.0),
            };
            SimTracker::new(id, part).with_telemetry(telemetry).boxed()
        })
        .collect()
}

/// Rotation the animation assigns to `part` at `time` seconds.
fn pose_for(part: BodyPart, time: f32) -> Quat {
    let phase = (time * STRIDE_HZ * TAU).sin();
    match part {
        BodyPart::LeftUpperLeg => Quat::from_rotation_x(0.4 * phase),
        BodyPart::RightUpperLeg => Quat::from_rotation_x(-0.4 * phase),
        BodyPart::LeftLowerLeg => Quat::from_rotation_x(0.4 * phase - 0.3 * phase.abs()),
        BodyPart::RightLowerLeg => Quat::from_rotation_x(-0.4 * phase - 0.3 * phase.abs()),
        BodyPart::LeftLowerArm => Quat::from_rotation_x(-0.3 * phase),
        BodyPart::RightLowerArm => Quat::from_rotation_x(0.3 * phase),
        BodyPart::Hip | BodyPart::Waist => Quat::from_rotation_y(0.1 * phase),
        BodyPart::Chest => Quat::from_rotation_y(-0.05 * phase),
        _ => Quat::IDENTITY,
    }
}

/// Feed every tracker its sample for `tick`.
pub fn animate(skeleton: &mut dyn Skeleton, tick: u64, tick_hz: u32) {
    let time = tick as f32 / tick_hz.max(1) as f32;
    let bob = 0.02 * (time * STRIDE_HZ * 2.0 * TAU).sin();
    let ids: Vec<(TrackerId, BodyPart)> = skeleton
        .trackers()
        .iter()
        .map(|t| (t.id(), t.body_part()))
        .collect();

    for (id, part) in ids {
        let position = (part == BodyPart::Head).then(|| Vec3::new(0.0, HEAD_HEIGHT + bob, 0.0));
        if let Some(tracker) = skeleton.tracker_mut(id) {
            tracker.ingest(TrackerSample {
                rotation: pose_for(part, time),
                position,
                status: TrackerStatus::Ok,
            });
        }
    }
}
