//! [`UpperBodySkeleton`] – head, torso, arms and hands.
//!
//! There are no legs, so leg tweaks always report disabled and their setters
//! are ignored.

use posekit_types::{BodyPart, BoneType, PoseError, SkeletonConfigOffset, TrackerId};
use tracing::debug;

use crate::bone::BoneInfo;
use crate::config::SkeletonConfig;
use crate::rig::{Rig, UPPER_BODY};
use crate::skeleton::Skeleton;
use crate::tracker::Tracker;
use crate::transform::{NodeId, TransformTree};
use crate::tweaks::{LegTweaksConfig, LegTweaksState, TapDetectionConfig};

pub struct UpperBodySkeleton {
    rig: Rig,
    tap_detection: TapDetectionConfig,
}

impl UpperBodySkeleton {
    pub fn new(trackers: Vec<Box<dyn Tracker>>, config: SkeletonConfig) -> Result<Self, PoseError> {
        Ok(Self {
            rig: Rig::new(&UPPER_BODY, trackers, config)?,
            tap_detection: TapDetectionConfig::default(),
        })
    }
}

impl Skeleton for UpperBodySkeleton {
    fn name(&self) -> &'static str {
        self.rig.layout().name
    }

    fn update_pose(&mut self) {
        self.rig.update_pose();
    }

    fn tree(&self) -> &TransformTree {
        self.rig.tree()
    }

    fn all_bone_info(&self) -> &[BoneInfo] {
        self.rig.bones()
    }

    fn shareable_bone_info(&self) -> Vec<&BoneInfo> {
        self.rig.shareable_bones()
    }

    fn bone_info_for_body_part(&self, part: BodyPart) -> Option<&BoneInfo> {
        self.rig.bone_for_body_part(part)
    }

    fn tail_node_of_bone(&self, bone: BoneType) -> Option<NodeId> {
        self.rig.tail_node_of_bone(bone)
    }

    fn skeleton_config(&self) -> &SkeletonConfig {
        self.rig.config()
    }

    fn set_skeleton_config(
        &mut self,
        offset: SkeletonConfigOffset,
        value: f32,
    ) -> Result<(), PoseError> {
        self.rig.set_config_offset(offset, value)
    }

    fn reset_skeleton_config(&mut self, offset: SkeletonConfigOffset) {
        self.rig.reset_config_offset(offset);
    }

    fn trackers(&self) -> &[Box<dyn Tracker>] {
        self.rig.trackers()
    }

    fn tracker_mut(&mut self, id: TrackerId) -> Option<&mut dyn Tracker> {
        self.rig.tracker_mut(id)
    }

    fn reset_trackers_full(&mut self) {
        self.rig.reset_trackers_full();
    }

    fn reset_trackers_mounting(&mut self) {
        self.rig.reset_trackers_mounting();
    }

    fn reset_trackers_yaw(&mut self) {
        self.rig.reset_trackers_yaw();
    }

    fn update_leg_tweaks_config(&mut self, _config: &LegTweaksConfig) {
        debug!("Upper-body rig has no legs; leg tweaks config ignored");
    }

    fn update_tap_detection_config(&mut self, config: &TapDetectionConfig) {
        self.tap_detection = *config;
    }

    fn tap_detection_config(&self) -> &TapDetectionConfig {
        &self.tap_detection
    }

    fn leg_tweaks_state(&self) -> LegTweaksState {
        LegTweaksState::default()
    }

    fn set_leg_tweaks_enabled(&mut self, value: bool) {
        debug!(value, "Upper-body rig has no legs; leg tweaks toggle ignored");
    }

    fn set_floorclip_enabled(&mut self, value: bool) {
        debug!(value, "Upper-body rig has no legs; floor clip toggle ignored");
    }

    fn set_skating_correction_enabled(&mut self, value: bool) {
        debug!(value, "Upper-body rig has no legs; skating correction toggle ignored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{SimTracker, TrackerSample};
    use glam::{Quat, Vec3};
    use posekit_types::TrackerStatus;

    #[test]
    fn leg_tweaks_always_report_disabled() {
        let mut skeleton = UpperBodySkeleton::new(Vec::new(), SkeletonConfig::default()).unwrap();
        skeleton.set_leg_tweaks_enabled(true);
        skeleton.set_floorclip_enabled(true);
        skeleton.update_leg_tweaks_config(&LegTweaksConfig::default());
        assert_eq!(skeleton.leg_tweaks_state().as_array(), [false, false, false]);
    }

    #[test]
    fn arm_tracker_drives_lower_arm_bone() {
        let rot = Quat::from_rotation_z(0.6);
        let mut arm = SimTracker::new(TrackerId::new(2, 0), BodyPart::LeftLowerArm);
        arm.ingest(TrackerSample {
            rotation: rot,
            position: None,
            status: TrackerStatus::Ok,
        });
        let mut skeleton =
            UpperBodySkeleton::new(vec![arm.boxed()], SkeletonConfig::default()).unwrap();
        skeleton.update_pose();

        // LEFT_UPPER_ARM carries the lower-arm tracker and is the head of the
        // LEFT_LOWER_ARM bone.
        let bone = skeleton.bone_info_for_body_part(BodyPart::LeftLowerArm).unwrap();
        let global = bone.global_rotation(skeleton.tree());
        let expected = rot * Quat::from_rotation_x(std::f32::consts::PI);
        assert!(global.dot(expected).abs() > 1.0 - 1e-5);

        let hand = skeleton.tree().find("LEFT_HAND").unwrap();
        assert!(skeleton.tree().node(hand).world().translation != Vec3::ZERO);
    }
}
