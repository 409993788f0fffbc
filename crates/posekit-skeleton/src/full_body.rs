//! [`FullBodySkeleton`] – head, torso, hips, legs, feet, arms and hands.
//!
//! # Example
//!
//! ```rust
//! use posekit_skeleton::config::SkeletonConfig;
//! use posekit_skeleton::full_body::FullBodySkeleton;
//! use posekit_skeleton::skeleton::Skeleton;
//! use posekit_types::BodyPart;
//!
//! let mut skeleton = FullBodySkeleton::new(Vec::new(), SkeletonConfig::default()).unwrap();
//! skeleton.update_pose();
//!
//! let foot = skeleton.bone_info_for_body_part(BodyPart::LeftFoot).unwrap();
//! assert!(foot.length() > 0.0);
//! ```

use posekit_types::{BodyPart, BoneType, PoseError, SkeletonConfigOffset, TrackerId};
use tracing::info;

use crate::bone::BoneInfo;
use crate::config::SkeletonConfig;
use crate::rig::{FULL_BODY, Rig};
use crate::skeleton::Skeleton;
use crate::tracker::Tracker;
use crate::transform::{NodeId, TransformTree};
use crate::tweaks::{LegTweaks, LegTweaksConfig, LegTweaksState, TapDetectionConfig};

/// Full-body rig with leg tweaks.
pub struct FullBodySkeleton {
    rig: Rig,
    feet: [NodeId; 2],
    leg_tweaks: LegTweaks,
    tap_detection: TapDetectionConfig,
}

impl FullBodySkeleton {
    /// Build the rig and bind `trackers` by body part.
    pub fn new(trackers: Vec<Box<dyn Tracker>>, config: SkeletonConfig) -> Result<Self, PoseError> {
        let rig = Rig::new(&FULL_BODY, trackers, config)?;
        let feet = rig
            .feet()
            .ok_or_else(|| PoseError::UnknownNode("LEFT_FOOT".to_string()))?;
        Ok(Self {
            rig,
            feet,
            leg_tweaks: LegTweaks::from_config(LegTweaksConfig::default()),
            tap_detection: TapDetectionConfig::default(),
        })
    }

    pub fn with_leg_tweaks(mut self, config: LegTweaksConfig) -> Self {
        self.leg_tweaks.update_config(config);
        self
    }

    pub fn leg_tweaks_config(&self) -> &LegTweaksConfig {
        self.leg_tweaks.config()
    }
}

impl Skeleton for FullBodySkeleton {
    fn name(&self) -> &'static str {
        self.rig.layout().name
    }

    fn update_pose(&mut self) {
        self.rig.update_pose();
        self.leg_tweaks.apply(self.rig.tree_mut(), self.feet);
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

    fn update_leg_tweaks_config(&mut self, config: &LegTweaksConfig) {
        info!(
            enabled = config.enabled,
            floor_clip = config.floor_clip,
            skating_correction = config.skating_correction,
            floor_level = config.floor_level,
            "Leg tweaks config updated"
        );
        self.leg_tweaks.update_config(*config);
    }

    fn update_tap_detection_config(&mut self, config: &TapDetectionConfig) {
        self.tap_detection = *config;
    }

    fn tap_detection_config(&self) -> &TapDetectionConfig {
        &self.tap_detection
    }

    fn leg_tweaks_state(&self) -> LegTweaksState {
        self.leg_tweaks.state()
    }

    fn set_leg_tweaks_enabled(&mut self, value: bool) {
        self.leg_tweaks.set_enabled(value);
    }

    fn set_floorclip_enabled(&mut self, value: bool) {
        self.leg_tweaks.set_floor_clip(value);
    }

    fn set_skating_correction_enabled(&mut self, value: bool) {
        self.leg_tweaks.set_skating_correction(value);
    }
}
