//! The `Skeleton` orchestration contract.
//!
//! A skeleton owns a [`TransformTree`], the [`BoneInfo`] views over it, its
//! trackers and its body proportions.  Each tick the owner calls
//! [`Skeleton::update_pose`]; everything else is either a read of the
//! propagated pose or a control-plane mutation.  Concurrent access goes
//! through [`SharedSkeleton`][crate::shared::SharedSkeleton], which
//! serializes both kinds of mutation behind one lock.
//!
//! Variants: [`FullBodySkeleton`][crate::full_body::FullBodySkeleton] and
//! [`UpperBodySkeleton`][crate::upper_body::UpperBodySkeleton].

use posekit_types::{BodyPart, BoneType, PoseError, SkeletonConfigOffset, TrackerId};

use crate::bone::BoneInfo;
use crate::config::SkeletonConfig;
use crate::tracker::Tracker;
use crate::transform::{NodeId, TransformNode, TransformTree};
use crate::tweaks::{LegTweaksConfig, LegTweaksState, TapDetectionConfig};

/// A posable skeleton driven by trackers.
pub trait Skeleton: Send + Sync {
    /// Rig name, e.g. `"full-body"`.
    fn name(&self) -> &'static str;

    /// Ingest the latest tracker samples, rewrite every local transform and
    /// propagate world transforms.
    fn update_pose(&mut self);

    fn tree(&self) -> &TransformTree;

    fn root_node(&self) -> &TransformNode {
        let tree = self.tree();
        tree.node(tree.root())
    }

    /// Every node, in creation order.
    fn all_nodes(&self) -> &[TransformNode] {
        self.tree().nodes()
    }

    fn all_bone_info(&self) -> &[BoneInfo];

    /// Bones exposed to external consumers.
    fn shareable_bone_info(&self) -> Vec<&BoneInfo>;

    fn bone_info_for_body_part(&self, part: BodyPart) -> Option<&BoneInfo>;

    fn tail_node_of_bone(&self, bone: BoneType) -> Option<NodeId>;

    // ── Body proportions ────────────────────────────────────────────────────

    fn skeleton_config(&self) -> &SkeletonConfig;

    /// Set one offset, then recompute node offsets and bone lengths.
    ///
    /// # Errors
    ///
    /// [`PoseError::InvalidOffset`] for negative or non-finite values.
    fn set_skeleton_config(
        &mut self,
        offset: SkeletonConfigOffset,
        value: f32,
    ) -> Result<(), PoseError>;

    /// Restore one offset to its default, then recompute.
    fn reset_skeleton_config(&mut self, offset: SkeletonConfigOffset);

    fn reset_all_skeleton_configs(&mut self) {
        for offset in SkeletonConfigOffset::ALL {
            self.reset_skeleton_config(offset);
        }
    }

    // ── Trackers ────────────────────────────────────────────────────────────

    fn trackers(&self) -> &[Box<dyn Tracker>];

    fn tracker_mut(&mut self, id: TrackerId) -> Option<&mut dyn Tracker>;

    fn reset_trackers_full(&mut self);

    fn reset_trackers_mounting(&mut self);

    fn reset_trackers_yaw(&mut self);

    // ── Leg tweaks & tap detection ──────────────────────────────────────────

    fn update_leg_tweaks_config(&mut self, config: &LegTweaksConfig);

    fn update_tap_detection_config(&mut self, config: &TapDetectionConfig);

    fn tap_detection_config(&self) -> &TapDetectionConfig;

    fn leg_tweaks_state(&self) -> LegTweaksState;

    fn set_leg_tweaks_enabled(&mut self, value: bool);

    fn set_floorclip_enabled(&mut self, value: bool);

    fn set_skating_correction_enabled(&mut self, value: bool);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::full_body::FullBodySkeleton;
    use crate::upper_body::UpperBodySkeleton;

    fn variants() -> Vec<Box<dyn Skeleton>> {
        vec![
            Box::new(FullBodySkeleton::new(Vec::new(), SkeletonConfig::default()).unwrap()),
            Box::new(UpperBodySkeleton::new(Vec::new(), SkeletonConfig::default()).unwrap()),
        ]
    }

    #[test]
    fn reset_all_restores_every_offset() {
        for mut skeleton in variants() {
            for offset in SkeletonConfigOffset::ALL {
                skeleton.set_skeleton_config(offset, 1.0).unwrap();
            }
            skeleton.reset_all_skeleton_configs();
            assert_eq!(*skeleton.skeleton_config(), SkeletonConfig::default(), "{}", skeleton.name());
        }
    }

    #[test]
    fn root_node_is_hmd() {
        for skeleton in variants() {
            assert_eq!(skeleton.root_node().name(), posekit_types::ROOT_NODE);
            assert_eq!(skeleton.all_nodes().len(), skeleton.tree().len());
        }
    }

    #[test]
    fn every_bone_tail_is_reachable_from_root() {
        for skeleton in variants() {
            let reachable = skeleton.tree().depth_first();
            for bone in skeleton.all_bone_info() {
                assert!(reachable.contains(&bone.tail_node()), "{:?}", bone.body_part());
            }
        }
    }

    #[test]
    fn lookups_are_absent_for_unmodelled_parts() {
        let upper = &variants()[1];
        assert!(upper.bone_info_for_body_part(BodyPart::RightLowerLeg).is_none());
        assert!(upper.tail_node_of_bone(BoneType::RightLowerLeg).is_none());
        assert!(upper.bone_info_for_body_part(BodyPart::RightHand).is_some());
        assert!(upper.tail_node_of_bone(BoneType::RightHand).is_some());
    }

    #[test]
    fn tail_node_of_bone_matches_bone_info() {
        let full = &variants()[0];
        for bone in full.all_bone_info() {
            let bone_type = BoneType::for_body_part(bone.body_part()).unwrap();
            assert_eq!(full.tail_node_of_bone(bone_type), Some(bone.tail_node()));
        }
    }
}
