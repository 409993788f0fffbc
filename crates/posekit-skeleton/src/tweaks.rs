//! Post-pose corrections for the lower body, and the tap-detection settings
//! skeletons keep on behalf of the reset gesture detector.
//!
//! [`LegTweaks`] runs after world transforms are propagated:
//!
//! - **floor clip** raises the whole rig so neither foot ends below the floor;
//! - **skating correction** pins a foot's horizontal position while it stays
//!   in floor contact, shifting the rig root to compensate for drift.
//!
//! Both passes only ever move the root node, so bone lengths and local
//! rotations are untouched.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::transform::{NodeId, TransformTree};

// ────────────────────────────────────────────────────────────────────────────
// Settings
// ────────────────────────────────────────────────────────────────────────────

/// Leg-tweak settings, typically loaded from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegTweaksConfig {
    pub enabled: bool,
    pub floor_clip: bool,
    pub skating_correction: bool,
    /// World-space height of the floor, in metres.
    pub floor_level: f32,
    /// A foot within this distance above the floor counts as touching it.
    pub contact_threshold: f32,
}

impl Default for LegTweaksConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            floor_clip: true,
            skating_correction: true,
            floor_level: 0.0,
            contact_threshold: 0.02,
        }
    }
}

/// Current on/off state of the leg tweaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegTweaksState {
    pub enabled: bool,
    pub floor_clip: bool,
    pub skating_correction: bool,
}

impl LegTweaksState {
    /// `[enabled, floor_clip, skating_correction]`.
    pub fn as_array(self) -> [bool; 3] {
        [self.enabled, self.floor_clip, self.skating_correction]
    }
}

/// Tap counts and delays for the tap-to-reset gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapDetectionConfig {
    pub full_reset_taps: u8,
    pub full_reset_delay_ms: u64,
    pub yaw_reset_taps: u8,
    pub yaw_reset_delay_ms: u64,
    pub mounting_reset_taps: u8,
    pub mounting_reset_delay_ms: u64,
}

impl Default for TapDetectionConfig {
    fn default() -> Self {
        Self {
            full_reset_taps: 3,
            full_reset_delay_ms: 3000,
            yaw_reset_taps: 2,
            yaw_reset_delay_ms: 200,
            mounting_reset_taps: 3,
            mounting_reset_delay_ms: 3000,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Passes
// ────────────────────────────────────────────────────────────────────────────

/// Floor clip and skating correction for a two-footed rig.
#[derive(Debug, Clone, Default)]
pub struct LegTweaks {
    config: LegTweaksConfig,
    /// World-space horizontal anchor of each planted foot.
    anchors: [Option<Vec3>; 2],
}

impl LegTweaks {
    pub fn from_config(config: LegTweaksConfig) -> Self {
        Self {
            config,
            anchors: [None, None],
        }
    }

    pub fn config(&self) -> &LegTweaksConfig {
        &self.config
    }

    /// Replace the settings.  Anchors are dropped so a re-enabled skating
    /// correction starts from the current foot positions.
    pub fn update_config(&mut self, config: LegTweaksConfig) {
        self.config = config;
        self.anchors = [None, None];
    }

    pub fn state(&self) -> LegTweaksState {
        LegTweaksState {
            enabled: self.config.enabled,
            floor_clip: self.config.floor_clip,
            skating_correction: self.config.skating_correction,
        }
    }

    pub fn set_enabled(&mut self, value: bool) {
        self.config.enabled = value;
        if !value {
            self.anchors = [None, None];
        }
    }

    pub fn set_floor_clip(&mut self, value: bool) {
        self.config.floor_clip = value;
    }

    pub fn set_skating_correction(&mut self, value: bool) {
        self.config.skating_correction = value;
        if !value {
            self.anchors = [None, None];
        }
    }

    /// Run the enabled passes on a propagated tree.
    ///
    /// Returns the offset applied to the root; world transforms are
    /// re-propagated when it is non-zero.
    pub fn apply(&mut self, tree: &mut TransformTree, feet: [NodeId; 2]) -> Vec3 {
        if !self.config.enabled {
            return Vec3::ZERO;
        }

        let positions = feet.map(|foot| tree.node(foot).world().translation);
        let mut shift = Vec3::ZERO;

        if self.config.floor_clip {
            let lowest = positions[0].y.min(positions[1].y);
            if lowest < self.config.floor_level {
                shift.y = self.config.floor_level - lowest;
            }
        }

        if self.config.skating_correction {
            let mut correction: Option<Vec3> = None;
            for (i, position) in positions.iter().enumerate() {
                let moved = *position + shift;
                let touching = moved.y - self.config.floor_level <= self.config.contact_threshold;
                if !touching {
                    self.anchors[i] = None;
                    continue;
                }
                match self.anchors[i] {
                    Some(anchor) => {
                        if correction.is_none() {
                            correction = Some(Vec3::new(anchor.x - moved.x, 0.0, anchor.z - moved.z));
                        }
                    }
                    None => self.anchors[i] = Some(Vec3::new(moved.x, 0.0, moved.z)),
                }
            }
            if let Some(delta) = correction {
                shift += delta;
            }
        }

        if shift != Vec3::ZERO {
            let root = tree.root();
            let translation = tree.node(root).local().translation + shift;
            tree.set_local_translation(root, translation);
            tree.update_world();
        }
        shift
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    /// root at the given height with two feet hanging 1 m below it.
    fn rig(height: f32) -> (TransformTree, [NodeId; 2]) {
        let mut tree = TransformTree::new("HMD");
        let left = tree.add_child(tree.root(), "LEFT_FOOT").unwrap();
        let right = tree.add_child(tree.root(), "RIGHT_FOOT").unwrap();
        tree.set_local_translation(tree.root(), Vec3::new(0.0, height, 0.0));
        tree.set_local_translation(left, Vec3::new(-0.1, -1.0, 0.0));
        tree.set_local_translation(right, Vec3::new(0.1, -1.0, 0.0));
        tree.update_world();
        (tree, [left, right])
    }

    fn clip_only() -> LegTweaksConfig {
        LegTweaksConfig {
            skating_correction: false,
            ..LegTweaksConfig::default()
        }
    }

    #[test]
    fn state_array_order() {
        let tweaks = LegTweaks::from_config(LegTweaksConfig {
            enabled: true,
            floor_clip: false,
            skating_correction: true,
            ..LegTweaksConfig::default()
        });
        assert_eq!(tweaks.state().as_array(), [true, false, true]);
    }

    #[test]
    fn floor_clip_raises_rig() {
        let (mut tree, feet) = rig(0.8);
        let mut tweaks = LegTweaks::from_config(clip_only());
        let shift = tweaks.apply(&mut tree, feet);
        assert!((shift.y - 0.2).abs() < EPS);
        assert!(tree.node(feet[0]).world().translation.y.abs() < EPS);
    }

    #[test]
    fn floor_clip_leaves_standing_rig_alone() {
        let (mut tree, feet) = rig(1.5);
        let mut tweaks = LegTweaks::from_config(clip_only());
        assert_eq!(tweaks.apply(&mut tree, feet), Vec3::ZERO);
    }

    #[test]
    fn disabled_does_nothing() {
        let (mut tree, feet) = rig(0.5);
        let mut tweaks = LegTweaks::from_config(LegTweaksConfig::default());
        tweaks.set_enabled(false);
        assert_eq!(tweaks.apply(&mut tree, feet), Vec3::ZERO);
        assert_eq!(tweaks.state().as_array(), [false, true, true]);
    }

    #[test]
    fn skating_correction_pins_planted_foot() {
        let (mut tree, feet) = rig(1.0);
        let mut tweaks = LegTweaks::from_config(LegTweaksConfig::default());
        // First tick plants both feet.
        assert_eq!(tweaks.apply(&mut tree, feet), Vec3::ZERO);

        // Tracker drift slides the whole rig forward.
        let root = tree.root();
        tree.set_local_translation(root, Vec3::new(0.0, 1.0, -0.05));
        tree.update_world();
        let shift = tweaks.apply(&mut tree, feet);

        assert!((shift.z - 0.05).abs() < EPS);
        let left = tree.node(feet[0]).world().translation;
        assert!((left.x + 0.1).abs() < EPS);
        assert!(left.z.abs() < EPS);
    }

    #[test]
    fn lifted_foot_releases_anchor() {
        let (mut tree, feet) = rig(1.0);
        let mut tweaks = LegTweaks::from_config(LegTweaksConfig::default());
        tweaks.apply(&mut tree, feet);

        // Both feet off the floor: no correction, anchors dropped.
        let root = tree.root();
        tree.set_local_translation(root, Vec3::new(0.0, 1.3, -0.2));
        tree.update_world();
        assert_eq!(tweaks.apply(&mut tree, feet), Vec3::ZERO);

        // Landing somewhere new re-anchors instead of snapping back.
        tree.set_local_translation(root, Vec3::new(0.0, 1.0, -0.2));
        tree.update_world();
        assert_eq!(tweaks.apply(&mut tree, feet), Vec3::ZERO);
    }

    #[test]
    fn tap_detection_defaults() {
        let config = TapDetectionConfig::default();
        assert_eq!(config.yaw_reset_taps, 2);
        assert_eq!(config.full_reset_taps, 3);
    }
}
