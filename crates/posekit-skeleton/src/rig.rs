//! Table-driven rig engine shared by the skeleton variants.
//!
//! A [`RigLayout`] is a static description of a skeleton: its joints (node
//! name, parent, which tracker drives the joint's rotation, and how the
//! joint's offset derives from [`SkeletonConfig`]), the bones it exposes, and
//! which of those are shared with consumers.  [`Rig`] turns a layout into a
//! [`TransformTree`] plus [`BoneInfo`] list and runs the per-tick pose
//! update.
//!
//! # Example
//!
//! ```rust
//! use posekit_skeleton::config::SkeletonConfig;
//! use posekit_skeleton::rig::{FULL_BODY, Rig};
//!
//! let rig = Rig::new(&FULL_BODY, Vec::new(), SkeletonConfig::default()).unwrap();
//! assert_eq!(rig.tree().node(rig.tree().root()).name(), "HMD");
//! assert!(rig.tree().find("LEFT_FOOT").is_some());
//! ```

use glam::{Quat, Vec3};
use posekit_types::{BodyPart, BoneType, PoseError, SkeletonConfigOffset, TrackerId};
use tracing::{debug, info, warn};

use crate::bone::BoneInfo;
use crate::config::SkeletonConfig;
use crate::tracker::{Tracker, yaw_only};
use crate::transform::{NodeId, TransformTree};

// ────────────────────────────────────────────────────────────────────────────
// Layout tables
// ────────────────────────────────────────────────────────────────────────────

/// How a joint's local translation derives from the body proportions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointOffset {
    /// Joint sits on its parent.
    None,
    /// Straight down (-Y).
    Down(SkeletonConfigOffset),
    /// Backwards (+Z).
    Back(SkeletonConfigOffset),
    /// Forwards (-Z).
    Forward(SkeletonConfigOffset),
    /// Sideways by `sign * width`, optionally dropped by a second offset.
    Lateral {
        width: SkeletonConfigOffset,
        sign: f32,
        drop: Option<SkeletonConfigOffset>,
    },
}

impl JointOffset {
    pub fn resolve(&self, config: &SkeletonConfig) -> Vec3 {
        match *self {
            JointOffset::None => Vec3::ZERO,
            JointOffset::Down(o) => Vec3::new(0.0, -config.get(o), 0.0),
            JointOffset::Back(o) => Vec3::new(0.0, 0.0, config.get(o)),
            JointOffset::Forward(o) => Vec3::new(0.0, 0.0, -config.get(o)),
            JointOffset::Lateral { width, sign, drop } => Vec3::new(
                sign * config.get(width),
                drop.map_or(0.0, |d| -config.get(d)),
                0.0,
            ),
        }
    }
}

/// One joint of a rig layout.
#[derive(Debug, Clone, Copy)]
pub struct JointSpec {
    pub name: &'static str,
    /// `None` only for the first joint, which becomes the tree root.
    pub parent: Option<&'static str>,
    /// Body part whose tracker sets this joint's absolute rotation.  Without
    /// one (or without a usable tracker) the joint inherits its parent's.
    pub source: Option<BodyPart>,
    pub offset: JointOffset,
}

/// Static description of a skeleton variant.
#[derive(Debug)]
pub struct RigLayout {
    pub name: &'static str,
    /// Parents precede children.
    pub joints: &'static [JointSpec],
    pub bones: &'static [BoneType],
    pub shareable: &'static [BodyPart],
    /// Left and right foot nodes, for rigs that have legs.
    pub feet: Option<[&'static str; 2]>,
}

const fn joint(
    name: &'static str,
    parent: &'static str,
    source: Option<BodyPart>,
    offset: JointOffset,
) -> JointSpec {
    JointSpec {
        name,
        parent: Some(parent),
        source,
        offset,
    }
}

use BodyPart as P;
use SkeletonConfigOffset as O;

const ROOT_JOINT: JointSpec = JointSpec {
    name: posekit_types::ROOT_NODE,
    parent: None,
    source: Some(P::Head),
    offset: JointOffset::None,
};

const LEFT_SHOULDER: JointOffset = JointOffset::Lateral {
    width: O::ShouldersWidth,
    sign: -0.5,
    drop: Some(O::ShouldersDistance),
};
const RIGHT_SHOULDER: JointOffset = JointOffset::Lateral {
    width: O::ShouldersWidth,
    sign: 0.5,
    drop: Some(O::ShouldersDistance),
};

/// Head, torso, hips, legs, feet, arms and hands.
pub static FULL_BODY: RigLayout = RigLayout {
    name: "full-body",
    joints: &[
        ROOT_JOINT,
        joint("HEAD", "HMD", Some(P::Head), JointOffset::Back(O::Head)),
        joint("NECK", "HEAD", Some(P::Chest), JointOffset::Down(O::Neck)),
        joint("CHEST", "NECK", Some(P::Waist), JointOffset::Down(O::Chest)),
        joint("WAIST", "CHEST", Some(P::Hip), JointOffset::Down(O::Waist)),
        joint("HIP", "WAIST", None, JointOffset::Down(O::Hip)),
        joint(
            "LEFT_HIP",
            "HIP",
            Some(P::LeftUpperLeg),
            JointOffset::Lateral { width: O::HipsWidth, sign: -0.5, drop: None },
        ),
        joint("LEFT_UPPER_LEG", "LEFT_HIP", Some(P::LeftLowerLeg), JointOffset::Down(O::UpperLeg)),
        joint("LEFT_LOWER_LEG", "LEFT_UPPER_LEG", Some(P::LeftFoot), JointOffset::Down(O::LowerLeg)),
        joint("LEFT_FOOT", "LEFT_LOWER_LEG", None, JointOffset::Forward(O::FootLength)),
        joint(
            "RIGHT_HIP",
            "HIP",
            Some(P::RightUpperLeg),
            JointOffset::Lateral { width: O::HipsWidth, sign: 0.5, drop: None },
        ),
        joint("RIGHT_UPPER_LEG", "RIGHT_HIP", Some(P::RightLowerLeg), JointOffset::Down(O::UpperLeg)),
        joint("RIGHT_LOWER_LEG", "RIGHT_UPPER_LEG", Some(P::RightFoot), JointOffset::Down(O::LowerLeg)),
        joint("RIGHT_FOOT", "RIGHT_LOWER_LEG", None, JointOffset::Forward(O::FootLength)),
        joint("LEFT_SHOULDER", "NECK", Some(P::LeftUpperArm), LEFT_SHOULDER),
        joint("LEFT_UPPER_ARM", "LEFT_SHOULDER", Some(P::LeftLowerArm), JointOffset::Down(O::UpperArm)),
        joint("LEFT_LOWER_ARM", "LEFT_UPPER_ARM", Some(P::LeftHand), JointOffset::Down(O::LowerArm)),
        joint("LEFT_HAND", "LEFT_LOWER_ARM", None, JointOffset::Down(O::HandLength)),
        joint("RIGHT_SHOULDER", "NECK", Some(P::RightUpperArm), RIGHT_SHOULDER),
        joint("RIGHT_UPPER_ARM", "RIGHT_SHOULDER", Some(P::RightLowerArm), JointOffset::Down(O::UpperArm)),
        joint("RIGHT_LOWER_ARM", "RIGHT_UPPER_ARM", Some(P::RightHand), JointOffset::Down(O::LowerArm)),
        joint("RIGHT_HAND", "RIGHT_LOWER_ARM", None, JointOffset::Down(O::HandLength)),
    ],
    bones: &[
        BoneType::Head,
        BoneType::Neck,
        BoneType::Chest,
        BoneType::Waist,
        BoneType::Hip,
        BoneType::LeftUpperLeg,
        BoneType::RightUpperLeg,
        BoneType::LeftLowerLeg,
        BoneType::RightLowerLeg,
        BoneType::LeftFoot,
        BoneType::RightFoot,
        BoneType::LeftShoulder,
        BoneType::RightShoulder,
        BoneType::LeftUpperArm,
        BoneType::RightUpperArm,
        BoneType::LeftLowerArm,
        BoneType::RightLowerArm,
        BoneType::LeftHand,
        BoneType::RightHand,
    ],
    shareable: &[
        P::Chest,
        P::Hip,
        P::LeftUpperLeg,
        P::RightUpperLeg,
        P::LeftFoot,
        P::RightFoot,
        P::LeftUpperArm,
        P::RightUpperArm,
    ],
    feet: Some(["LEFT_FOOT", "RIGHT_FOOT"]),
};

/// Head, torso, arms and hands; no lower body.
pub static UPPER_BODY: RigLayout = RigLayout {
    name: "upper-body",
    joints: &[
        ROOT_JOINT,
        joint("HEAD", "HMD", Some(P::Head), JointOffset::Back(O::Head)),
        joint("NECK", "HEAD", Some(P::Chest), JointOffset::Down(O::Neck)),
        joint("CHEST", "NECK", None, JointOffset::Down(O::Chest)),
        joint("LEFT_SHOULDER", "NECK", Some(P::LeftUpperArm), LEFT_SHOULDER),
        joint("LEFT_UPPER_ARM", "LEFT_SHOULDER", Some(P::LeftLowerArm), JointOffset::Down(O::UpperArm)),
        joint("LEFT_LOWER_ARM", "LEFT_UPPER_ARM", Some(P::LeftHand), JointOffset::Down(O::LowerArm)),
        joint("LEFT_HAND", "LEFT_LOWER_ARM", None, JointOffset::Down(O::HandLength)),
        joint("RIGHT_SHOULDER", "NECK", Some(P::RightUpperArm), RIGHT_SHOULDER),
        joint("RIGHT_UPPER_ARM", "RIGHT_SHOULDER", Some(P::RightLowerArm), JointOffset::Down(O::UpperArm)),
        joint("RIGHT_LOWER_ARM", "RIGHT_UPPER_ARM", Some(P::RightHand), JointOffset::Down(O::LowerArm)),
        joint("RIGHT_HAND", "RIGHT_LOWER_ARM", None, JointOffset::Down(O::HandLength)),
    ],
    bones: &[
        BoneType::Head,
        BoneType::Neck,
        BoneType::Chest,
        BoneType::LeftShoulder,
        BoneType::RightShoulder,
        BoneType::LeftUpperArm,
        BoneType::RightUpperArm,
        BoneType::LeftLowerArm,
        BoneType::RightLowerArm,
        BoneType::LeftHand,
        BoneType::RightHand,
    ],
    shareable: &[
        P::Chest,
        P::LeftUpperArm,
        P::RightUpperArm,
        P::LeftHand,
        P::RightHand,
    ],
    feet: None,
};

// ────────────────────────────────────────────────────────────────────────────
// Rig engine
// ────────────────────────────────────────────────────────────────────────────

/// A built rig: tree, bones, trackers and body proportions.
pub struct Rig {
    layout: &'static RigLayout,
    tree: TransformTree,
    /// Parent joint index per joint; node ids equal joint indices.
    parents: Vec<Option<usize>>,
    bones: Vec<BoneInfo>,
    shareable: Vec<usize>,
    feet: Option<[NodeId; 2]>,
    trackers: Vec<Box<dyn Tracker>>,
    config: SkeletonConfig,
}

impl Rig {
    /// Build a rig from `layout`.
    ///
    /// # Errors
    ///
    /// - [`PoseError::DuplicateNode`] if two joints share a name.
    /// - [`PoseError::UnknownNode`] if a joint's parent is not declared
    ///   before it, or a bone's nodes are missing from the layout.
    /// - [`PoseError::MissingParent`] if a bone's tail is the root, or a
    ///   joint other than the first has no parent.
    /// - [`PoseError::InvalidOffset`] if `config` holds a negative or
    ///   non-finite offset.
    pub fn new(
        layout: &'static RigLayout,
        trackers: Vec<Box<dyn Tracker>>,
        config: SkeletonConfig,
    ) -> Result<Self, PoseError> {
        config.validate()?;
        let (first, rest) = layout
            .joints
            .split_first()
            .ok_or_else(|| PoseError::UnknownNode(posekit_types::ROOT_NODE.to_string()))?;

        let mut tree = TransformTree::new(first.name);
        let mut parents = vec![None];
        for spec in rest {
            if tree.find(spec.name).is_some() {
                return Err(PoseError::DuplicateNode(spec.name.to_string()));
            }
            let parent_name = spec
                .parent
                .ok_or_else(|| PoseError::MissingParent(spec.name.to_string()))?;
            let parent = tree
                .find(parent_name)
                .ok_or_else(|| PoseError::UnknownNode(parent_name.to_string()))?;
            tree.add_child(parent, spec.name)?;
            parents.push(Some(parent.index()));
        }

        for (i, spec) in layout.joints.iter().enumerate() {
            tree.set_local_translation(NodeId::from_index(i), spec.offset.resolve(&config));
        }
        tree.update_world();

        let mut bones = Vec::with_capacity(layout.bones.len());
        for bone in layout.bones {
            let tail = tree
                .find(bone.tail_node())
                .ok_or_else(|| PoseError::UnknownNode(bone.tail_node().to_string()))?;
            let info = BoneInfo::new(&tree, bone.body_part(), tail)?;
            if tree.node(info.head_node()).name() != bone.head_node() {
                return Err(PoseError::UnknownNode(bone.head_node().to_string()));
            }
            bones.push(info);
        }

        let shareable = bones
            .iter()
            .enumerate()
            .filter(|(_, b)| layout.shareable.contains(&b.body_part()))
            .map(|(i, _)| i)
            .collect();

        let feet = match layout.feet {
            Some([left, right]) => {
                let find = |name: &str| {
                    tree.find(name)
                        .ok_or_else(|| PoseError::UnknownNode(name.to_string()))
                };
                Some([find(left)?, find(right)?])
            }
            None => None,
        };

        info!(
            rig = layout.name,
            nodes = tree.len(),
            bones = bones.len(),
            trackers = trackers.len(),
            "Skeleton rig built"
        );

        Ok(Self {
            layout,
            tree,
            parents,
            bones,
            shareable,
            feet,
            trackers,
            config,
        })
    }

    pub fn layout(&self) -> &'static RigLayout {
        self.layout
    }

    pub fn tree(&self) -> &TransformTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut TransformTree {
        &mut self.tree
    }

    pub fn bones(&self) -> &[BoneInfo] {
        &self.bones
    }

    pub fn shareable_bones(&self) -> Vec<&BoneInfo> {
        self.shareable.iter().map(|&i| &self.bones[i]).collect()
    }

    /// Bone whose body part is `part`.  [`BodyPart::None`] never matches.
    pub fn bone_for_body_part(&self, part: BodyPart) -> Option<&BoneInfo> {
        if part == BodyPart::None {
            return None;
        }
        self.bones.iter().find(|b| b.body_part() == part)
    }

    /// Tail node of `bone`, if this rig has that bone.
    pub fn tail_node_of_bone(&self, bone: BoneType) -> Option<NodeId> {
        if !self.layout.bones.contains(&bone) {
            return None;
        }
        self.tree.find(bone.tail_node())
    }

    pub fn feet(&self) -> Option<[NodeId; 2]> {
        self.feet
    }

    // ── Calibration ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &SkeletonConfig {
        &self.config
    }

    /// Set one body proportion and recompute offsets and bone lengths.
    pub fn set_config_offset(
        &mut self,
        offset: SkeletonConfigOffset,
        value: f32,
    ) -> Result<(), PoseError> {
        if let Err(e) = self.config.set(offset, value) {
            warn!(offset = ?offset, value, "Rejected skeleton offset");
            return Err(e);
        }
        info!(offset = ?offset, value, "Skeleton offset updated");
        self.apply_config();
        Ok(())
    }

    pub fn reset_config_offset(&mut self, offset: SkeletonConfigOffset) {
        self.config.reset(offset);
        info!(offset = ?offset, value = self.config.get(offset), "Skeleton offset reset");
        self.apply_config();
    }

    /// Push the current proportions into node offsets and bone lengths.
    ///
    /// The root keeps its translation, which belongs to the pose.  World
    /// transforms are left as published; the next
    /// [`update_pose`](Self::update_pose) propagates the new offsets.
    pub fn apply_config(&mut self) {
        let layout = self.layout;
        for (i, spec) in layout.joints.iter().enumerate().skip(1) {
            self.tree
                .set_local_translation(NodeId::from_index(i), spec.offset.resolve(&self.config));
        }
        for bone in &mut self.bones {
            bone.update_length(&self.tree);
        }
    }

    // ── Trackers ────────────────────────────────────────────────────────────

    pub fn trackers(&self) -> &[Box<dyn Tracker>] {
        &self.trackers
    }

    pub fn tracker_mut(&mut self, id: TrackerId) -> Option<&mut dyn Tracker> {
        for tracker in &mut self.trackers {
            if tracker.id() == id {
                return Some(tracker.as_mut());
            }
        }
        None
    }

    /// First usable tracker worn on `part`.
    fn tracker_for(&self, part: BodyPart) -> Option<&dyn Tracker> {
        self.trackers
            .iter()
            .map(|t| &**t)
            .find(|t| t.body_part() == part && t.status().is_usable())
    }

    /// Recompute every local rotation from the trackers, place the root at the
    /// head tracker, then propagate.
    pub fn update_pose(&mut self) {
        let layout = self.layout;
        let mut absolute: Vec<Quat> = Vec::with_capacity(layout.joints.len());
        for (i, spec) in layout.joints.iter().enumerate() {
            let parent_abs = self.parents[i].map_or(Quat::IDENTITY, |p| absolute[p]);
            let abs = spec
                .source
                .and_then(|part| self.tracker_for(part))
                .map_or(parent_abs, |t| t.rotation());
            let local = (parent_abs.inverse() * abs).normalize();
            self.tree.set_local_rotation(NodeId::from_index(i), local);
            absolute.push(abs);
        }

        let root_translation = self
            .tracker_for(BodyPart::Head)
            .and_then(|t| t.position())
            .unwrap_or(Vec3::ZERO);
        let root = self.tree.root();
        self.tree.set_local_translation(root, root_translation);

        self.tree.update_world();
        debug!(rig = layout.name, "Pose updated");
    }

    // ── Resets ──────────────────────────────────────────────────────────────

    /// Heading of the head tracker, and its index so it is not reset
    /// against itself.
    fn reset_reference(&self) -> (Option<usize>, Quat) {
        self.trackers
            .iter()
            .position(|t| t.body_part() == BodyPart::Head && t.status().is_usable())
            .map_or((None, Quat::IDENTITY), |i| {
                (Some(i), yaw_only(self.trackers[i].rotation()))
            })
    }

    pub fn reset_trackers_full(&mut self) {
        let (skip, reference) = self.reset_reference();
        let count = self.for_each_reset_target(skip, |t| t.reset_full(reference));
        info!(rig = self.layout.name, trackers = count, "Full reset");
    }

    pub fn reset_trackers_yaw(&mut self) {
        let (skip, reference) = self.reset_reference();
        let count = self.for_each_reset_target(skip, |t| t.reset_yaw(reference));
        info!(rig = self.layout.name, trackers = count, "Yaw reset");
    }

    pub fn reset_trackers_mounting(&mut self) {
        let (skip, reference) = self.reset_reference();
        let count = self.for_each_reset_target(skip, |t| t.reset_mounting(reference));
        info!(rig = self.layout.name, trackers = count, "Mounting reset");
    }

    fn for_each_reset_target(
        &mut self,
        skip: Option<usize>,
        mut f: impl FnMut(&mut dyn Tracker),
    ) -> usize {
        let mut count = 0;
        for (i, tracker) in self.trackers.iter_mut().enumerate() {
            if Some(i) == skip || tracker.is_computed() {
                continue;
            }
            f(tracker.as_mut());
            count += 1;
        }
        count
    }
}
