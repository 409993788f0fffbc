//! [`BoneInfo`] – per-bone view over a [`TransformTree`].
//!
//! A bone is identified by its *tail* node: the length of the bone is the
//! tail's offset from its parent (the head), while the bone's orientation is
//! the head node's rotation.  `BoneInfo` does not borrow the tree; every
//! query takes the tree it was built from.
//!
//! # Root-relative queries
//!
//! [`BoneInfo::local_bone_translation_from_root`] and
//! [`BoneInfo::local_bone_rotation_from_root`] express a bone relative to
//! another bone treated as a temporary origin.  Rigs rarely share a clean
//! common ancestor, so the queries walk a fixed ladder:
//!
//! 1. the bone is the root itself;
//! 2. a breadth-first search below the root finds a node named like this
//!    bone's tail ([`find_node_towards`]);
//! 3. (rotation only) the root is an ancestor per [`is_ancestor`], so the
//!    grandparent is used as reference;
//! 4. the grandparent translation, or the raw local rotation.
//!
//! Step 3 never fires in practice.  When the root is an ancestor, this
//! bone's tail lies below the root's tail, so the search in step 2 always
//! finds a node with the tail's name (the tail itself at the latest).

use std::collections::VecDeque;
use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};
use posekit_types::{BodyPart, HumanoidBone, PoseError};

use crate::transform::{NodeId, Transform, TransformTree};

/// Pose information for one skeletal bone.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneInfo {
    body_part: BodyPart,
    tail: NodeId,
    head: NodeId,
    length: f32,
}

impl BoneInfo {
    /// Create a bone ending at `tail` and compute its initial length.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::MissingParent`] when `tail` is the tree root, and
    /// [`PoseError::UnknownNode`] when it is not part of `tree`.
    pub fn new(tree: &TransformTree, body_part: BodyPart, tail: NodeId) -> Result<Self, PoseError> {
        let node = tree
            .get(tail)
            .ok_or_else(|| PoseError::UnknownNode(format!("#{}", tail.index())))?;
        let head = node
            .parent()
            .ok_or_else(|| PoseError::MissingParent(node.name().to_string()))?;
        let mut bone = Self {
            body_part,
            tail,
            head,
            length: 0.0,
        };
        bone.update_length(tree);
        Ok(bone)
    }

    pub fn body_part(&self) -> BodyPart {
        self.body_part
    }

    pub fn tail_node(&self) -> NodeId {
        self.tail
    }

    /// Parent of the tail node.
    pub fn head_node(&self) -> NodeId {
        self.head
    }

    /// Cached length, valid as of the last [`update_length`](Self::update_length).
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Recompute [`length`](Self::length) from the tail's local translation.
    ///
    /// Nothing calls this automatically; the owner must call it after
    /// changing the tail's offset.
    pub fn update_length(&mut self, tree: &TransformTree) {
        self.length = tree.node(self.tail).local().translation.length();
    }

    /// Head node's local rotation with the body-part correction applied.
    pub fn local_rotation(&self, tree: &TransformTree) -> Quat {
        let rot = tree.node(self.head).local().rotation;
        match self.body_part {
            BodyPart::LeftFoot | BodyPart::RightFoot => rot * Quat::from_rotation_x(FRAC_PI_2),
            _ => rot,
        }
    }

    /// Head node's world rotation with the body-part correction applied.
    pub fn global_rotation(&self, tree: &TransformTree) -> Quat {
        let rot = tree.node(self.head).world().rotation;
        match self.body_part {
            BodyPart::LeftFoot | BodyPart::RightFoot => rot * Quat::from_rotation_x(FRAC_PI_2),
            BodyPart::LeftLowerArm | BodyPart::RightLowerArm => rot * Quat::from_rotation_x(PI),
            _ => rot,
        }
    }

    /// This bone's world translation relative to `root`.
    ///
    /// `restrict_to_humanoid` limits search matches to nodes whose parent is
    /// part of the [`HumanoidBone`] set; see [`find_node_towards`].
    pub fn local_bone_translation_from_root(
        &self,
        tree: &TransformTree,
        root: &BoneInfo,
        restrict_to_humanoid: bool,
    ) -> Vec3 {
        if self.is_same_bone(root) {
            return Vec3::ZERO;
        }
        let own = tree.node(self.tail).world().translation;
        match find_node_towards(tree, root.tail, self.tail, restrict_to_humanoid) {
            Some(towards) => own - tree.node(towards).world().translation,
            None => own - self.grandparent_world(tree).translation,
        }
    }

    /// This bone's world rotation relative to `root`.
    pub fn local_bone_rotation_from_root(
        &self,
        tree: &TransformTree,
        root: &BoneInfo,
        restrict_to_humanoid: bool,
    ) -> Quat {
        let own = tree.node(self.tail).world().rotation;
        if self.is_same_bone(root) {
            return own;
        }
        if let Some(towards) = find_node_towards(tree, root.tail, self.tail, restrict_to_humanoid) {
            own * tree.node(towards).world().rotation.inverse()
        } else if is_ancestor(tree, self.tail, root.tail) {
            own * self.grandparent_world(tree).rotation.inverse()
        } else {
            tree.node(self.tail).local().rotation
        }
    }

    fn is_same_bone(&self, other: &BoneInfo) -> bool {
        self.tail == other.tail
    }

    // The head of a bone hanging directly off the root has no parent; the
    // world origin stands in for the missing grandparent.
    fn grandparent_world(&self, tree: &TransformTree) -> Transform {
        tree.parent(self.head)
            .map(|gp| *tree.node(gp).world())
            .unwrap_or(Transform::IDENTITY)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Search primitives
// ────────────────────────────────────────────────────────────────────────────

/// Breadth-first search of `from`'s descendants for a node whose name matches
/// `towards`'s name, ignoring ASCII case.
///
/// The queue starts with `from`'s direct children and expands each node's
/// children in list order, so the shallowest match wins and ties go to the
/// earlier sibling.  `from` itself is never a candidate.
///
/// With `restrict_to_humanoid`, a match whose parent is not a
/// [`HumanoidBone`] node is replaced by that parent.
pub fn find_node_towards(
    tree: &TransformTree,
    from: NodeId,
    towards: NodeId,
    restrict_to_humanoid: bool,
) -> Option<NodeId> {
    let target = tree.node(towards).name();
    let mut queue: VecDeque<NodeId> = tree.node(from).children().iter().copied().collect();

    while let Some(current) = queue.pop_front() {
        let node = tree.node(current);
        if node.name().eq_ignore_ascii_case(target) {
            if !restrict_to_humanoid {
                return Some(current);
            }
            return match node.parent() {
                Some(parent) if !HumanoidBone::is_known_node(tree.node(parent).name()) => {
                    Some(parent)
                }
                _ => Some(current),
            };
        }
        queue.extend(node.children().iter().copied());
    }

    None
}

/// Whether `towards` is an ancestor of `from`, *excluding* the immediate
/// parent.
///
/// Returns `false` when `towards` is `from`'s parent and `true` when it is
/// the grandparent or any node further up.
pub fn is_ancestor(tree: &TransformTree, from: NodeId, towards: NodeId) -> bool {
    let mut searching = from;
    while let Some(parent) = tree.parent(searching) {
        if parent == towards {
            break;
        }
        searching = parent;
        if tree.parent(searching) == Some(towards) {
            return true;
        }
    }
    false
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
