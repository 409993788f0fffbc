//! Transform tree.
//!
//! A [`TransformTree`] is an arena of [`TransformNode`]s addressed by
//! [`NodeId`].  Each node owns an ordered list of child ids and keeps a
//! non-owning back-reference to its parent, so the tree has no reference
//! cycles and its shape is fixed once built.
//!
//! Nodes carry a *local* transform (relative to the parent) that callers
//! write, and a *world* transform (relative to the tree root) that only
//! [`TransformTree::update_world`] writes.
//!
//! # Example
//!
//! ```rust
//! use glam::{Quat, Vec3};
//! use posekit_skeleton::transform::{Transform, TransformTree};
//!
//! let mut tree = TransformTree::new("root");
//! let spine = tree.add_child(tree.root(), "spine").unwrap();
//! let head = tree.add_child(spine, "head").unwrap();
//!
//! tree.set_local(spine, Transform::new(Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY));
//! tree.set_local(head, Transform::new(Vec3::new(0.0, 0.5, 0.0), Quat::IDENTITY));
//! tree.update_world();
//!
//! assert!((tree.node(head).world().translation.y - 1.5).abs() < 1e-5);
//! ```

use glam::{Quat, Vec3};
use posekit_types::PoseError;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Transform
// ────────────────────────────────────────────────────────────────────────────

/// A rigid-body transform: rotation followed by translation.
///
/// To map a point expressed in the child frame into the parent frame, rotate
/// it by `rotation` then add `translation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    /// Compose two transforms: `self` is the parent frame, `child` is
    /// expressed relative to it.
    ///
    /// If `self` = T_A_B and `child` = T_B_C, the result is T_A_C.
    pub fn compose(self, child: Self) -> Self {
        Self::new(
            self.translation + self.rotation * child.translation,
            self.rotation * child.rotation,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ────────────────────────────────────────────────────────────────────────────
// TransformNode
// ────────────────────────────────────────────────────────────────────────────

/// Index of a node inside the [`TransformTree`] that created it.
///
/// Ids are only meaningful for their own tree; passing an id to another tree
/// is a programming error and panics on out-of-range access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }

    /// Nodes are numbered in creation order, so a caller that builds a tree
    /// from a fixed table can address nodes by table position.
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// One node of a [`TransformTree`].
#[derive(Debug, Clone)]
pub struct TransformNode {
    name: String,
    local: Transform,
    world: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TransformNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transform relative to the parent node.
    pub fn local(&self) -> &Transform {
        &self.local
    }

    /// Transform relative to the tree root, as of the last
    /// [`TransformTree::update_world`] pass.
    pub fn world(&self) -> &Transform {
        &self.world
    }

    /// `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

// ────────────────────────────────────────────────────────────────────────────
// TransformTree
// ────────────────────────────────────────────────────────────────────────────

/// Arena-backed tree of [`TransformNode`]s.
///
/// Nodes are append-only and a child is always created after its parent, so
/// a node's index is strictly greater than its parent's.  Propagation relies
/// on that ordering.
#[derive(Debug, Clone)]
pub struct TransformTree {
    nodes: Vec<TransformNode>,
}

impl TransformTree {
    /// Create a tree containing only a root node.
    pub fn new(root_name: &str) -> Self {
        Self {
            nodes: vec![TransformNode {
                name: root_name.to_string(),
                local: Transform::IDENTITY,
                world: Transform::IDENTITY,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a new node under `parent`, after any existing children.
    ///
    /// Names need not be unique; name lookups resolve to the first match.
    ///
    /// # Errors
    ///
    /// Returns [`PoseError::UnknownNode`] if `parent` does not belong to this
    /// tree.
    pub fn add_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId, PoseError> {
        if parent.0 >= self.nodes.len() {
            return Err(PoseError::UnknownNode(format!("#{}", parent.0)));
        }
        let id = NodeId(self.nodes.len());
        let world = self.nodes[parent.0].world;
        self.nodes.push(TransformNode {
            name: name.to_string(),
            local: Transform::IDENTITY,
            world,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> &TransformNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&TransformNode> {
        self.nodes.get(id.0)
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[TransformNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`; a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node (in creation order) whose name equals `name` exactly.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn set_local(&mut self, id: NodeId, local: Transform) {
        self.nodes[id.0].local = local;
    }

    pub fn set_local_translation(&mut self, id: NodeId, translation: Vec3) {
        self.nodes[id.0].local.translation = translation;
    }

    pub fn set_local_rotation(&mut self, id: NodeId, rotation: Quat) {
        self.nodes[id.0].local.rotation = rotation;
    }

    /// Recompute every world transform from the local transforms, root
    /// first.
    ///
    /// The root's world transform equals its local transform.  Every other
    /// node gets `parent.world ∘ local`.  Walking the arena in index order is
    /// a valid top-down order because parents always precede children.
    pub fn update_world(&mut self) {
        for i in 0..self.nodes.len() {
            let world = match self.nodes[i].parent {
                Some(parent) => self.nodes[parent.0].world.compose(self.nodes[i].local),
                None => self.nodes[i].local,
            };
            self.nodes[i].world = world;
        }
    }

    /// Pre-order depth-first traversal from the root, children in order.
    ///
    /// The order only depends on the tree shape, so it is identical on every
    /// call; exporters rely on that.
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev());
        }
        order
    }

    /// Depth of `id` below the root (the root has depth 0).
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes[id.0].parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent.0].parent;
        }
        depth
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-5;

    fn approx_vec(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPS
    }

    fn approx_quat(a: Quat, b: Quat) -> bool {
        // q and -q encode the same rotation.
        a.dot(b).abs() > 1.0 - EPS
    }

    // ── Transform ───────────────────────────────────────────────────────────

    #[test]
    fn identity_compose_is_noop() {
        let t = Transform::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.3));
        let composed = Transform::IDENTITY.compose(t);
        assert!(approx_vec(composed.translation, t.translation));
        assert!(approx_quat(composed.rotation, t.rotation));
    }

    #[test]
    fn compose_rotates_child_translation() {
        let parent = Transform::new(Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_2));
        let child = Transform::from_translation(Vec3::X);
        let composed = parent.compose(child);
        assert!(approx_vec(composed.translation, Vec3::Y), "{:?}", composed.translation);
    }

    // ── Tree shape ──────────────────────────────────────────────────────────

    #[test]
    fn add_child_links_both_directions() {
        let mut tree = TransformTree::new("root");
        let a = tree.add_child(tree.root(), "a").unwrap();
        let b = tree.add_child(tree.root(), "b").unwrap();
        let c = tree.add_child(a, "c").unwrap();

        assert_eq!(tree.node(tree.root()).children(), &[a, b]);
        assert_eq!(tree.node(a).children(), &[c]);
        assert_eq!(tree.parent(c), Some(a));
        assert_eq!(tree.parent(tree.root()), None);
        assert_eq!(tree.len(), 4);
        assert!(!tree.is_empty());
    }

    #[test]
    fn add_child_rejects_foreign_parent() {
        let mut tree = TransformTree::new("root");
        let result = tree.add_child(NodeId(42), "orphan");
        assert!(matches!(result, Err(PoseError::UnknownNode(_))));
    }

    #[test]
    fn find_returns_first_match() {
        let mut tree = TransformTree::new("root");
        let first = tree.add_child(tree.root(), "dup").unwrap();
        let _second = tree.add_child(first, "dup").unwrap();
        assert_eq!(tree.find("dup"), Some(first));
        assert_eq!(tree.find("ghost"), None);
    }

    #[test]
    fn depth_first_is_preorder_and_repeatable() {
        let mut tree = TransformTree::new("root");
        let a = tree.add_child(tree.root(), "a").unwrap();
        let b = tree.add_child(tree.root(), "b").unwrap();
        let a1 = tree.add_child(a, "a1").unwrap();
        let b1 = tree.add_child(b, "b1").unwrap();
        let a2 = tree.add_child(a, "a2").unwrap();

        let order = tree.depth_first();
        assert_eq!(order, vec![tree.root(), a, a1, a2, b, b1]);
        assert_eq!(order, tree.depth_first());
    }

    #[test]
    fn depth_counts_edges_to_root() {
        let mut tree = TransformTree::new("root");
        let a = tree.add_child(tree.root(), "a").unwrap();
        let b = tree.add_child(a, "b").unwrap();
        assert_eq!(tree.depth(tree.root()), 0);
        assert_eq!(tree.depth(b), 2);
    }

    // ── Propagation ─────────────────────────────────────────────────────────

    #[test]
    fn three_node_chain_world_translations() {
        let mut tree = TransformTree::new("root");
        let spine = tree.add_child(tree.root(), "spine").unwrap();
        let head = tree.add_child(spine, "head").unwrap();
        tree.set_local_translation(spine, Vec3::new(0.0, 1.0, 0.0));
        tree.set_local_translation(head, Vec3::new(0.0, 0.5, 0.0));
        tree.update_world();

        assert!(approx_vec(tree.node(tree.root()).world().translation, Vec3::ZERO));
        assert!(approx_vec(tree.node(spine).world().translation, Vec3::new(0.0, 1.0, 0.0)));
        assert!(approx_vec(tree.node(head).world().translation, Vec3::new(0.0, 1.5, 0.0)));
    }

    #[test]
    fn root_world_equals_local() {
        let mut tree = TransformTree::new("root");
        let local = Transform::new(Vec3::new(3.0, 1.0, -2.0), Quat::from_rotation_x(0.7));
        tree.set_local(tree.root(), local);
        tree.update_world();
        assert_eq!(*tree.node(tree.root()).world(), local);
    }

    #[test]
    fn propagation_invariant_holds_for_every_node() {
        let mut tree = TransformTree::new("root");
        let a = tree.add_child(tree.root(), "a").unwrap();
        let b = tree.add_child(a, "b").unwrap();
        let c = tree.add_child(a, "c").unwrap();
        let d = tree.add_child(c, "d").unwrap();

        tree.set_local(
            tree.root(),
            Transform::new(Vec3::new(0.0, 1.7, 0.0), Quat::from_rotation_y(0.4)),
        );
        tree.set_local(a, Transform::new(Vec3::new(0.1, -0.2, 0.0), Quat::from_rotation_z(0.9)));
        tree.set_local(b, Transform::new(Vec3::new(0.0, -0.4, 0.3), Quat::from_rotation_x(-1.1)));
        tree.set_local(c, Transform::new(Vec3::new(0.2, 0.0, 0.0), Quat::from_rotation_y(2.0)));
        tree.set_local(d, Transform::new(Vec3::new(0.0, 0.0, 0.5), Quat::IDENTITY));
        tree.update_world();

        for node in tree.nodes() {
            match node.parent() {
                Some(parent) => {
                    let pw = tree.node(parent).world();
                    let expected_rot = pw.rotation * node.local().rotation;
                    let expected_pos = pw.translation + pw.rotation * node.local().translation;
                    assert!(approx_quat(node.world().rotation, expected_rot), "{}", node.name());
                    assert!(approx_vec(node.world().translation, expected_pos), "{}", node.name());
                }
                None => assert_eq!(node.world(), node.local()),
            }
        }
    }

    #[test]
    fn rotated_parent_moves_child_offset() {
        // A 90° yaw at the root swings a +X child offset onto -Z.
        let mut tree = TransformTree::new("root");
        let arm = tree.add_child(tree.root(), "arm").unwrap();
        tree.set_local_rotation(tree.root(), Quat::from_rotation_y(FRAC_PI_2));
        tree.set_local_translation(arm, Vec3::X);
        tree.update_world();
        assert!(approx_vec(tree.node(arm).world().translation, Vec3::NEG_Z));
    }

    #[test]
    fn world_is_stale_until_update() {
        let mut tree = TransformTree::new("root");
        let a = tree.add_child(tree.root(), "a").unwrap();
        tree.set_local_translation(a, Vec3::Y);
        assert!(approx_vec(tree.node(a).world().translation, Vec3::ZERO));
        tree.update_world();
        assert!(approx_vec(tree.node(a).world().translation, Vec3::Y));
    }
}
