//! [`SharedSkeleton`] – single-writer, multi-reader handle over a skeleton.
//!
//! One lock covers the whole skeleton.  [`tick`](SharedSkeleton::tick) holds
//! the write lock for the entire pose update and bumps a generation counter
//! before releasing it, so a reader either sees the previous completed tick
//! or the new one, never a half-propagated tree.  Control-plane changes
//! (calibration, resets, leg-tweak toggles) go through
//! [`control`](SharedSkeleton::control) and are serialized against ticks.
//!
//! # Example
//!
//! ```rust
//! use posekit_skeleton::config::SkeletonConfig;
//! use posekit_skeleton::full_body::FullBodySkeleton;
//! use posekit_skeleton::shared::SharedSkeleton;
//! use posekit_skeleton::skeleton::Skeleton;
//!
//! let skeleton = FullBodySkeleton::new(Vec::new(), SkeletonConfig::default()).unwrap();
//! let shared = SharedSkeleton::new(skeleton);
//!
//! assert_eq!(shared.tick(), 1);
//! let pose = shared.read();
//! assert_eq!(pose.generation(), 1);
//! assert_eq!(pose.root_node().name(), "HMD");
//! ```

use std::ops::Deref;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};

use crate::skeleton::Skeleton;
use crate::transform::Transform;

struct Ticked<S> {
    skeleton: S,
    generation: u64,
}

/// Cloneable handle; clones share the same skeleton.
pub struct SharedSkeleton<S> {
    inner: Arc<RwLock<Ticked<S>>>,
}

impl<S> Clone for SharedSkeleton<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Skeleton> SharedSkeleton<S> {
    pub fn new(skeleton: S) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Ticked {
                skeleton,
                generation: 0,
            })),
        }
    }

    /// Run one pose update under the write lock and return the new
    /// generation.
    pub fn tick(&self) -> u64 {
        let mut state = self.inner.write();
        state.skeleton.update_pose();
        state.generation += 1;
        state.generation
    }

    /// Number of completed ticks.
    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    /// Read access to the last completed tick.  Ticks block while the guard
    /// is held.
    pub fn read(&self) -> PoseReadGuard<'_, S> {
        PoseReadGuard {
            guard: self.inner.read(),
        }
    }

    /// Run a control-plane mutation, serialized against ticks.
    pub fn control<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut state = self.inner.write();
        f(&mut state.skeleton)
    }

    /// Copy out every node's world transform, in depth-first order.
    pub fn snapshot(&self) -> PoseSnapshot {
        let state = self.inner.read();
        let tree = state.skeleton.tree();
        let nodes = tree
            .depth_first()
            .into_iter()
            .map(|id| {
                let node = tree.node(id);
                NodeSnapshot {
                    index: id.index(),
                    name: node.name().to_string(),
                    parent: node.parent().map(|p| p.index()),
                    world: *node.world(),
                }
            })
            .collect();
        PoseSnapshot {
            generation: state.generation,
            nodes,
        }
    }
}

/// Read guard returned by [`SharedSkeleton::read`].
pub struct PoseReadGuard<'a, S> {
    guard: RwLockReadGuard<'a, Ticked<S>>,
}

impl<S> PoseReadGuard<'_, S> {
    /// Generation of the tick this guard observes.
    pub fn generation(&self) -> u64 {
        self.guard.generation
    }
}

impl<S> Deref for PoseReadGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.guard.skeleton
    }
}

/// World transforms of one completed tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseSnapshot {
    pub generation: u64,
    pub nodes: Vec<NodeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Node index in the tree.
    pub index: usize,
    pub name: String,
    pub parent: Option<usize>,
    pub world: Transform,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SkeletonConfig;
    use crate::full_body::FullBodySkeleton;
    use crate::tracker::{SimTracker, Tracker, TrackerSample};
    use glam::{Quat, Vec3};
    use posekit_types::{BodyPart, SkeletonConfigOffset, TrackerId, TrackerStatus};

    const CHEST: TrackerId = TrackerId {
        device_id: Some(1),
        tracker_num: 0,
    };

    fn shared() -> SharedSkeleton<FullBodySkeleton> {
        let chest = SimTracker::new(CHEST, BodyPart::Chest).boxed();
        SharedSkeleton::new(FullBodySkeleton::new(vec![chest], SkeletonConfig::default()).unwrap())
    }

    fn feed_chest(skeleton: &mut FullBodySkeleton, angle: f32) {
        if let Some(t) = skeleton.tracker_mut(CHEST) {
            t.ingest(TrackerSample {
                rotation: Quat::from_rotation_x(angle),
                position: None,
                status: TrackerStatus::Ok,
            });
        }
    }

    #[test]
    fn generation_counts_ticks() {
        let shared = shared();
        assert_eq!(shared.generation(), 0);
        assert_eq!(shared.tick(), 1);
        assert_eq!(shared.tick(), 2);
        assert_eq!(shared.clone().generation(), 2);
    }

    #[test]
    fn control_changes_are_visible_after_next_tick() {
        let shared = shared();
        shared.control(|s| s.set_skeleton_config(SkeletonConfigOffset::Chest, 0.5).unwrap());
        shared.tick();
        let pose = shared.read();
        assert_eq!(pose.skeleton_config().chest, 0.5);
        let chest = pose.bone_info_for_body_part(BodyPart::Chest).unwrap();
        assert!((chest.length() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn calibration_does_not_change_the_published_pose() {
        let head_id = TrackerId::new(0, 0);
        let mut head = SimTracker::new(head_id, BodyPart::Head);
        head.ingest(TrackerSample {
            rotation: Quat::IDENTITY,
            position: Some(Vec3::new(0.3, 1.7, 0.2)),
            status: TrackerStatus::Ok,
        });
        let skeleton = FullBodySkeleton::new(vec![head.boxed()], SkeletonConfig::default()).unwrap();
        let shared = SharedSkeleton::new(skeleton);
        shared.tick();
        let before = shared.snapshot();

        shared.control(|s| s.set_skeleton_config(SkeletonConfigOffset::Chest, 0.33).unwrap());
        let after = shared.snapshot();
        assert_eq!(after.generation, 1);
        assert_eq!(after, before);

        assert_eq!(shared.tick(), 2);
        let next = shared.snapshot();
        assert_eq!(next.nodes[0].world.translation, Vec3::new(0.3, 1.7, 0.2));
        assert_ne!(next.nodes, before.nodes);
    }

    #[test]
    fn snapshot_follows_depth_first_order() {
        let shared = shared();
        shared.tick();
        let snapshot = shared.snapshot();
        let pose = shared.read();
        let order: Vec<usize> = pose.tree().depth_first().iter().map(|id| id.index()).collect();
        let snap_order: Vec<usize> = snapshot.nodes.iter().map(|n| n.index).collect();
        assert_eq!(order, snap_order);
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.nodes[0].parent, None);
    }

    #[test]
    fn readers_never_observe_partial_ticks() {
        let shared = shared();
        shared.tick();

        std::thread::scope(|scope| {
            let writer = shared.clone();
            scope.spawn(move || {
                for i in 0..200 {
                    writer.control(|s| feed_chest(s, i as f32 * 0.01));
                    writer.tick();
                }
            });

            for _ in 0..4 {
                let reader = shared.clone();
                scope.spawn(move || {
                    let mut last = 0;
                    for _ in 0..200 {
                        let pose = reader.read();
                        assert!(pose.generation() >= last);
                        last = pose.generation();

                        // Every node below NECK shares the chest rotation
                        // within a single completed tick.
                        let tree = pose.tree();
                        let neck = tree.node(tree.find("NECK").unwrap()).world().rotation;
                        let hip = tree.node(tree.find("HIP").unwrap()).world().rotation;
                        assert!(neck.dot(hip).abs() > 1.0 - 1e-5);
                    }
                });
            }
        });

        assert_eq!(shared.generation(), 201);
    }
}
