//! `posekit-skeleton` – hierarchical skeletal pose from body-worn trackers.
//!
//! # Modules
//!
//! - [`transform`] – [`TransformTree`] arena with top-down world-transform
//!   propagation and a stable depth-first traversal.
//! - [`bone`] – [`BoneInfo`]: lengths, corrected rotations and root-relative
//!   retargeting queries.
//! - [`config`] – [`SkeletonConfig`] body proportions.
//! - [`tracker`] – the [`Tracker`] trait and the in-process [`SimTracker`].
//! - [`tweaks`] – floor clip, skating correction and tap-detection settings.
//! - [`rig`] – static rig layouts and the engine that builds and poses them.
//! - [`skeleton`] – the [`Skeleton`] trait.
//! - [`full_body`] / [`upper_body`] – the two skeleton variants.
//! - [`shared`] – [`SharedSkeleton`], the single-writer generation barrier.

pub mod bone;
pub mod config;
pub mod full_body;
pub mod rig;
pub mod shared;
pub mod skeleton;
pub mod tracker;
pub mod transform;
pub mod tweaks;
pub mod upper_body;

pub use bone::{BoneInfo, find_node_towards, is_ancestor};
pub use config::SkeletonConfig;
pub use full_body::FullBodySkeleton;
pub use shared::{NodeSnapshot, PoseReadGuard, PoseSnapshot, SharedSkeleton};
pub use skeleton::Skeleton;
pub use tracker::{SimTracker, Tracker, TrackerSample};
pub use transform::{NodeId, Transform, TransformNode, TransformTree};
pub use tweaks::{LegTweaks, LegTweaksConfig, LegTweaksState, TapDetectionConfig};
pub use upper_body::UpperBodySkeleton;
