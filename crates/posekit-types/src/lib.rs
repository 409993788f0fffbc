//! `posekit-types` – shared vocabulary for the posekit workspace.
//!
//! # Modules
//!
//! - [`body`] – [`BodyPart`], the [`BoneType`] table, and the
//!   [`HumanoidBone`] subset used for restricted retargeting searches.
//! - [`offsets`] – [`SkeletonConfigOffset`]: calibratable body proportions.
//! - [`tracker`] – [`TrackerId`], [`TrackerStatus`], [`TrackerTelemetry`].

pub mod body;
pub mod offsets;
pub mod tracker;

pub use body::{BONES, BodyPart, BoneDef, BoneType, HumanoidBone, ROOT_NODE};
pub use offsets::SkeletonConfigOffset;
pub use tracker::{TrackerId, TrackerStatus, TrackerTelemetry};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for skeleton construction, calibration and configuration I/O.
///
/// Lookup misses are not errors; they surface as `Option::None`.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PoseError {
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Duplicate node in rig: {0}")]
    DuplicateNode(String),

    #[error("Node {0} has no parent and cannot be a bone tail")]
    MissingParent(String),

    #[error("Invalid value for offset {0}")]
    InvalidOffset(String),

    #[error("Failed to load config at {path}: {details}")]
    ConfigLoad { path: String, details: String },

    #[error("Failed to save config at {path}: {details}")]
    ConfigSave { path: String, details: String },
}
