//! Body-proportion calibration offsets.
//!
//! Each [`SkeletonConfigOffset`] names one measured segment of the user's
//! body (in metres).  Skeleton variants turn these values into the local
//! translations of their tree nodes.

use serde::{Deserialize, Serialize};

/// One calibratable body proportion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkeletonConfigOffset {
    Head,
    Neck,
    Chest,
    Waist,
    Hip,
    HipsWidth,
    UpperLeg,
    LowerLeg,
    FootLength,
    ShouldersDistance,
    ShouldersWidth,
    UpperArm,
    LowerArm,
    HandLength,
}

impl SkeletonConfigOffset {
    /// Every offset, in id order.  Resetting "all" offsets walks this list.
    pub const ALL: [SkeletonConfigOffset; 14] = [
        SkeletonConfigOffset::Head,
        SkeletonConfigOffset::Neck,
        SkeletonConfigOffset::Chest,
        SkeletonConfigOffset::Waist,
        SkeletonConfigOffset::Hip,
        SkeletonConfigOffset::HipsWidth,
        SkeletonConfigOffset::UpperLeg,
        SkeletonConfigOffset::LowerLeg,
        SkeletonConfigOffset::FootLength,
        SkeletonConfigOffset::ShouldersDistance,
        SkeletonConfigOffset::ShouldersWidth,
        SkeletonConfigOffset::UpperArm,
        SkeletonConfigOffset::LowerArm,
        SkeletonConfigOffset::HandLength,
    ];

    /// Stable id used on the wire (1-based).
    pub fn id(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|offset| offset.id() == id)
    }

    /// Default length in metres for an average adult.
    pub fn default_value(self) -> f32 {
        match self {
            SkeletonConfigOffset::Head => 0.1,
            SkeletonConfigOffset::Neck => 0.1,
            SkeletonConfigOffset::Chest => 0.32,
            SkeletonConfigOffset::Waist => 0.2,
            SkeletonConfigOffset::Hip => 0.04,
            SkeletonConfigOffset::HipsWidth => 0.26,
            SkeletonConfigOffset::UpperLeg => 0.42,
            SkeletonConfigOffset::LowerLeg => 0.5,
            SkeletonConfigOffset::FootLength => 0.05,
            SkeletonConfigOffset::ShouldersDistance => 0.08,
            SkeletonConfigOffset::ShouldersWidth => 0.36,
            SkeletonConfigOffset::UpperArm => 0.26,
            SkeletonConfigOffset::LowerArm => 0.26,
            SkeletonConfigOffset::HandLength => 0.1,
        }
    }
}
