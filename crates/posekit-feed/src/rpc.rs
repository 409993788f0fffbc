//! Request/response records for the skeleton-config RPC.

use posekit_skeleton::SkeletonConfig;
use serde::{Deserialize, Serialize};

/// One body proportion, keyed by its wire id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkeletonPart {
    pub bone: u8,
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonConfigResponse {
    pub skeleton_parts: Vec<SkeletonPart>,
}

/// Every offset id with its current value, in id order.
pub fn skeleton_config_response(config: &SkeletonConfig) -> SkeletonConfigResponse {
    SkeletonConfigResponse {
        skeleton_parts: config
            .entries()
            .map(|(offset, value)| SkeletonPart {
                bone: offset.id(),
                value,
            })
            .collect(),
    }
}
