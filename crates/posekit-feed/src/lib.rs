//! `posekit-feed` – read-only consumers of the skeleton.
//!
//! # Modules
//!
//! - [`records`] – data-feed records and their inclusion masks.
//! - [`builder`] – builders for device, tracker and bone records, and
//!   whole [`DataFeedUpdate`] frames.
//! - [`rpc`] – the skeleton-config response.
//!
//! Records are plain `serde` types; framing and transport belong to the
//! caller.

pub mod builder;
pub mod records;
pub mod rpc;

pub use builder::{
    bones_data, build_update, build_update_from, device_data, devices_data, hardware_status,
    synthetic_trackers_data, tracker_data,
};
pub use records::{
    BoneData, DataFeedConfig, DataFeedUpdate, DeviceData, DeviceDataMask, HardwareStatus,
    TrackerData, TrackerDataMask, TrackerInfo,
};
pub use rpc::{SkeletonConfigResponse, SkeletonPart, skeleton_config_response};
