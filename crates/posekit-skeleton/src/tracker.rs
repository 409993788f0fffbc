//! Generic `Tracker` trait for orientation sources driving a skeleton.
//!
//! Skeletons only talk to the trait, so hardware drivers, network-fed
//! trackers and the in-process [`SimTracker`] are interchangeable.
//!
//! # Reset model
//!
//! A tracker's reported rotation is `reset * raw * mounting`:
//!
//! - `raw` is the latest sample from the device;
//! - `reset` is a left-applied correction set by [full](Tracker::reset_full)
//!   and [yaw](Tracker::reset_yaw) resets;
//! - `mounting` is a right-applied, yaw-only correction for how the tracker
//!   is strapped to the body, set by [mounting resets](Tracker::reset_mounting).
//!
//! # Example
//!
//! ```rust
//! use glam::Quat;
//! use posekit_skeleton::tracker::{SimTracker, Tracker, TrackerSample};
//! use posekit_types::{BodyPart, TrackerId, TrackerStatus};
//!
//! let mut chest = SimTracker::new(TrackerId::new(1, 0), BodyPart::Chest);
//! chest.ingest(TrackerSample {
//!     rotation: Quat::from_rotation_y(1.0),
//!     position: None,
//!     status: TrackerStatus::Ok,
//! });
//! chest.reset_full(Quat::IDENTITY);
//! assert!(chest.rotation().angle_between(Quat::IDENTITY) < 1e-4);
//! ```

use glam::{EulerRot, Quat, Vec3};
use posekit_types::{BodyPart, TrackerId, TrackerStatus, TrackerTelemetry};

/// One reading from a tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerSample {
    pub rotation: Quat,
    pub position: Option<Vec3>,
    pub status: TrackerStatus,
}

/// An orientation (and optionally position) source assigned to a body part.
pub trait Tracker: Send + Sync {
    fn id(&self) -> TrackerId;

    /// Body part this tracker is worn on.
    fn body_part(&self) -> BodyPart;

    /// Corrected rotation; see the module docs for the reset model.
    fn rotation(&self) -> Quat;

    /// Position, for trackers that report one.
    fn position(&self) -> Option<Vec3>;

    fn status(&self) -> TrackerStatus;

    fn telemetry(&self) -> TrackerTelemetry {
        TrackerTelemetry::default()
    }

    /// Whether this tracker is synthesized by the server rather than backed
    /// by hardware.
    fn is_computed(&self) -> bool {
        false
    }

    /// Mounting correction, if the tracker supports one.
    fn mounting_rotation(&self) -> Option<Quat> {
        None
    }

    /// Feed a new reading.
    fn ingest(&mut self, sample: TrackerSample);

    /// Align the corrected rotation with `reference`.
    fn reset_full(&mut self, reference: Quat);

    /// Align only the heading of the corrected rotation with `reference`.
    fn reset_yaw(&mut self, reference: Quat);

    /// Recompute the mounting correction so that the current pose faces the
    /// same heading as `reference`.
    fn reset_mounting(&mut self, reference: Quat);
}

/// Heading component of `rotation` as a rotation about +Y.
pub fn yaw_only(rotation: Quat) -> Quat {
    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
    Quat::from_rotation_y(yaw)
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated tracker
// ────────────────────────────────────────────────────────────────────────────

/// In-process tracker that reports whatever was last ingested.
///
/// Used by the CLI demo rig and by tests.
#[derive(Debug, Clone)]
pub struct SimTracker {
    id: TrackerId,
    body_part: BodyPart,
    computed: bool,
    raw: Quat,
    reset: Quat,
    mounting: Quat,
    position: Option<Vec3>,
    status: TrackerStatus,
    telemetry: TrackerTelemetry,
}

impl SimTracker {
    /// Create a disconnected tracker at identity rotation.
    pub fn new(id: TrackerId, body_part: BodyPart) -> Self {
        Self {
            id,
            body_part,
            computed: id.device_id.is_none(),
            raw: Quat::IDENTITY,
            reset: Quat::IDENTITY,
            mounting: Quat::IDENTITY,
            position: None,
            status: TrackerStatus::Disconnected,
            telemetry: TrackerTelemetry::default(),
        }
    }

    pub fn with_telemetry(mut self, telemetry: TrackerTelemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_status(mut self, status: TrackerStatus) -> Self {
        self.status = status;
        self
    }

    /// Box the tracker for handing to a skeleton.
    pub fn boxed(self) -> Box<dyn Tracker> {
        Box::new(self)
    }

    /// Latest raw rotation, before any correction.
    pub fn raw_rotation(&self) -> Quat {
        self.raw
    }
}

impl Tracker for SimTracker {
    fn id(&self) -> TrackerId {
        self.id
    }

    fn body_part(&self) -> BodyPart {
        self.body_part
    }

    fn rotation(&self) -> Quat {
        (self.reset * self.raw * self.mounting).normalize()
    }

    fn position(&self) -> Option<Vec3> {
        self.position
    }

    fn status(&self) -> TrackerStatus {
        self.status
    }

    fn telemetry(&self) -> TrackerTelemetry {
        self.telemetry
    }

    fn is_computed(&self) -> bool {
        self.computed
    }

    fn mounting_rotation(&self) -> Option<Quat> {
        Some(self.mounting)
    }

    fn ingest(&mut self, sample: TrackerSample) {
        self.raw = sample.rotation.normalize();
        self.position = sample.position;
        self.status = sample.status;
    }

    fn reset_full(&mut self, reference: Quat) {
        self.reset = (reference * (self.raw * self.mounting).inverse()).normalize();
    }

    fn reset_yaw(&mut self, reference: Quat) {
        let (current, _, _) = self.rotation().to_euler(EulerRot::YXZ);
        let (target, _, _) = reference.to_euler(EulerRot::YXZ);
        self.reset = (Quat::from_rotation_y(target - current) * self.reset).normalize();
    }

    fn reset_mounting(&mut self, reference: Quat) {
        self.mounting = yaw_only((self.reset * self.raw).inverse() * reference);
    }
}
