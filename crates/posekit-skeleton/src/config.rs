//! Body-proportion configuration held by every skeleton.

use posekit_types::{PoseError, SkeletonConfigOffset};
use serde::{Deserialize, Serialize};

/// Current value of every [`SkeletonConfigOffset`], in metres.
///
/// Missing fields deserialize to their defaults, so partial TOML tables are
/// accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonConfig {
    pub head: f32,
    pub neck: f32,
    pub chest: f32,
    pub waist: f32,
    pub hip: f32,
    pub hips_width: f32,
    pub upper_leg: f32,
    pub lower_leg: f32,
    pub foot_length: f32,
    pub shoulders_distance: f32,
    pub shoulders_width: f32,
    pub upper_arm: f32,
    pub lower_arm: f32,
    pub hand_length: f32,
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        use SkeletonConfigOffset as O;
        Self {
            head: O::Head.default_value(),
            neck: O::Neck.default_value(),
            chest: O::Chest.default_value(),
            waist: O::Waist.default_value(),
            hip: O::Hip.default_value(),
            hips_width: O::HipsWidth.default_value(),
            upper_leg: O::UpperLeg.default_value(),
            lower_leg: O::LowerLeg.default_value(),
            foot_length: O::FootLength.default_value(),
            shoulders_distance: O::ShouldersDistance.default_value(),
            shoulders_width: O::ShouldersWidth.default_value(),
            upper_arm: O::UpperArm.default_value(),
            lower_arm: O::LowerArm.default_value(),
            hand_length: O::HandLength.default_value(),
        }
    }
}

impl SkeletonConfig {
    pub fn get(&self, offset: SkeletonConfigOffset) -> f32 {
        *self.slot(offset)
    }

    /// Set one offset.
    ///
    /// # Errors
    ///
    /// [`PoseError::InvalidOffset`] for negative or non-finite values; the
    /// stored value is left unchanged.
    pub fn set(&mut self, offset: SkeletonConfigOffset, value: f32) -> Result<(), PoseError> {
        check(offset, value)?;
        *self.slot_mut(offset) = value;
        Ok(())
    }

    /// Check every offset against the rule [`set`](Self::set) enforces.
    ///
    /// Deserialized configs bypass `set`, so anything read from disk goes
    /// through here before it shapes a rig.
    ///
    /// # Errors
    ///
    /// [`PoseError::InvalidOffset`] naming the first bad offset in id order.
    pub fn validate(&self) -> Result<(), PoseError> {
        self.entries().try_for_each(|(offset, value)| check(offset, value))
    }

    pub fn reset(&mut self, offset: SkeletonConfigOffset) {
        *self.slot_mut(offset) = offset.default_value();
    }

    /// `(offset, value)` pairs in id order.
    pub fn entries(&self) -> impl Iterator<Item = (SkeletonConfigOffset, f32)> + '_ {
        SkeletonConfigOffset::ALL
            .into_iter()
            .map(move |offset| (offset, self.get(offset)))
    }

    fn slot(&self, offset: SkeletonConfigOffset) -> &f32 {
        match offset {
            SkeletonConfigOffset::Head => &self.head,
            SkeletonConfigOffset::Neck => &self.neck,
            SkeletonConfigOffset::Chest => &self.chest,
            SkeletonConfigOffset::Waist => &self.waist,
            SkeletonConfigOffset::Hip => &self.hip,
            SkeletonConfigOffset::HipsWidth => &self.hips_width,
            SkeletonConfigOffset::UpperLeg => &self.upper_leg,
            SkeletonConfigOffset::LowerLeg => &self.lower_leg,
            SkeletonConfigOffset::FootLength => &self.foot_length,
            SkeletonConfigOffset::ShouldersDistance => &self.shoulders_distance,
            SkeletonConfigOffset::ShouldersWidth => &self.shoulders_width,
            SkeletonConfigOffset::UpperArm => &self.upper_arm,
            SkeletonConfigOffset::LowerArm => &self.lower_arm,
            SkeletonConfigOffset::HandLength => &self.hand_length,
        }
    }

    fn slot_mut(&mut self, offset: SkeletonConfigOffset) -> &mut f32 {
        match offset {
            SkeletonConfigOffset::Head => &mut self.head,
            SkeletonConfigOffset::Neck => &mut self.neck,
            SkeletonConfigOffset::Chest => &mut self.chest,
            SkeletonConfigOffset::Waist => &mut self.waist,
            SkeletonConfigOffset::Hip => &mut self.hip,
            SkeletonConfigOffset::HipsWidth => &mut self.hips_width,
            SkeletonConfigOffset::UpperLeg => &mut self.upper_leg,
            SkeletonConfigOffset::LowerLeg => &mut self.lower_leg,
            SkeletonConfigOffset::FootLength => &mut self.foot_length,
            SkeletonConfigOffset::ShouldersDistance => &mut self.shoulders_distance,
            SkeletonConfigOffset::ShouldersWidth => &mut self.shoulders_width,
            SkeletonConfigOffset::UpperArm => &mut self.upper_arm,
            SkeletonConfigOffset::LowerArm => &mut self.lower_arm,
            SkeletonConfigOffset::HandLength => &mut self.hand_length,
        }
    }
}

fn check(offset: SkeletonConfigOffset, value: f32) -> Result<(), PoseError> {
    if !value.is_finite() || value < 0.0 {
        return Err(PoseError::InvalidOffset(format!("{offset:?} = {value}")));
    }
    Ok(())
}
