//! Skeletal taxonomy: [`BodyPart`], [`BoneType`], and the [`HumanoidBone`]
//! subset understood by humanoid retargeting consumers.
//!
//! Every table here is a compile-time constant indexed by its tag enum, so
//! lookups are array indexing and never allocate.
//!
//! # Node naming
//!
//! A skeleton tree names each node after the bone whose *tail* it is, so a
//! node name always resolves back to its [`BoneType`] via
//! [`BoneType::from_name`].  The only node without a bone is the rig root,
//! [`ROOT_NODE`].

use serde::{Deserialize, Serialize};

/// Name of the root node of every skeleton tree (the head-mounted display).
pub const ROOT_NODE: &str = "HMD";

// ────────────────────────────────────────────────────────────────────────────
// BodyPart
// ────────────────────────────────────────────────────────────────────────────

/// Anatomical identifier shared with the data-feed boundary.
///
/// The discriminants are the stable wire ids; 12 and 13 are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum BodyPart {
    None = 0,
    Head = 1,
    Neck = 2,
    Chest = 3,
    Waist = 4,
    Hip = 5,
    LeftUpperLeg = 6,
    RightUpperLeg = 7,
    LeftLowerLeg = 8,
    RightLowerLeg = 9,
    LeftFoot = 10,
    RightFoot = 11,
    LeftLowerArm = 14,
    RightLowerArm = 15,
    LeftUpperArm = 16,
    RightUpperArm = 17,
    LeftHand = 18,
    RightHand = 19,
    LeftShoulder = 20,
    RightShoulder = 21,
}

impl BodyPart {
    /// Every body part, in wire-id order.
    pub const ALL: [BodyPart; 20] = [
        BodyPart::None,
        BodyPart::Head,
        BodyPart::Neck,
        BodyPart::Chest,
        BodyPart::Waist,
        BodyPart::Hip,
        BodyPart::LeftUpperLeg,
        BodyPart::RightUpperLeg,
        BodyPart::LeftLowerLeg,
        BodyPart::RightLowerLeg,
        BodyPart::LeftFoot,
        BodyPart::RightFoot,
        BodyPart::LeftLowerArm,
        BodyPart::RightLowerArm,
        BodyPart::LeftUpperArm,
        BodyPart::RightUpperArm,
        BodyPart::LeftHand,
        BodyPart::RightHand,
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
    ];

    /// Wire id of this body part.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Resolve a wire id.  Returns `None` for reserved or unknown ids.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|part| part.id() == id)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// BoneType
// ────────────────────────────────────────────────────────────────────────────

/// A semantic skeletal segment, spanning from a head node to a tail node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoneType {
    Head,
    Neck,
    Chest,
    Waist,
    Hip,
    LeftHip,
    RightHip,
    LeftUpperLeg,
    RightUpperLeg,
    LeftLowerLeg,
    RightLowerLeg,
    LeftFoot,
    RightFoot,
    LeftShoulder,
    RightShoulder,
    LeftUpperArm,
    RightUpperArm,
    LeftLowerArm,
    RightLowerArm,
    LeftHand,
    RightHand,
}

/// One row of the [`BONES`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoneDef {
    pub bone: BoneType,
    /// Canonical identifier; doubles as the tail node name.
    pub name: &'static str,
    pub body_part: BodyPart,
    pub head_node: &'static str,
    pub tail_node: &'static str,
}

const fn def(
    bone: BoneType,
    name: &'static str,
    body_part: BodyPart,
    head_node: &'static str,
) -> BoneDef {
    BoneDef {
        bone,
        name,
        body_part,
        head_node,
        tail_node: name,
    }
}

/// Static bone table, indexed by `BoneType as usize`.
///
/// The hip-width bones carry [`BodyPart::None`]: they exist in the tree but
/// have no anatomical counterpart on the wire.
pub const BONES: [BoneDef; 21] = [
    def(BoneType::Head, "HEAD", BodyPart::Head, ROOT_NODE),
    def(BoneType::Neck, "NECK", BodyPart::Neck, "HEAD"),
    def(BoneType::Chest, "CHEST", BodyPart::Chest, "NECK"),
    def(BoneType::Waist, "WAIST", BodyPart::Waist, "CHEST"),
    def(BoneType::Hip, "HIP", BodyPart::Hip, "WAIST"),
    def(BoneType::LeftHip, "LEFT_HIP", BodyPart::None, "HIP"),
    def(BoneType::RightHip, "RIGHT_HIP", BodyPart::None, "HIP"),
    def(BoneType::LeftUpperLeg, "LEFT_UPPER_LEG", BodyPart::LeftUpperLeg, "LEFT_HIP"),
    def(BoneType::RightUpperLeg, "RIGHT_UPPER_LEG", BodyPart::RightUpperLeg, "RIGHT_HIP"),
    def(BoneType::LeftLowerLeg, "LEFT_LOWER_LEG", BodyPart::LeftLowerLeg, "LEFT_UPPER_LEG"),
    def(BoneType::RightLowerLeg, "RIGHT_LOWER_LEG", BodyPart::RightLowerLeg, "RIGHT_UPPER_LEG"),
    def(BoneType::LeftFoot, "LEFT_FOOT", BodyPart::LeftFoot, "LEFT_LOWER_LEG"),
    def(BoneType::RightFoot, "RIGHT_FOOT", BodyPart::RightFoot, "RIGHT_LOWER_LEG"),
    def(BoneType::LeftShoulder, "LEFT_SHOULDER", BodyPart::LeftShoulder, "NECK"),
    def(BoneType::RightShoulder, "RIGHT_SHOULDER", BodyPart::RightShoulder, "NECK"),
    def(BoneType::LeftUpperArm, "LEFT_UPPER_ARM", BodyPart::LeftUpperArm, "LEFT_SHOULDER"),
    def(BoneType::RightUpperArm, "RIGHT_UPPER_ARM", BodyPart::RightUpperArm, "RIGHT_SHOULDER"),
    def(BoneType::LeftLowerArm, "LEFT_LOWER_ARM", BodyPart::LeftLowerArm, "LEFT_UPPER_ARM"),
    def(BoneType::RightLowerArm, "RIGHT_LOWER_ARM", BodyPart::RightLowerArm, "RIGHT_UPPER_ARM"),
    def(BoneType::LeftHand, "LEFT_HAND", BodyPart::LeftHand, "LEFT_LOWER_ARM"),
    def(BoneType::RightHand, "RIGHT_HAND", BodyPart::RightHand, "RIGHT_LOWER_ARM"),
];

impl BoneType {
    /// Every bone type, in table order.
    pub const ALL: [BoneType; 21] = [
        BoneType::Head,
        BoneType::Neck,
        BoneType::Chest,
        BoneType::Waist,
        BoneType::Hip,
        BoneType::LeftHip,
        BoneType::RightHip,
        BoneType::LeftUpperLeg,
        BoneType::RightUpperLeg,
        BoneType::LeftLowerLeg,
        BoneType::RightLowerLeg,
        BoneType::LeftFoot,
        BoneType::RightFoot,
        BoneType::LeftShoulder,
        BoneType::RightShoulder,
        BoneType::LeftUpperArm,
        BoneType::RightUpperArm,
        BoneType::LeftLowerArm,
        BoneType::RightLowerArm,
        BoneType::LeftHand,
        BoneType::RightHand,
    ];

    pub fn def(self) -> &'static BoneDef {
        &BONES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }

    pub fn body_part(self) -> BodyPart {
        self.def().body_part
    }

    pub fn head_node(self) -> &'static str {
        self.def().head_node
    }

    pub fn tail_node(self) -> &'static str {
        self.def().tail_node
    }

    /// Resolve a canonical bone name.  The match is exact (case-sensitive);
    /// unknown names, including [`ROOT_NODE`], resolve to `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        BONES.iter().find(|def| def.name == name).map(|def| def.bone)
    }

    /// The bone that represents `part`, if any.  [`BodyPart::None`] never
    /// resolves.
    pub fn for_body_part(part: BodyPart) -> Option<Self> {
        if part == BodyPart::None {
            return None;
        }
        BONES.iter().find(|def| def.body_part == part).map(|def| def.bone)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HumanoidBone
// ────────────────────────────────────────────────────────────────────────────

/// The humanoid bone set used by retargeting consumers (Unity's
/// `HumanBodyBones` naming).  Bones outside this set, such as the hip-width
/// segments, have no humanoid counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HumanoidBone {
    Hips,
    Spine,
    Chest,
    Neck,
    Head,
    LeftUpperLeg,
    RightUpperLeg,
    LeftLowerLeg,
    RightLowerLeg,
    LeftFoot,
    RightFoot,
    LeftShoulder,
    RightShoulder,
    LeftUpperArm,
    RightUpperArm,
    LeftLowerArm,
    RightLowerArm,
    LeftHand,
    RightHand,
}

const HUMANOID: [(HumanoidBone, BodyPart); 19] = [
    (HumanoidBone::Hips, BodyPart::Hip),
    (HumanoidBone::Spine, BodyPart::Waist),
    (HumanoidBone::Chest, BodyPart::Chest),
    (HumanoidBone::Neck, BodyPart::Neck),
    (HumanoidBone::Head, BodyPart::Head),
    (HumanoidBone::LeftUpperLeg, BodyPart::LeftUpperLeg),
    (HumanoidBone::RightUpperLeg, BodyPart::RightUpperLeg),
    (HumanoidBone::LeftLowerLeg, BodyPart::LeftLowerLeg),
    (HumanoidBone::RightLowerLeg, BodyPart::RightLowerLeg),
    (HumanoidBone::LeftFoot, BodyPart::LeftFoot),
    (HumanoidBone::RightFoot, BodyPart::RightFoot),
    (HumanoidBone::LeftShoulder, BodyPart::LeftShoulder),
    (HumanoidBone::RightShoulder, BodyPart::RightShoulder),
    (HumanoidBone::LeftUpperArm, BodyPart::LeftUpperArm),
    (HumanoidBone::RightUpperArm, BodyPart::RightUpperArm),
    (HumanoidBone::LeftLowerArm, BodyPart::LeftLowerArm),
    (HumanoidBone::RightLowerArm, BodyPart::RightLowerArm),
    (HumanoidBone::LeftHand, BodyPart::LeftHand),
    (HumanoidBone::RightHand, BodyPart::RightHand),
];

impl HumanoidBone {
    pub fn body_part(self) -> BodyPart {
        HUMANOID[self as usize].1
    }

    pub fn from_body_part(part: BodyPart) -> Option<Self> {
        HUMANOID
            .iter()
            .find(|(_, p)| *p == part)
            .map(|(bone, _)| *bone)
    }

    /// Whether a tree node named `node_name` belongs to the humanoid set.
    ///
    /// The name must resolve to a [`BoneType`] whose body part has a humanoid
    /// counterpart.
    pub fn is_known_node(node_name: &str) -> bool {
        BoneType::from_name(node_name)
            .and_then(|bone| Self::from_body_part(bone.body_part()))
            .is_some()
    }
}
