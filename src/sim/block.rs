//! Collision blocks: named sub-rectangles of an animation frame
//!
//! A block stores its offset from the avatar centre, already mirrored for the
//! facing of the state it belongs to. Every collision and alignment query goes
//! through [`block_to_world_rect`] to place a block in the world.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Well-known collision block ids authored in the animation metadata
pub mod block_ids {
    /// Whole-body hitbox
    pub const AVATAR: &str = "Avatar";
    pub const LEFT_FOOT: &str = "Left_Foot";
    pub const RIGHT_FOOT: &str = "Right_Foot";
    /// Reach used for ledge-grab range tests
    pub const ARM: &str = "Arm";
    /// Grip point used when hanging from a ledge
    pub const HAND: &str = "Hand";
}

/// A named, frame-relative collision rectangle
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollisionBlock {
    /// Block name; empty for the "not present" sentinel
    pub id: String,
    /// Authored as touching a surface in this frame
    #[serde(default)]
    pub is_contacting: bool,
    /// Centre offset from the avatar position
    pub offset_from_centre: DVec2,
    pub size: DVec2,
}

static EMPTY_BLOCK: CollisionBlock = CollisionBlock {
    id: String::new(),
    is_contacting: false,
    offset_from_centre: DVec2::ZERO,
    size: DVec2::ZERO,
};

impl CollisionBlock {
    pub fn new(id: impl Into<String>, offset_from_centre: DVec2, size: DVec2) -> Self {
        Self {
            id: id.into(),
            is_contacting: false,
            offset_from_centre,
            size,
        }
    }

    pub fn contacting(mut self, is_contacting: bool) -> Self {
        self.is_contacting = is_contacting;
        self
    }

    /// False for the empty sentinel returned by failed lookups
    #[inline]
    pub fn is_present(&self) -> bool {
        !self.id.is_empty()
    }

    /// Same block with its x offset flipped to the opposite facing
    pub fn mirrored(&self) -> Self {
        Self {
            offset_from_centre: DVec2::new(-self.offset_from_centre.x, self.offset_from_centre.y),
            ..self.clone()
        }
    }
}

/// Place a block in world space around the avatar position
///
/// `mirror` flips the x offset once, for blocks authored for the opposite
/// facing. The input block is untouched.
pub fn block_to_world_rect(block: &CollisionBlock, avatar_position: DVec3, mirror: bool) -> Rect {
    let offset_x = if mirror {
        -block.offset_from_centre.x
    } else {
        block.offset_from_centre.x
    };
    let position = DVec3::new(
        avatar_position.x + offset_x,
        avatar_position.y + block.offset_from_centre.y,
        avatar_position.z,
    );
    Rect::new(position, block.size)
}

/// Find a block by id; the last match wins, absent ids give the empty sentinel
pub fn lookup_named_block<'a>(id: &str, blocks: &'a [CollisionBlock]) -> &'a CollisionBlock {
    let mut found = &EMPTY_BLOCK;
    for block in blocks {
        if block.id == id {
            found = block;
        }
    }
    found
}
