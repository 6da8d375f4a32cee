//! Animation metadata and collision-block construction
//!
//! An animation set lists, per animation subset, the frames of the sprite
//! sheet and the named collision rectangles drawn on each frame. Sheet
//! coordinates are y-down and centred on each rectangle; collision blocks are
//! offsets from the frame centre in the y-up world, mirrored for Left-facing
//! states.

use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::block::CollisionBlock;
use super::state::AvatarState;
use crate::Direction;

/// Errors that can occur when loading or querying animation metadata
#[derive(Debug, Error)]
pub enum AnimationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unknown animation {parent_state}/{state}")]
    UnknownSubset { parent_state: String, state: String },
    #[error("Animation {state} has no frame {index} ({frames} frames)")]
    FrameOutOfRange { state: String, index: u32, frames: usize },
}

/// A rectangle on the sprite sheet, by centre (y-down)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SheetRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SheetRect {
    pub fn centre(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }
}

/// A named collision rectangle drawn on a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetBlock {
    pub id: String,
    #[serde(default)]
    pub contacting: bool,
    pub rect: SheetRect,
}

/// One frame of an animation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationFrame {
    /// Region of the sheet drawn for this frame
    pub sprite: SheetRect,
    #[serde(default)]
    pub blocks: Vec<SheetBlock>,
}

impl AnimationFrame {
    /// Collision blocks of this frame for an avatar facing `direction`
    ///
    /// Frames are authored facing right.
    pub fn collision_blocks(&self, direction: Direction) -> Vec<CollisionBlock> {
        let frame_centre = self.sprite.centre();
        self.blocks
            .iter()
            .map(|sheet| {
                let delta = sheet.rect.centre() - frame_centre;
                let offset = DVec2::new(delta.x * direction.sign(), -delta.y);
                CollisionBlock::new(sheet.id.clone(), offset, sheet.rect.size()).contacting(sheet.contacting)
            })
            .collect()
    }
}

/// All frames of one named animation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationSubset {
    pub parent_state: String,
    pub state: String,
    pub frames: Vec<AnimationFrame>,
}

/// Every animation available to the avatar
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationSet {
    pub subsets: Vec<AnimationSubset>,
}

impl AnimationSet {
    /// Parse an animation set from JSON
    pub fn from_json(json: &str) -> Result<Self, AnimationError> {
        let set: Self = serde_json::from_str(json)?;
        Ok(set)
    }

    /// Load an animation set from a JSON file
    pub fn load(path: &Path) -> Result<Self, AnimationError> {
        let content = std::fs::read_to_string(path)?;
        let set = Self::from_json(&content)?;
        log::info!("Loaded {} animations from {}", set.subsets.len(), path.display());
        Ok(set)
    }

    pub fn subset(&self, parent_state: &str, state: &str) -> Option<&AnimationSubset> {
        self.subsets
            .iter()
            .find(|s| s.parent_state == parent_state && s.state == state)
    }

    /// Build the avatar state for one frame of an animation
    pub fn avatar_state(
        &self,
        parent_state: &str,
        state: &str,
        index: u32,
        direction: Direction,
    ) -> Result<AvatarState, AnimationError> {
        let subset = self
            .subset(parent_state, state)
            .ok_or_else(|| AnimationError::UnknownSubset {
                parent_state: parent_state.to_string(),
                state: state.to_string(),
            })?;
        let frame = subset
            .frames
            .get(index as usize)
            .ok_or_else(|| AnimationError::FrameOutOfRange {
                state: state.to_string(),
                index,
                frames: subset.frames.len(),
            })?;

        Ok(AvatarState {
            parent_state: parent_state.to_string(),
            state: state.to_string(),
            state_index: index,
            max_state_index: subset.frames.len() as i32 - 1,
            direction,
            collision_blocks: frame.collision_blocks(direction),
        })
    }
}
