//! Tunnelrun - avatar physics and collision core for a side-scrolling platformer
//!
//! Core modules:
//! - `sim`: Collision geometry, avatar state, collision resolution and
//!   position realignment across animation transitions
//! - `settings`: Data-driven collision tuning

pub mod settings;
pub mod sim;

pub use settings::{CollisionSettings, SettingsError};

use serde::{Deserialize, Serialize};

/// Collision configuration constants
pub mod consts {
    /// Radius within which the avatar's arm can latch onto a ledge corner
    pub const LEDGE_GRAB_RANGE: f64 = 60.0;

    /// Largest anchor disagreement accepted after a realignment
    pub const ALIGNMENT_TOLERANCE: f64 = 1e-6;

    /// Fixed simulation timestep used by the demo loop
    pub const SIM_DT: f64 = 1.0 / 60.0;

    /// Downward acceleration (units/s², world is y-up)
    pub const GRAVITY: f64 = -980.0;
    /// Terminal fall speed
    pub const MAX_FALL_SPEED: f64 = 900.0;
}

/// Facing of the avatar or of an animation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Left,
    #[default]
    Right,
}

impl Direction {
    /// +1 for Right, -1 for Left
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "Left",
            Direction::Right => "Right",
        }
    }
}

/// Edge of a tile that was struck or touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Right => "Right",
            Side::Top => "Top",
            Side::Bottom => "Bottom",
        }
    }
}

impl From<Direction> for Side {
    /// Wall face on the given side of a tile
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Left => Side::Left,
            Direction::Right => Side::Right,
        }
    }
}
