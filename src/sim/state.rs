//! Avatar state and tile world types
//!
//! The avatar owns its position, velocity and three animation states. Tiles
//! are owned by the [`Level`] and only ever borrowed by collision queries.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use super::block::{CollisionBlock, lookup_named_block};
use super::rect::Rect;
use crate::{Direction, Side};

/// One animation state of the avatar
///
/// Compared by full structural equality, including the block list. An empty
/// `state` name means no state has been set yet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AvatarState {
    /// Animation group, e.g. "Running"
    pub parent_state: String,
    /// Animation name within the group, e.g. "Stopping"
    pub state: String,
    /// Current frame
    pub state_index: u32,
    pub max_state_index: i32,
    pub direction: Direction,
    /// Blocks already mirrored for `direction`
    pub collision_blocks: Vec<CollisionBlock>,
}

impl AvatarState {
    pub fn new(parent_state: impl Into<String>, state: impl Into<String>, direction: Direction) -> Self {
        Self {
            parent_state: parent_state.into(),
            state: state.into(),
            direction,
            ..Default::default()
        }
    }

    pub fn with_blocks(mut self, collision_blocks: Vec<CollisionBlock>) -> Self {
        self.collision_blocks = collision_blocks;
        self
    }

    /// Named block, or the empty sentinel
    pub fn block(&self, id: &str) -> &CollisionBlock {
        lookup_named_block(id, &self.collision_blocks)
    }

    /// True before the first state is assigned
    pub fn is_unset(&self) -> bool {
        self.state.is_empty()
    }
}

/// The player sprite
#[derive(Debug, Clone, Default)]
pub struct Avatar {
    position: DVec3,
    velocity: DVec3,
    state: AvatarState,
    last_rendered_state: AvatarState,
    last_rendered_position: DVec3,
    command: AvatarState,
}

impl Avatar {
    pub fn new(position: DVec3, state: AvatarState) -> Self {
        Self {
            position,
            command: state.clone(),
            state,
            ..Default::default()
        }
    }

    #[inline]
    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn set_position(&mut self, position: DVec3) {
        self.position = position;
    }

    /// Move in the x/y plane, leaving the layer untouched
    pub fn translate(&mut self, delta: DVec2) {
        self.position.x += delta.x;
        self.position.y += delta.y;
    }

    #[inline]
    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: DVec3) {
        self.velocity = velocity;
    }

    pub fn state(&self) -> &AvatarState {
        &self.state
    }

    /// Replace the current state wholesale
    pub fn set_state(&mut self, state: AvatarState) {
        if state != self.state {
            log::trace!(
                "Avatar state {}:{} -> {}:{} ({})",
                self.state.parent_state,
                self.state.state,
                state.parent_state,
                state.state,
                state.direction.as_str()
            );
        }
        self.state = state;
    }

    pub fn last_rendered_state(&self) -> &AvatarState {
        &self.last_rendered_state
    }

    pub fn last_rendered_position(&self) -> DVec3 {
        self.last_rendered_position
    }

    pub fn command(&self) -> &AvatarState {
        &self.command
    }

    pub fn set_command(&mut self, command: AvatarState) {
        self.command = command;
    }

    /// Facing of the current state
    #[inline]
    pub fn direction(&self) -> Direction {
        self.state.direction
    }

    /// Snapshot state and position as rendered this frame
    ///
    /// Must run after any realignment for the frame.
    pub fn mark_rendered(&mut self) {
        self.last_rendered_state = self.state.clone();
        self.last_rendered_position = self.position;
    }
}

/// Stable handle for a tile within its level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u32);

/// Hands out sequential entity ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next_id: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next_id: 1 }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Role classification of a tile, set during level assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TileFlags {
    pub floor: bool,
    pub roof: bool,
    /// Tile's left face is a wall (struck by an avatar moving right)
    pub left_wall: bool,
    /// Tile's right face is a wall (struck by an avatar moving left)
    pub right_wall: bool,
    pub left_exit: bool,
    pub right_exit: bool,
    pub floor_end: bool,
    pub roof_end: bool,
    pub left_wall_end: bool,
    pub right_wall_end: bool,
}

impl TileFlags {
    pub fn floor() -> Self {
        Self {
            floor: true,
            ..Default::default()
        }
    }

    pub fn left_wall() -> Self {
        Self {
            left_wall: true,
            ..Default::default()
        }
    }

    pub fn right_wall() -> Self {
        Self {
            right_wall: true,
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        self.left_wall || self.right_wall
    }

    /// Walkable top of a wall, the only tiles that can be grabbed
    #[inline]
    pub fn is_ledge(&self) -> bool {
        self.floor && self.is_wall()
    }
}

/// A static, classified tile of the level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub rect: Rect,
    pub flags: TileFlags,
}

impl Tile {
    pub fn new(id: TileId, rect: Rect, flags: TileFlags) -> Self {
        Self { id, rect, flags }
    }

    #[inline]
    pub fn is_floor(&self) -> bool {
        self.flags.floor
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        self.flags.is_wall()
    }

    #[inline]
    pub fn is_ledge(&self) -> bool {
        self.flags.is_ledge()
    }
}

/// A tile hit, produced fresh by each query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileCollision<'a> {
    pub tile: &'a Tile,
    pub side: Side,
}

/// Owner of the classified tiles for the current level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Level {
    tiles: Vec<Tile>,
    ids: IdAllocator,
}

impl Level {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a classified tile, returning its id
    pub fn add_tile(&mut self, rect: Rect, flags: TileFlags) -> TileId {
        let id = TileId(self.ids.allocate());
        self.tiles.push(Tile::new(id, rect, flags));
        id
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id == id)
    }

    pub fn floors(&self) -> Vec<&Tile> {
        self.tiles.iter().filter(|t| t.is_floor()).collect()
    }

    pub fn walls(&self) -> Vec<&Tile> {
        self.tiles.iter().filter(|t| t.is_wall()).collect()
    }

    pub fn ledges(&self) -> Vec<&Tile> {
        self.tiles.iter().filter(|t| t.is_ledge()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::block::block_ids;

    fn standing() -> AvatarState {
        AvatarState::new("Standing", "Standing", Direction::Right).with_blocks(vec![
            CollisionBlock::new(block_ids::AVATAR, DVec2::ZERO, DVec2::new(20.0, 40.0)),
        ])
    }

    #[test]
    fn test_state_equality_includes_blocks() {
        let a = standing();
        let mut b = standing();
        assert_eq!(a, b);

        b.collision_blocks[0].size.x = 21.0;
        assert_ne!(a, b);
    }

    #[test]
    fn test_unset_state() {
        assert!(AvatarState::default().is_unset());
        assert!(!standing().is_unset());
        assert!(!AvatarState::default().block(block_ids::AVATAR).is_present());
    }

    #[test]
    fn test_motion_through_setters() {
        let mut avatar = Avatar::new(DVec3::new(1.0, 2.0, 3.0), standing());
        avatar.translate(DVec2::new(4.0, -2.0));
        assert_eq!(avatar.position(), DVec3::new(5.0, 0.0, 3.0));

        avatar.set_velocity(DVec3::new(10.0, -20.0, 0.0));
        avatar.set_velocity(avatar.velocity().with_y(0.0));
        assert_eq!(avatar.velocity(), DVec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_mark_rendered_snapshots() {
        let mut avatar = Avatar::new(DVec3::new(5.0, 6.0, 0.0), standing());
        assert!(avatar.last_rendered_state().is_unset());

        avatar.mark_rendered();
        avatar.translate(DVec2::new(1.0, -1.0));
        avatar.set_state(AvatarState::new("Running", "Running", Direction::Left));

        assert_eq!(avatar.last_rendered_position(), DVec3::new(5.0, 6.0, 0.0));
        assert_eq!(avatar.last_rendered_state().state, "Standing");
        assert_eq!(avatar.position(), DVec3::new(6.0, 5.0, 0.0));
        assert_eq!(avatar.direction(), Direction::Left);
        // Command is independent of the current state
        assert_eq!(avatar.command().state, "Standing");
    }

    #[test]
    fn test_level_classification() {
        let mut level = Level::new();
        let floor = level.add_tile(Rect::from_centre(0.0, 0.0, 32.0, 32.0), TileFlags::floor());
        let wall = level.add_tile(Rect::from_centre(32.0, 32.0, 32.0, 32.0), TileFlags::left_wall());
        let ledge = level.add_tile(
            Rect::from_centre(32.0, 64.0, 32.0, 32.0),
            TileFlags {
                floor: true,
                left_wall: true,
                ..Default::default()
            },
        );

        assert_ne!(floor, wall);
        assert_eq!(level.floors().len(), 2);
        assert_eq!(level.walls().len(), 2);
        assert_eq!(level.ledges().len(), 1);
        assert_eq!(level.ledges()[0].id, ledge);
        assert!(level.tile(wall).is_some_and(|t| t.is_wall()));
        assert!(level.tile(TileId(99)).is_none());
    }

    #[test]
    fn test_id_allocator_sequential() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), 1);
        assert_eq!(ids.allocate(), 2);
    }
}
