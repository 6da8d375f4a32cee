//! Avatar simulation module
//!
//! Everything that moves the avatar through the tile world lives here.
//! All queries are pure over borrowed tiles:
//! - Tiles are never mutated
//! - The avatar is only mutated through its position and state setters
//! - Realignment runs before the last-rendered snapshot advances

pub mod align;
pub mod animation;
pub mod block;
pub mod collision;
pub mod geometry;
pub mod rect;
pub mod state;
pub mod tick;

pub use align::{
    AlignmentError, align_on_avatar_block_bottom_left, align_on_avatar_block_bottom_right,
    align_on_avatar_block_top_left, align_on_avatar_block_top_right,
    align_on_last_avatar_collision_block, align_on_last_avatar_collision_block_left_bottom,
    align_on_last_avatar_collision_block_right_bottom, align_on_last_contacting_foot,
    align_on_last_hand, align_on_last_ledge_edge, align_on_left_foot, align_on_right_foot,
    move_avatar_adjacent_to_tile,
};
pub use animation::{AnimationError, AnimationFrame, AnimationSet, AnimationSubset, SheetBlock, SheetRect};
pub use block::{CollisionBlock, block_ids, block_to_world_rect, lookup_named_block};
pub use collision::{can_grab_ledge, can_grab_ledge_within, floor_adjacent, floor_colliding, wall_colliding};
pub use geometry::{distance, segments_intersect};
pub use rect::{Anchor, Rect, SideContact};
pub use state::{Avatar, AvatarState, IdAllocator, Level, Tile, TileCollision, TileFlags, TileId};
pub use tick::{TickEvents, tick};
