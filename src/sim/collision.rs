//! Collision resolution between the avatar and level tiles
//!
//! The tricky part of the avatar physics: the avatar block is swept from its
//! current position back to where it was last rendered, and the swept corner
//! is intersected against tile edges. When a sweep crosses both a floor edge
//! and a wall face of the same tile, the crossing nearest the current position
//! decides which surface was actually hit.
//!
//! Every query here is read-only over the avatar and the tiles. Results hold
//! borrowed tiles and may list the same tile twice, once per swept corner.

use glam::DVec2;

use super::block::{block_ids, block_to_world_rect};
use super::geometry::{distance, segments_intersect};
use super::rect::{Rect, SideContact, side_of_left_right_collision, side_of_top_bottom_collision, x_overlap};
use super::state::{Avatar, Tile, TileCollision};
use crate::consts::LEDGE_GRAB_RANGE;
use crate::{Direction, Side};

/// State whose reference block for floor contact is the right foot
const STOPPING_STATE: &str = "Stopping";

/// Path of one bottom corner of the avatar block between frames
#[derive(Debug, Clone, Copy)]
struct Sweep {
    current: DVec2,
    last: DVec2,
}

impl Sweep {
    fn bottom_corner(current: &Rect, last: &Rect, edge: Direction) -> Self {
        match edge {
            Direction::Right => Self {
                current: current.bottom_right(),
                last: last.bottom_right(),
            },
            Direction::Left => Self {
                current: current.bottom_left(),
                last: last.bottom_left(),
            },
        }
    }

    fn top_edge_hit(&self, tile: &Tile) -> Option<DVec2> {
        segments_intersect(self.current, self.last, tile.rect.top_left(), tile.rect.top_right())
    }

    fn face_hit(&self, tile: &Tile, face: Side) -> Option<DVec2> {
        let (top, bottom) = match face {
            Side::Left => (tile.rect.top_left(), tile.rect.bottom_left()),
            Side::Right => (tile.rect.top_right(), tile.rect.bottom_right()),
            Side::Top | Side::Bottom => return None,
        };
        segments_intersect(self.current, self.last, top, bottom)
    }

    fn distance_to(&self, point: DVec2) -> f64 {
        distance(self.current, point)
    }
}

/// World rects of the whole-avatar block now and at the last render
fn avatar_block_rects(avatar: &Avatar) -> Option<(Rect, Rect)> {
    let current = avatar.state().block(block_ids::AVATAR);
    let last = avatar.last_rendered_state().block(block_ids::AVATAR);
    if !current.is_present() || !last.is_present() {
        return None;
    }
    Some((
        block_to_world_rect(current, avatar.position(), false),
        block_to_world_rect(last, avatar.last_rendered_position(), false),
    ))
}

/// Floor tiles whose top is exactly level with the avatar's feet
///
/// The reference block is `Right_Foot` while stopping and the whole `Avatar`
/// block otherwise. Only tiles that overlap the block horizontally count.
pub fn floor_adjacent<'a>(avatar: &Avatar, floors: impl IntoIterator<Item = &'a Tile>) -> Vec<&'a Tile> {
    let state = avatar.state();
    let id = if state.state == STOPPING_STATE {
        block_ids::RIGHT_FOOT
    } else {
        block_ids::AVATAR
    };
    let block = state.block(id);
    if !block.is_present() {
        log::debug!("floor_adjacent: state {} has no {} block", state.state, id);
        return Vec::new();
    }

    let feet = block_to_world_rect(block, avatar.position(), false);
    floors
        .into_iter()
        .filter(|tile| x_overlap(&tile.rect, &feet) && tile.rect.top() == feet.bottom())
        .collect()
}

/// Floor tiles crossed by the avatar's bottom corners since the last render
///
/// Each corner is swept separately, so a tile can be reported twice. When
/// the tile is also a wall and the sweep crosses one of its faces nearer than
/// its top edge, the avatar hit the wall and no floor collision is reported.
pub fn floor_colliding<'a>(
    avatar: &Avatar,
    floors: impl IntoIterator<Item = &'a Tile>,
) -> Vec<TileCollision<'a>> {
    let Some((current, last)) = avatar_block_rects(avatar) else {
        return Vec::new();
    };

    let mut collisions = Vec::new();
    for tile in floors {
        if tile.rect.top() < current.bottom() {
            continue;
        }

        for edge in [Direction::Right, Direction::Left] {
            let sweep = Sweep::bottom_corner(&current, &last, edge);
            let Some(floor_hit) = sweep.top_edge_hit(tile) else {
                continue;
            };

            if tile.is_wall() {
                let wall_hit = [sweep.face_hit(tile, Side::Left), sweep.face_hit(tile, Side::Right)]
                    .into_iter()
                    .flatten()
                    .map(|p| sweep.distance_to(p))
                    .min_by(f64::total_cmp);
                if let Some(wall_distance) = wall_hit {
                    if wall_distance < sweep.distance_to(floor_hit) {
                        log::trace!(
                            "floor_colliding: tile {:?} wall face nearer than top ({} corner)",
                            tile.id,
                            edge.as_str()
                        );
                        continue;
                    }
                }
            }

            let side = side_of_top_bottom_collision(&tile.rect, &current)
                .and_then(SideContact::side)
                .unwrap_or(Side::Top);
            log::trace!("floor_colliding: tile {:?} struck on {}", tile.id, side.as_str());
            collisions.push(TileCollision { tile, side });
        }
    }
    collisions
}

/// Wall faces crossed by the avatar's leading bottom corner since the last render
///
/// The leading corner follows the sign of the x velocity, or the facing when
/// the avatar has no horizontal speed. A floor tile whose top edge is crossed
/// at least as near as the wall face is treated as a landing instead.
pub fn wall_colliding<'a>(avatar: &Avatar, walls: impl IntoIterator<Item = &'a Tile>) -> Vec<TileCollision<'a>> {
    let Some((current, last)) = avatar_block_rects(avatar) else {
        return Vec::new();
    };

    let velocity = avatar.velocity();
    let leading = if velocity.x > 0.0 {
        Direction::Right
    } else if velocity.x < 0.0 {
        Direction::Left
    } else {
        avatar.direction()
    };
    let sweep = Sweep::bottom_corner(&current, &last, leading);

    let mut collisions = Vec::new();
    for tile in walls {
        let right_face = tile.flags.right_wall && tile.rect.right() <= current.right();
        let left_face = tile.flags.left_wall && tile.rect.left() >= current.left();
        if !right_face && !left_face {
            continue;
        }

        let mut wall_hit: Option<(DVec2, Side)> = None;
        if left_face && velocity.z >= 0.0 {
            wall_hit = sweep.face_hit(tile, Side::Left).map(|p| (p, Side::Left));
        }
        if right_face && velocity.x <= 0.0 {
            if let Some(p) = sweep.face_hit(tile, Side::Right) {
                let nearer = wall_hit.is_none_or(|(q, _)| sweep.distance_to(p) < sweep.distance_to(q));
                if nearer {
                    wall_hit = Some((p, Side::Right));
                }
            }
        }
        let Some((wall_point, face)) = wall_hit else {
            continue;
        };

        if tile.is_floor() {
            if let Some(floor_point) = sweep.top_edge_hit(tile) {
                if sweep.distance_to(wall_point) >= sweep.distance_to(floor_point) {
                    log::trace!("wall_colliding: tile {:?} top edge nearer than face", tile.id);
                    continue;
                }
            }
        }

        let side = side_of_left_right_collision(&tile.rect, &current)
            .and_then(SideContact::side)
            .unwrap_or(face);
        log::trace!("wall_colliding: tile {:?} struck on {}", tile.id, side.as_str());
        collisions.push(TileCollision { tile, side });
    }
    collisions
}

/// The wall face and corner the avatar would grab on a ledge tile
///
/// A tile walled on both sides offers the face the avatar is looking at.
pub(crate) fn ledge_grab_point(tile: &Tile, facing: Direction) -> Option<(Side, DVec2)> {
    let face = match (tile.flags.left_wall, tile.flags.right_wall) {
        (true, true) => Side::from(facing.opposite()),
        (true, false) => Side::Left,
        (false, true) => Side::Right,
        (false, false) => return None,
    };
    ledge_corner(tile, face).map(|corner| (face, corner))
}

/// Top corner of the ledge on the given wall face
pub(crate) fn ledge_corner(tile: &Tile, face: Side) -> Option<DVec2> {
    match face {
        Side::Left => Some(tile.rect.top_left()),
        Side::Right => Some(tile.rect.top_right()),
        Side::Top | Side::Bottom => None,
    }
}

/// Ledges within the fixed grab range of the avatar's arm
pub fn can_grab_ledge<'a>(avatar: &Avatar, ledges: impl IntoIterator<Item = &'a Tile>) -> Vec<TileCollision<'a>> {
    can_grab_ledge_within(avatar, ledges, LEDGE_GRAB_RANGE)
}

/// Ledges whose grab corner is within `range` of the `Arm` block centre
///
/// Both the current facing and the commanded facing must point at the wall
/// face being grabbed, so turning away from a ledge never latches onto it.
pub fn can_grab_ledge_within<'a>(
    avatar: &Avatar,
    ledges: impl IntoIterator<Item = &'a Tile>,
    range: f64,
) -> Vec<TileCollision<'a>> {
    let arm = avatar.state().block(block_ids::ARM);
    if !arm.is_present() {
        log::debug!("can_grab_ledge: state {} has no Arm block", avatar.state().state);
        return Vec::new();
    }
    let reach = block_to_world_rect(arm, avatar.position(), false).centre();
    let facing = avatar.direction();
    let commanded = avatar.command().direction;

    let mut grabs = Vec::new();
    for tile in ledges {
        let Some((face, corner)) = ledge_grab_point(tile, facing) else {
            continue;
        };
        if Side::from(facing.opposite()) != face || Side::from(commanded.opposite()) != face {
            continue;
        }
        if distance(reach, corner) <= range {
            grabs.push(TileCollision { tile, side: face });
        }
    }
    grabs
}
