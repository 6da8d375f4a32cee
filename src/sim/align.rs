//! Position realignment across animation transitions
//!
//! When the avatar switches animation state the new frame's blocks sit at
//! different offsets than the old ones. Each function here picks a reference
//! point on a block of the last-rendered state and moves the avatar so the
//! same point on the current state's block lands on it, keeping the sprite
//! visually anchored.
//!
//! All of them:
//! - do nothing before the first frame has been rendered
//! - mirror the last-rendered block when the avatar turned around
//! - re-check the anchor after moving and report [`AlignmentError`] on
//!   disagreement, restoring the original position
//!
//! Call these before [`Avatar::mark_rendered`] advances the snapshot.

use glam::DVec2;
use thiserror::Error;

use super::block::{CollisionBlock, block_ids, block_to_world_rect};
use super::collision::ledge_corner;
use super::rect::Anchor;
use super::state::{Avatar, Tile, TileCollision};
use crate::consts::ALIGNMENT_TOLERANCE;
use crate::{Direction, Side};

/// Realignment left the anchor away from its reference
///
/// This only happens when offset or mirroring math is broken (or the
/// position is not finite); it is never a gameplay condition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignmentError {
    #[error("{function}: anchor off by ({dx}, {dy}) after realignment")]
    AnchorMismatch {
        function: &'static str,
        dx: f64,
        dy: f64,
    },
}

/// Move the avatar by `delta`, then confirm `block`'s anchor sits on `target`
fn shift_and_verify(
    avatar: &mut Avatar,
    block: &CollisionBlock,
    anchor: Anchor,
    delta: DVec2,
    target: DVec2,
    function: &'static str,
) -> Result<(), AlignmentError> {
    let original = avatar.position();
    avatar.translate(delta);
    let actual = block_to_world_rect(block, avatar.position(), false).anchor(anchor);
    verify(avatar, original, actual, target, function)
}

fn verify(
    avatar: &mut Avatar,
    original: glam::DVec3,
    actual: DVec2,
    target: DVec2,
    function: &'static str,
) -> Result<(), AlignmentError> {
    let off = actual - target;
    // NaN must fail the check
    if off.x.abs() <= ALIGNMENT_TOLERANCE && off.y.abs() <= ALIGNMENT_TOLERANCE {
        return Ok(());
    }
    avatar.set_position(original);
    log::error!("{function}: anchor off by ({}, {}) after realignment", off.x, off.y);
    Err(AlignmentError::AnchorMismatch {
        function,
        dx: off.x,
        dy: off.y,
    })
}

#[inline]
fn turned_around(avatar: &Avatar) -> bool {
    avatar.last_rendered_state().direction != avatar.direction()
}

/// Keep `anchor` of block `id` where it was at the last render
fn align_block_anchor(
    avatar: &mut Avatar,
    id: &str,
    anchor: Anchor,
    function: &'static str,
) -> Result<(), AlignmentError> {
    let last_state = avatar.last_rendered_state();
    if last_state.is_unset() {
        return Ok(());
    }
    let last_block = last_state.block(id);
    let current_block = avatar.state().block(id);
    if !last_block.is_present() || !current_block.is_present() {
        log::warn!("{function}: no {id} block on both states, skipping");
        return Ok(());
    }

    let reference =
        block_to_world_rect(last_block, avatar.last_rendered_position(), turned_around(avatar)).anchor(anchor);
    let current = block_to_world_rect(current_block, avatar.position(), false).anchor(anchor);
    let current_block = current_block.clone();
    shift_and_verify(avatar, &current_block, anchor, reference - current, reference, function)
}

fn both_contacting(avatar: &Avatar, id: &str) -> bool {
    let current = avatar.state().block(id);
    let last = avatar.last_rendered_state().block(id);
    current.is_present() && current.is_contacting && last.is_present() && last.is_contacting
}

/// Anchor on whichever foot stayed on the ground through the transition
///
/// Prefers the right foot, then the left; with neither planted, holds the
/// avatar block's bottom corner on the facing side.
pub fn align_on_last_contacting_foot(avatar: &mut Avatar) -> Result<(), AlignmentError> {
    if avatar.last_rendered_state().is_unset() {
        return Ok(());
    }
    if both_contacting(avatar, block_ids::RIGHT_FOOT) {
        align_on_right_foot(avatar)
    } else if both_contacting(avatar, block_ids::LEFT_FOOT) {
        align_on_left_foot(avatar)
    } else {
        match avatar.direction() {
            Direction::Right => align_on_avatar_block_bottom_right(avatar),
            Direction::Left => align_on_avatar_block_bottom_left(avatar),
        }
    }
}

pub fn align_on_right_foot(avatar: &mut Avatar) -> Result<(), AlignmentError> {
    align_block_anchor(avatar, block_ids::RIGHT_FOOT, Anchor::BottomRight, "align_on_right_foot")
}

/// Uses the foot's bottom-right corner, like [`align_on_right_foot`]
pub fn align_on_left_foot(avatar: &mut Avatar) -> Result<(), AlignmentError> {
    align_block_anchor(avatar, block_ids::LEFT_FOOT, Anchor::BottomRight, "align_on_left_foot")
}

pub fn align_on_avatar_block_bottom_right(avatar: &mut Avatar) -> Result<(), AlignmentError> {
    align_block_anchor(
        avatar,
        block_ids::AVATAR,
        Anchor::BottomRight,
        "align_on_avatar_block_bottom_right",
    )
}

pub fn align_on_avatar_block_bottom_left(avatar: &mut Avatar) -> Result<(), AlignmentError> {
    align_block_anchor(
        avatar,
        block_ids::AVATAR,
        Anchor::BottomLeft,
        "align_on_avatar_block_bottom_left",
    )
}

pub fn align_on_avatar_block_top_right(avatar: &mut Avatar) -> Result<(), AlignmentError> {
    align_block_anchor(avatar, block_ids::AVATAR, Anchor::TopRight, "align_on_avatar_block_top_right")
}

pub fn align_on_avatar_block_top_left(avatar: &mut Avatar) -> Result<(), AlignmentError> {
    align_block_anchor(avatar, block_ids::AVATAR, Anchor::TopLeft, "align_on_avatar_block_top_left")
}

/// Keep the hand centre fixed, e.g. while climbing from a hang
///
/// States without a `Hand` block fall back to the avatar block's bottom-right.
pub fn align_on_last_hand(avatar: &mut Avatar) -> Result<(), AlignmentError> {
    if avatar.last_rendered_state().is_unset() {
        return Ok(());
    }
    let has_hand = avatar.state().block(block_ids::HAND).is_present()
        && avatar.last_rendered_state().block(block_ids::HAND).is_present();
    if !has_hand {
        return align_on_avatar_block_bottom_right(avatar);
    }
    align_block_anchor(avatar, block_ids::HAND, Anchor::Centre, "align_on_last_hand")
}

/// Put the hand centre on the grabbed corner of a ledge
pub fn align_on_last_ledge_edge(avatar: &mut Avatar, ledge: &TileCollision<'_>) -> Result<(), AlignmentError> {
    if avatar.last_rendered_state().is_unset() {
        return Ok(());
    }
    let hand = avatar.state().block(block_ids::HAND);
    if !hand.is_present() {
        log::warn!("align_on_last_ledge_edge: state {} has no Hand block", avatar.state().state);
        return Ok(());
    }
    let Some(corner) = ledge_corner(ledge.tile, ledge.side) else {
        log::warn!("align_on_last_ledge_edge: {} is not a ledge face", ledge.side.as_str());
        return Ok(());
    };

    let current = block_to_world_rect(hand, avatar.position(), false).centre();
    let hand = hand.clone();
    shift_and_verify(
        avatar,
        &hand,
        Anchor::Centre,
        corner - current,
        corner,
        "align_on_last_ledge_edge",
    )
}

/// Re-anchor after the avatar block changed size, e.g. crouch to stand
pub fn align_on_last_avatar_collision_block(avatar: &mut Avatar) -> Result<(), AlignmentError> {
    match avatar.direction() {
        Direction::Right => align_on_last_avatar_collision_block_right_bottom(avatar),
        Direction::Left => align_on_last_avatar_collision_block_left_bottom(avatar),
    }
}

/// Hold the avatar block's bottom-right corner through a size change
///
/// The last block is mirrored whenever the avatar turned around.
pub fn align_on_last_avatar_collision_block_right_bottom(avatar: &mut Avatar) -> Result<(), AlignmentError> {
    resize_anchor(
        avatar,
        Direction::Right,
        turned_around(avatar),
        "align_on_last_avatar_collision_block_right_bottom",
    )
}

/// Hold the avatar block's bottom-left corner through a size change
///
/// Unlike the right-bottom variant the last block is never mirrored.
pub fn align_on_last_avatar_collision_block_left_bottom(avatar: &mut Avatar) -> Result<(), AlignmentError> {
    resize_anchor(
        avatar,
        Direction::Left,
        false,
        "align_on_last_avatar_collision_block_left_bottom",
    )
}

fn resize_anchor(
    avatar: &mut Avatar,
    held_side: Direction,
    mirror_last: bool,
    function: &'static str,
) -> Result<(), AlignmentError> {
    let last_state = avatar.last_rendered_state();
    if last_state.is_unset() {
        return Ok(());
    }
    let last_block = last_state.block(block_ids::AVATAR);
    let current_block = avatar.state().block(block_ids::AVATAR);
    if !last_block.is_present() || !current_block.is_present() {
        log::warn!("{function}: no Avatar block on both states, skipping");
        return Ok(());
    }

    let last_block = if mirror_last {
        last_block.mirrored()
    } else {
        last_block.clone()
    };
    let current_block = current_block.clone();
    let anchor = match held_side {
        Direction::Right => Anchor::BottomRight,
        Direction::Left => Anchor::BottomLeft,
    };
    let last_position = avatar.last_rendered_position();
    let target = block_to_world_rect(&last_block, last_position, false).anchor(anchor);
    let original = avatar.position();

    // Size change: the held edge and the bottom stay put
    let half_growth = (current_block.size - last_block.size) / 2.0;
    avatar.set_position(last_position);
    avatar.translate(DVec2::new(-half_growth.x * held_side.sign(), half_growth.y));

    // Then the change in block centre offset
    avatar.translate(last_block.offset_from_centre - current_block.offset_from_centre);

    let actual = block_to_world_rect(&current_block, avatar.position(), false).anchor(anchor);
    verify(avatar, original, actual, target, function)
}

/// Snap the avatar block flush against one edge of a tile
///
/// `side` names the tile edge: `Top` stands the avatar on the tile, `Right`
/// puts it against the tile's right face. No post-check is made.
pub fn move_avatar_adjacent_to_tile(avatar: &mut Avatar, side: Side, tile: &Tile) {
    let block = avatar.state().block(block_ids::AVATAR);
    if !block.is_present() {
        log::warn!("move_avatar_adjacent_to_tile: state {} has no Avatar block", avatar.state().state);
        return;
    }
    let half = block.size / 2.0;
    let offset = block.offset_from_centre;
    let mut position = avatar.position();
    match side {
        Side::Right => position.x = tile.rect.right() + half.x - offset.x,
        Side::Left => position.x = tile.rect.left() - half.x - offset.x,
        Side::Top => position.y = tile.rect.top() + half.y - offset.y,
        Side::Bottom => position.y = tile.rect.bottom() - half.y - offset.y,
    }
    avatar.set_position(position);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rect::Rect;
    use crate::sim::state::{AvatarState, TileFlags, TileId};
    use glam::DVec3;

    fn body(offset: DVec2, size: DVec2) -> CollisionBlock {
        CollisionBlock::new(block_ids::AVATAR, offset, size)
    }

    fn foot(id: &str, x: f64, y: f64, contacting: bool) -> CollisionBlock {
        CollisionBlock::new(id, DVec2::new(x, y), DVec2::new(6.0, 4.0)).contacting(contacting)
    }

    fn state(name: &str, direction: Direction, blocks: Vec<CollisionBlock>) -> AvatarState {
        AvatarState::new("Test", name, direction).with_blocks(blocks)
    }

    /// Avatar rendered in `last` at (100, 40), now switched to `current`
    fn transitioned(last: AvatarState, current: AvatarState) -> Avatar {
        let mut avatar = Avatar::new(DVec3::new(100.0, 40.0, 0.0), last);
        avatar.mark_rendered();
        avatar.set_state(current);
        avatar
    }

    fn standing() -> AvatarState {
        state(
            "Standing",
            Direction::Right,
            vec![
                body(DVec2::ZERO, DVec2::new(20.0, 40.0)),
                foot(block_ids::RIGHT_FOOT, 4.0, -18.0, true),
                foot(block_ids::LEFT_FOOT, -4.0, -18.0, true),
            ],
        )
    }

    fn walking() -> AvatarState {
        state(
            "Walking",
            Direction::Right,
            vec![
                body(DVec2::ZERO, DVec2::new(20.0, 40.0)),
                foot(block_ids::RIGHT_FOOT, 8.0, -16.0, true),
                foot(block_ids::LEFT_FOOT, -2.0, -18.0, true),
            ],
        )
    }

    #[test]
    fn test_no_prior_frame_is_noop() {
        let mut avatar = Avatar::new(DVec3::new(5.0, 5.0, 0.0), walking());
        assert_eq!(align_on_right_foot(&mut avatar), Ok(()));
        assert_eq!(align_on_last_contacting_foot(&mut avatar), Ok(()));
        assert_eq!(align_on_last_avatar_collision_block(&mut avatar), Ok(()));
        assert_eq!(avatar.position(), DVec3::new(5.0, 5.0, 0.0));
    }

    #[test]
    fn test_align_on_right_foot() {
        let mut avatar = transitioned(standing(), walking());
        align_on_right_foot(&mut avatar).unwrap();
        // Reference corner (107, 20), walking foot corner was (111, 22)
        assert_eq!(avatar.position(), DVec3::new(96.0, 38.0, 0.0));
    }

    #[test]
    fn test_align_on_right_foot_is_idempotent() {
        let mut avatar = transitioned(standing(), walking());
        align_on_right_foot(&mut avatar).unwrap();
        let first = avatar.position();
        align_on_right_foot(&mut avatar).unwrap();
        assert_eq!(avatar.position(), first);
    }

    #[test]
    fn test_turning_around_mirrors_reference() {
        let mut turned = standing();
        turned.direction = Direction::Left;
        turned.collision_blocks = turned.collision_blocks.iter().map(CollisionBlock::mirrored).collect();

        let mut avatar = transitioned(standing(), turned);
        align_on_right_foot(&mut avatar).unwrap();
        // Same frame, just facing the other way: no jump
        assert_eq!(avatar.position(), DVec3::new(100.0, 40.0, 0.0));
    }

    #[test]
    fn test_contacting_foot_prefers_right() {
        let mut avatar = transitioned(standing(), walking());
        align_on_last_contacting_foot(&mut avatar).unwrap();
        assert_eq!(avatar.position(), DVec3::new(96.0, 38.0, 0.0));
    }

    #[test]
    fn test_contacting_foot_falls_back_to_left_foot() {
        let mut lifted = walking();
        lifted.collision_blocks[1].is_contacting = false;

        let mut avatar = transitioned(standing(), lifted);
        align_on_last_contacting_foot(&mut avatar).unwrap();
        // Left foot corner: reference (99, 20), current (101, 20)
        assert_eq!(avatar.position(), DVec3::new(98.0, 40.0, 0.0));
    }

    #[test]
    fn test_contacting_foot_falls_back_to_avatar_block() {
        let airborne = |direction| {
            state(
                "Jumping",
                direction,
                vec![body(DVec2::new(4.0, -5.0), DVec2::new(24.0, 30.0))],
            )
        };
        let mut last = standing();
        last.collision_blocks.truncate(1);

        // Facing right holds the bottom-right corner: (110, 20) vs (116, 20)
        let mut avatar = transitioned(last.clone(), airborne(Direction::Right));
        align_on_last_contacting_foot(&mut avatar).unwrap();
        assert_eq!(avatar.position(), DVec3::new(94.0, 40.0, 0.0));

        // Facing left holds the bottom-left corner: (90, 20) vs (92, 20)
        let mut last_left = last;
        last_left.direction = Direction::Left;
        let mut avatar = transitioned(last_left, airborne(Direction::Left));
        align_on_last_contacting_foot(&mut avatar).unwrap();
        assert_eq!(avatar.position(), DVec3::new(98.0, 40.0, 0.0));
    }

    #[test]
    fn test_avatar_block_corners() {
        let last = state("Crouching", Direction::Right, vec![body(DVec2::new(0.0, -10.0), DVec2::new(20.0, 20.0))]);
        let current = state("Standing", Direction::Right, vec![body(DVec2::ZERO, DVec2::new(20.0, 40.0))]);

        let mut avatar = transitioned(last.clone(), current.clone());
        align_on_avatar_block_bottom_left(&mut avatar).unwrap();
        assert_eq!(avatar.position(), DVec3::new(100.0, 40.0, 0.0));

        // Holding the top instead drops the taller block by 20
        let mut avatar = transitioned(last.clone(), current.clone());
        align_on_avatar_block_top_left(&mut avatar).unwrap();
        assert_eq!(avatar.position(), DVec3::new(100.0, 20.0, 0.0));

        let mut avatar = transitioned(last, current);
        align_on_avatar_block_top_right(&mut avatar).unwrap();
        assert_eq!(avatar.position(), DVec3::new(100.0, 20.0, 0.0));
    }

    fn hanging() -> AvatarState {
        state(
            "Hanging",
            Direction::Right,
            vec![
                body(DVec2::ZERO, DVec2::new(20.0, 40.0)),
                CollisionBlock::new(block_ids::HAND, DVec2::new(10.0, 30.0), DVec2::new(4.0, 4.0)),
            ],
        )
    }

    #[test]
    fn test_align_on_last_hand() {
        let climbing = state(
            "Climbing",
            Direction::Right,
            vec![
                body(DVec2::ZERO, DVec2::new(20.0, 40.0)),
                CollisionBlock::new(block_ids::HAND, DVec2::new(6.0, 36.0), DVec2::new(4.0, 4.0)),
            ],
        );
        let mut avatar = transitioned(hanging(), climbing);
        align_on_last_hand(&mut avatar).unwrap();
        assert_eq!(avatar.position(), DVec3::new(104.0, 34.0, 0.0));
    }

    #[test]
    fn test_align_on_last_hand_without_hand_uses_avatar_block() {
        let landed = state("Landing", Direction::Right, vec![body(DVec2::new(2.0, 0.0), DVec2::new(20.0, 40.0))]);
        let mut avatar = transitioned(hanging(), landed);
        align_on_last_hand(&mut avatar).unwrap();
        assert_eq!(avatar.position(), DVec3::new(98.0, 40.0, 0.0));
    }

    #[test]
    fn test_align_on_last_ledge_edge() {
        let flags = TileFlags {
            floor: true,
            left_wall: true,
            ..Default::default()
        };
        // Top-left corner at (184, 116)
        let ledge = Tile::new(TileId(1), Rect::from_centre(200.0, 100.0, 32.0, 32.0), flags);
        let grab = TileCollision {
            tile: &ledge,
            side: Side::Left,
        };

        let mut avatar = Avatar::new(DVec3::new(170.0, 80.0, 0.0), hanging());
        avatar.mark_rendered();
        align_on_last_ledge_edge(&mut avatar, &grab).unwrap();
        // Hand centre (180, 110) moved onto the corner
        assert_eq!(avatar.position(), DVec3::new(174.0, 86.0, 0.0));
    }

    #[test]
    fn test_align_on_last_ledge_edge_right_face() {
        // Top-right corner at (216, 116)
        let ledge = Tile::new(TileId(1), Rect::from_centre(200.0, 100.0, 32.0, 32.0), TileFlags::right_wall());
        let grab = TileCollision {
            tile: &ledge,
            side: Side::Right,
        };
        let hanging_left = state(
            "Hanging",
            Direction::Left,
            vec![
                body(DVec2::ZERO, DVec2::new(20.0, 40.0)),
                CollisionBlock::new(block_ids::HAND, DVec2::new(-10.0, 30.0), DVec2::new(4.0, 4.0)),
            ],
        );

        let mut avatar = Avatar::new(DVec3::new(230.0, 80.0, 0.0), hanging_left);
        avatar.mark_rendered();
        align_on_last_ledge_edge(&mut avatar, &grab).unwrap();
        // Hand centre (220, 110) moved onto the corner
        assert_eq!(avatar.position(), DVec3::new(226.0, 86.0, 0.0));
    }

    #[test]
    fn test_align_on_last_ledge_edge_needs_hand() {
        let ledge = Tile::new(TileId(1), Rect::from_centre(0.0, 0.0, 32.0, 32.0), TileFlags::left_wall());
        let grab = TileCollision {
            tile: &ledge,
            side: Side::Left,
        };
        let mut avatar = transitioned(standing(), walking());
        align_on_last_ledge_edge(&mut avatar, &grab).unwrap();
        assert_eq!(avatar.position(), DVec3::new(100.0, 40.0, 0.0));
    }

    #[test]
    fn test_size_change_right_bottom() {
        let crouch = state("Crouching", Direction::Right, vec![body(DVec2::new(0.0, -10.0), DVec2::new(20.0, 20.0))]);
        let stand = state("Standing", Direction::Right, vec![body(DVec2::ZERO, DVec2::new(30.0, 40.0))]);

        let mut avatar = transitioned(crouch, stand);
        align_on_last_avatar_collision_block(&mut avatar).unwrap();
        // Bottom-right corner stays at (110, 20)
        assert_eq!(avatar.position(), DVec3::new(95.0, 40.0, 0.0));
    }

    #[test]
    fn test_size_change_left_bottom() {
        let crouch = state("Crouching", Direction::Left, vec![body(DVec2::new(0.0, -10.0), DVec2::new(20.0, 20.0))]);
        let stand = state("Standing", Direction::Left, vec![body(DVec2::ZERO, DVec2::new(30.0, 40.0))]);

        let mut avatar = transitioned(crouch, stand);
        align_on_last_avatar_collision_block(&mut avatar).unwrap();
        // Bottom-left corner stays at (90, 20)
        assert_eq!(avatar.position(), DVec3::new(105.0, 40.0, 0.0));
    }

    #[test]
    fn test_size_change_mirroring_is_right_bottom_only() {
        let crouch_left = state("Crouching", Direction::Left, vec![body(DVec2::new(-4.0, -10.0), DVec2::new(20.0, 20.0))]);
        let stand_right = state("Standing", Direction::Right, vec![body(DVec2::ZERO, DVec2::new(20.0, 40.0))]);

        // Mirrored reference corner: (100 + 4 + 10, 20)
        let mut avatar = transitioned(crouch_left.clone(), stand_right.clone());
        align_on_last_avatar_collision_block_right_bottom(&mut avatar).unwrap();
        assert_eq!(avatar.position(), DVec3::new(104.0, 40.0, 0.0));

        // Unmirrored reference corner: (100 - 4 - 10, 20)
        let mut avatar = transitioned(crouch_left, stand_right);
        align_on_last_avatar_collision_block_left_bottom(&mut avatar).unwrap();
        assert_eq!(avatar.position(), DVec3::new(96.0, 40.0, 0.0));
    }

    #[test]
    fn test_non_finite_position_reports_mismatch() {
        let mut avatar = transitioned(standing(), walking());
        avatar.set_position(DVec3::new(f64::NAN, 40.0, 0.0));

        let err = align_on_right_foot(&mut avatar).unwrap_err();
        assert!(matches!(
            err,
            AlignmentError::AnchorMismatch {
                function: "align_on_right_foot",
                ..
            }
        ));
        assert!(avatar.position().x.is_nan());
        assert_eq!(avatar.position().y, 40.0);
    }

    #[test]
    fn test_move_avatar_adjacent_to_tile() {
        let tile = Tile::new(TileId(1), Rect::from_centre(0.0, 0.0, 32.0, 32.0), TileFlags::floor());
        let s = state("Standing", Direction::Right, vec![body(DVec2::new(2.0, -4.0), DVec2::new(20.0, 40.0))]);
        let mut avatar = Avatar::new(DVec3::new(50.0, 50.0, 3.0), s);

        move_avatar_adjacent_to_tile(&mut avatar, Side::Top, &tile);
        assert_eq!(avatar.position(), DVec3::new(50.0, 40.0, 3.0));

        move_avatar_adjacent_to_tile(&mut avatar, Side::Right, &tile);
        assert_eq!(avatar.position().x, 24.0);

        move_avatar_adjacent_to_tile(&mut avatar, Side::Left, &tile);
        assert_eq!(avatar.position().x, -28.0);

        move_avatar_adjacent_to_tile(&mut avatar, Side::Bottom, &tile);
        // Block top = -16
        assert_eq!(avatar.position().y, -32.0);
    }
}
