//! Fixed timestep avatar step
//!
//! A minimal owning-controller loop: integrate, resolve floor and wall
//! collisions against the level, look for grabbable ledges, then advance the
//! last-rendered snapshot. Animation state machines sit above this and call
//! the realignment functions before the snapshot moves.

use super::align::move_avatar_adjacent_to_tile;
use super::block::block_ids;
use super::collision::{can_grab_ledge_within, floor_adjacent, floor_colliding, wall_colliding};
use super::state::{Avatar, Level, TileId};
use crate::settings::CollisionSettings;
use crate::Side;

/// What happened to the avatar during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    /// Came down onto a floor this tick
    pub landed: bool,
    /// Resting exactly on a floor after resolution
    pub on_floor: bool,
    /// Tile face the avatar was stopped by
    pub wall: Option<Side>,
    /// First ledge within grab range
    pub ledge: Option<TileId>,
}

/// Advance the avatar by one fixed timestep
pub fn tick(avatar: &mut Avatar, level: &Level, settings: &CollisionSettings, dt: f64) -> TickEvents {
    let mut events = TickEvents::default();

    // Gravity, unless standing on something
    let mut velocity = avatar.velocity();
    if velocity.y <= 0.0 && !floor_adjacent(avatar, level.floors()).is_empty() {
        velocity.y = 0.0;
    } else {
        velocity.y = (velocity.y + settings.gravity * dt).max(-settings.max_fall_speed);
    }
    avatar.set_velocity(velocity);

    // Sideways travel is capped at the body width so the swept corner always
    // starts on the near side of any face it could have passed
    let mut step = velocity.truncate() * dt;
    let body = avatar.state().block(block_ids::AVATAR);
    if body.is_present() && body.size.x > 0.0 {
        step.x = step.x.clamp(-body.size.x, body.size.x);
    }
    avatar.translate(step);

    // Landing: snap onto the highest floor struck from above
    if avatar.velocity().y <= 0.0 {
        let landing = floor_colliding(avatar, level.floors())
            .into_iter()
            .filter(|c| c.side == Side::Top)
            .max_by(|a, b| a.tile.rect.top().total_cmp(&b.tile.rect.top()));
        if let Some(hit) = landing {
            log::debug!("Landed on tile {:?}", hit.tile.id);
            move_avatar_adjacent_to_tile(avatar, Side::Top, hit.tile);
            avatar.set_velocity(avatar.velocity().with_y(0.0));
            events.landed = true;
        }
    }

    // Walls: stop flush against the struck face
    if let Some(hit) = wall_colliding(avatar, level.walls()).into_iter().next() {
        let face = struck_face(hit.side, step.x);
        log::debug!("Hit {} face of tile {:?}", face.as_str(), hit.tile.id);
        move_avatar_adjacent_to_tile(avatar, face, hit.tile);
        avatar.set_velocity(avatar.velocity().with_x(0.0));
        events.wall = Some(face);
    }

    events.ledge = can_grab_ledge_within(avatar, level.ledges(), settings.ledge_grab_range)
        .first()
        .map(|c| c.tile.id);
    events.on_floor = !floor_adjacent(avatar, level.floors()).is_empty();

    avatar.mark_rendered();
    events
}

/// Face met head-on by the sideways travel, or the reported side when not moving
///
/// Overlap classification can name the far face of a tile narrower than the
/// avatar; snapping there would push the avatar through it.
fn struck_face(reported: Side, dx: f64) -> Side {
    if dx > 0.0 {
        Side::Left
    } else if dx < 0.0 {
        Side::Right
    } else {
        reported
    }
}
