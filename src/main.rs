//! Tunnelrun demo entry point
//!
//! Drops the avatar into a small tunnel, runs it into a step and stands it
//! up from a crouch, logging what the collision core reports each step.
//! Pass a collision settings JSON path as the first argument to override the
//! defaults.

use std::path::Path;

use glam::{DVec2, DVec3};

use tunnelrun::consts::SIM_DT;
use tunnelrun::sim::{
    Avatar, AvatarState, CollisionBlock, Level, Rect, TileFlags, align_on_last_avatar_collision_block,
    block_ids, tick,
};
use tunnelrun::{CollisionSettings, Direction};

fn body_state(state: &str, offset: DVec2, size: DVec2) -> AvatarState {
    AvatarState::new("Demo", state, Direction::Right).with_blocks(vec![
        CollisionBlock::new(block_ids::AVATAR, offset, size),
        CollisionBlock::new(block_ids::ARM, DVec2::new(8.0, offset.y + size.y / 4.0), DVec2::new(6.0, 6.0)),
    ])
}

fn demo_level() -> Level {
    let mut level = Level::new();
    // Tunnel floor, top at y=16
    for i in 0..8 {
        level.add_tile(Rect::from_centre(i as f64 * 32.0, 0.0, 32.0, 32.0), TileFlags::floor());
    }
    // A one-tile step with a walkable top
    level.add_tile(
        Rect::from_centre(160.0, 32.0, 32.0, 32.0),
        TileFlags {
            floor: true,
            left_wall: true,
            ..Default::default()
        },
    );
    level
}

fn main() {
    env_logger::init();
    log::info!("Tunnelrun demo starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => CollisionSettings::load_or_default(Path::new(&path)),
        None => CollisionSettings::default(),
    };
    let level = demo_level();
    log::info!(
        "Level: {} tiles ({} floors, {} walls, {} ledges)",
        level.tiles().len(),
        level.floors().len(),
        level.walls().len(),
        level.ledges().len()
    );

    let standing = body_state("Standing", DVec2::ZERO, DVec2::new(20.0, 40.0));
    let crouching = body_state("Crouching", DVec2::new(0.0, -10.0), DVec2::new(24.0, 20.0));

    let mut avatar = Avatar::new(DVec3::new(32.0, 80.0, 0.0), standing.clone());
    for frame in 0..60 {
        let events = tick(&mut avatar, &level, &settings, SIM_DT);
        if events.landed {
            log::info!("Frame {frame}: landed at {:?}", avatar.position().truncate());
            break;
        }
    }

    avatar.set_velocity(DVec3::new(240.0, 0.0, 0.0));
    for frame in 0..60 {
        let events = tick(&mut avatar, &level, &settings, SIM_DT);
        if let Some(side) = events.wall {
            log::info!(
                "Frame {frame}: stopped by {} face at {:?}",
                side.as_str(),
                avatar.position().truncate()
            );
            if let Some(ledge) = events.ledge {
                log::info!("Ledge {:?} is within reach", ledge);
            }
            break;
        }
    }

    // Crouch for a frame, then stand back up anchored on the body's corner
    for next in [crouching, standing] {
        avatar.set_state(next);
        if let Err(e) = align_on_last_avatar_collision_block(&mut avatar) {
            log::error!("Realignment failed: {e}");
            std::process::exit(1);
        }
        avatar.mark_rendered();
        log::info!("{} at {:?}", avatar.state().state, avatar.position().truncate());
    }

    log::info!("Tunnelrun demo finished");
}
