//! Entity spawn factories for combatants and static geometry.

use glam::DVec3;
use hecs::{Entity, World};

use ordnance_core::components::{Collider, Combatant, Knockback, TeamShield};
use ordnance_core::constants::{COMBATANT_HEALTH, COMBATANT_RADIUS};
use ordnance_core::enums::ColliderShape;
use ordnance_core::types::{Position, TeamId, Velocity};

/// Spawn a combatant with full health at `position`.
pub fn spawn_combatant(world: &mut World, position: DVec3, team: TeamId) -> Entity {
    world.spawn((
        Combatant {
            team,
            radius: COMBATANT_RADIUS,
            health: COMBATANT_HEALTH,
            max_health: COMBATANT_HEALTH,
            terminal: false,
        },
        Position(position),
        Velocity(DVec3::ZERO),
        Knockback::default(),
    ))
}

/// Spawn an infinite blocking plane through `point`.
pub fn spawn_plane(world: &mut World, point: DVec3, normal: DVec3) -> Entity {
    world.spawn((
        Collider {
            shape: ColliderShape::Plane {
                normal: normal.normalize_or(DVec3::Z),
            },
            blocking: true,
        },
        Position(point),
    ))
}

/// Flat ground at height `z`.
pub fn spawn_ground(world: &mut World, z: f64) -> Entity {
    spawn_plane(world, DVec3::new(0.0, 0.0, z), DVec3::Z)
}

/// Spawn a blocking sphere of geometry (pillar, boulder).
pub fn spawn_obstacle(world: &mut World, center: DVec3, radius: f64) -> Entity {
    world.spawn((
        Collider {
            shape: ColliderShape::Sphere { radius },
            blocking: true,
        },
        Position(center),
    ))
}

/// Spawn a non-blocking spherical volume (kill zone, water).
pub fn spawn_volume(world: &mut World, center: DVec3, radius: f64) -> Entity {
    world.spawn((
        Collider {
            shape: ColliderShape::Sphere { radius },
            blocking: false,
        },
        Position(center),
    ))
}

/// Spawn a spherical team shield.
pub fn spawn_shield(
    world: &mut World,
    center: DVec3,
    radius: f64,
    team: TeamId,
    blocks_team_projectiles: bool,
) -> Entity {
    world.spawn((
        Collider {
            shape: ColliderShape::Sphere { radius },
            blocking: true,
        },
        TeamShield {
            team,
            blocks_team_projectiles,
        },
        Position(center),
    ))
}
