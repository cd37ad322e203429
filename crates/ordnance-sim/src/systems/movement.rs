//! Projectile movement: integration, swept collision and bounce response.
//!
//! Each projectile advances by one step of `dt`. The path from the old to the
//! new position is swept as a sphere against combatants, other projectiles
//! and static colliders. The earliest accepted contact ends the step and is
//! reported as a `MovementEvent`; the caller routes it to the hit pipeline
//! before the next projectile moves.

use glam::DVec3;
use hecs::{Entity, World};

use ordnance_core::components::{Collider, Combatant, Lifecycle, Presence, Projectile, SeekTarget};
use ordnance_core::constants::{DT, GRAVITY_Z, SURFACE_PUSH_OUT};
use ordnance_core::enums::{ColliderShape, LifecyclePhase, NetRole};
use ordnance_core::kinds::MovementParams;
use ordnance_core::types::{Position, Rotation, Velocity};

use super::hit;
use super::SimContext;

/// Contact point of a movement event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Impact point on the surface that was hit.
    pub location: DVec3,
    /// Surface normal at the impact point, facing the projectile.
    pub normal: DVec3,
    /// Velocity at the moment of impact.
    pub travel: DVec3,
}

/// Result of one movement step that needs hit processing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementEvent {
    /// Overlapped a combatant, projectile or volume.
    Overlap { other: Entity, hit: Hit },
    /// Stopped against blocking geometry.
    Stop { other: Entity, hit: Hit },
    /// Bounced off blocking geometry and kept moving.
    Bounce { other: Entity, hit: Hit },
}

impl MovementEvent {
    pub fn hit(&self) -> Hit {
        match *self {
            MovementEvent::Overlap { hit, .. }
            | MovementEvent::Stop { hit, .. }
            | MovementEvent::Bounce { hit, .. } => hit,
        }
    }
}

/// Outcome of integrating one projectile.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub position: DVec3,
    pub velocity: DVec3,
    pub event: Option<MovementEvent>,
    /// Came to rest; movement is disabled afterwards.
    pub at_rest: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContactClass {
    Combatant,
    Projectile,
    Blocking,
    Volume,
}

#[derive(Debug, Clone, Copy)]
struct Contact {
    /// Fraction of the step at which the contact happens.
    t: f64,
    other: Entity,
    class: ContactClass,
    normal: DVec3,
}

/// Advance every active projectile by one tick, resolving hits as they occur.
pub fn run(world: &mut World, ctx: &mut SimContext<'_>) {
    let mut movers: Vec<Entity> = world
        .query::<(&Projectile, &Lifecycle, &Presence)>()
        .iter()
        .filter(|(_, (proj, life, presence))| {
            life.phase == LifecyclePhase::Active
                && !proj.exploded
                && (presence.movement_enabled || presence.collision_enabled)
        })
        .map(|(e, _)| e)
        .collect();
    movers.sort_by_key(|e| e.to_bits());

    for entity in movers {
        // An earlier projectile's hit may already have exploded this one.
        if hit::is_spent(world, entity) {
            continue;
        }
        let Some(step) = step(world, entity, DT, ctx.role(), ctx.now) else {
            continue;
        };
        apply_step(world, entity, &step);
        if let Some(event) = step.event {
            hit::process_event(world, ctx, entity, event);
        }
    }
}

/// Integrate position and velocity over `dt` (no collision).
///
/// Uses the average of the old and new velocity so constant acceleration is
/// integrated exactly.
pub fn integrate(
    position: DVec3,
    velocity: DVec3,
    params: &MovementParams,
    seek_toward: Option<DVec3>,
    dt: f64,
) -> (DVec3, DVec3) {
    if dt <= 0.0 {
        return (position, velocity);
    }

    let mut accel = DVec3::new(0.0, 0.0, GRAVITY_Z * params.gravity_scale);
    if let Some(target) = seek_toward {
        if params.homing_acceleration > 0.0 {
            accel += (target - position).normalize_or_zero() * params.homing_acceleration;
        }
    }

    let mut new_velocity = velocity + accel * dt;
    if params.max_speed > 0.0 {
        new_velocity = new_velocity.clamp_length_max(params.max_speed);
    }
    let new_position = position + (velocity + new_velocity) * 0.5 * dt;
    (new_position, new_velocity)
}

/// Compute one movement step for `entity` without writing it back.
///
/// A projectile at rest (movement disabled, collision enabled) only checks
/// for overlaps at its current position.
pub fn step(world: &World, entity: Entity, dt: f64, role: NetRole, now: f64) -> Option<Step> {
    let (kind, presence, position, velocity) = {
        let proj = world.get::<&Projectile>(entity).ok()?;
        let presence = *world.get::<&Presence>(entity).ok()?;
        let position = world.get::<&Position>(entity).ok()?.0;
        let velocity = world.get::<&Velocity>(entity).ok()?.0;
        (proj.kind, presence, position, velocity)
    };
    let params = kind.movement_params();

    let (new_position, new_velocity) = if presence.movement_enabled {
        let seek_toward = world
            .get::<&SeekTarget>(entity)
            .ok()
            .and_then(|target| world.get::<&Position>(target.0).ok().map(|p| p.0));
        integrate(position, velocity, &params, seek_toward, dt)
    } else {
        (position, velocity)
    };

    let mut result = Step {
        position: new_position,
        velocity: new_velocity,
        event: None,
        at_rest: false,
    };
    if !presence.collision_enabled {
        return Some(result);
    }

    let radius = params.collision_radius;
    let mut contacts = sweep(world, entity, position, new_position, radius);
    contacts.sort_by(|a, b| a.t.total_cmp(&b.t));

    for contact in contacts {
        if hit::should_ignore_hit(world, entity, contact.other, role, now) {
            continue;
        }
        let center = position.lerp(new_position, contact.t);
        let surface = center - contact.normal * radius;
        let hit = Hit {
            location: surface,
            normal: contact.normal,
            travel: new_velocity,
        };

        match contact.class {
            ContactClass::Combatant | ContactClass::Projectile | ContactClass::Volume => {
                result.position = center;
                result.event = Some(MovementEvent::Overlap {
                    other: contact.other,
                    hit,
                });
            }
            ContactClass::Blocking => {
                result.position = center + contact.normal * SURFACE_PUSH_OUT;
                match params.bounce {
                    Some(bounce) => {
                        let normal_part = contact.normal * new_velocity.dot(contact.normal);
                        let tangent_part = new_velocity - normal_part;
                        let reflected = tangent_part * (1.0 - bounce.friction)
                            - normal_part * bounce.restitution;
                        if reflected.length() < bounce.stop_speed {
                            result.velocity = DVec3::ZERO;
                            result.at_rest = true;
                            result.event = Some(MovementEvent::Stop {
                                other: contact.other,
                                hit,
                            });
                        } else {
                            result.velocity = reflected;
                            result.event = Some(MovementEvent::Bounce {
                                other: contact.other,
                                hit,
                            });
                        }
                    }
                    None => {
                        result.velocity = DVec3::ZERO;
                        result.at_rest = true;
                        result.event = Some(MovementEvent::Stop {
                            other: contact.other,
                            hit,
                        });
                    }
                }
            }
        }
        return Some(result);
    }

    Some(result)
}

/// Write a step back into the world.
pub fn apply_step(world: &mut World, entity: Entity, step: &Step) {
    if let Ok(mut pos) = world.get::<&mut Position>(entity) {
        pos.0 = step.position;
    }
    if let Ok(mut vel) = world.get::<&mut Velocity>(entity) {
        vel.0 = step.velocity;
    }
    if step.velocity != DVec3::ZERO {
        if let Ok(mut rot) = world.get::<&mut Rotation>(entity) {
            *rot = Rotation::facing(step.velocity);
        }
    }
    if step.at_rest {
        if let Ok(mut presence) = world.get::<&mut Presence>(entity) {
            presence.movement_enabled = false;
        }
    }
}

/// Every potential contact along the swept path, unordered.
fn sweep(world: &World, entity: Entity, from: DVec3, to: DVec3, radius: f64) -> Vec<Contact> {
    let mut contacts = Vec::new();

    for (other, (combatant, pos)) in world.query::<(&Combatant, &Position)>().iter() {
        if let Some((t, normal)) = sweep_sphere(from, to, pos.0, combatant.radius + radius) {
            contacts.push(Contact {
                t,
                other,
                class: ContactClass::Combatant,
                normal,
            });
        }
    }

    for (other, (proj, pos, presence, life)) in world
        .query::<(&Projectile, &Position, &Presence, &Lifecycle)>()
        .iter()
    {
        if other == entity
            || proj.exploded
            || !presence.collision_enabled
            || life.phase != LifecyclePhase::Active
        {
            continue;
        }
        let combined = proj.kind.movement_params().collision_radius + radius;
        if let Some((t, normal)) = sweep_sphere(from, to, pos.0, combined) {
            contacts.push(Contact {
                t,
                other,
                class: ContactClass::Projectile,
                normal,
            });
        }
    }

    for (other, (collider, pos)) in world.query::<(&Collider, &Position)>().iter() {
        let found = match collider.shape {
            ColliderShape::Sphere { radius: r } => sweep_sphere(from, to, pos.0, r + radius),
            ColliderShape::Plane { normal } => sweep_plane(from, to, pos.0, normal, radius),
        };
        if let Some((t, normal)) = found {
            contacts.push(Contact {
                t,
                other,
                class: if collider.blocking {
                    ContactClass::Blocking
                } else {
                    ContactClass::Volume
                },
                normal,
            });
        }
    }

    contacts
}

/// Segment `from → to` against a sphere. Returns the entry fraction and the
/// outward normal at the entry point. Starting inside counts as `t = 0`.
pub fn sweep_sphere(from: DVec3, to: DVec3, center: DVec3, radius: f64) -> Option<(f64, DVec3)> {
    let d = to - from;
    let m = from - center;
    let fallback = (-d).try_normalize().unwrap_or(DVec3::Z);

    let c = m.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some((0.0, m.try_normalize().unwrap_or(fallback)));
    }

    let a = d.length_squared();
    if a <= f64::EPSILON {
        return None;
    }
    let b = m.dot(d);
    if b >= 0.0 {
        // Moving away
        return None;
    }
    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    let t = (-b - disc.sqrt()) / a;
    if t > 1.0 {
        return None;
    }
    let point = from + d * t;
    Some((t, (point - center).try_normalize().unwrap_or(fallback)))
}

/// Swept sphere against a one-sided plane.
fn sweep_plane(
    from: DVec3,
    to: DVec3,
    point: DVec3,
    normal: DVec3,
    radius: f64,
) -> Option<(f64, DVec3)> {
    let n = normal.try_normalize()?;
    let d0 = (from - point).dot(n) - radius;
    let d1 = (to - point).dot(n) - radius;
    if d0 >= 0.0 && d1 < 0.0 {
        Some((d0 / (d0 - d1), n))
    } else {
        None
    }
}
