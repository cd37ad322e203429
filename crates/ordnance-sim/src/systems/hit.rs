//! Hit pipeline: ignore rules, direct damage, explosions and radial damage.
//!
//! A movement event becomes a hit on `other`. Hits against combatants deal
//! direct damage first, then the projectile explodes and hurts everything
//! else in its blast radius. Projectile-vs-projectile hits are resolved
//! symmetrically so both sides explode in the same call.

use glam::DVec3;
use hecs::{Entity, World};
use tracing::{debug, info};

use ordnance_core::components::{
    Collider, Combatant, Knockback, Lifecycle, PairLink, Projectile, TeamShield,
};
use ordnance_core::constants::{FLUSH_EPSILON, OVERKILL_MOMENTUM};
use ordnance_core::enums::{ColliderShape, DamageKind, EffectKind, LifecyclePhase, NetRole};
use ordnance_core::events::{DamageEvent, EffectEvent, SimEvent};
use ordnance_core::types::{Position, TeamId, Velocity};

use super::lifecycle;
use super::movement::{sweep_sphere, Hit, MovementEvent};
use super::SimContext;

/// Whether a hit between `projectile` and `other` should be disregarded.
pub fn should_ignore_hit(
    world: &World,
    projectile: Entity,
    other: Entity,
    role: NetRole,
    now: f64,
) -> bool {
    if other == projectile {
        return true;
    }
    let Ok(proj) = world.get::<&Projectile>(projectile) else {
        return true;
    };
    if proj.exploded {
        return true;
    }
    if let Ok(link) = world.get::<&PairLink>(projectile) {
        if link.partner == other {
            return true;
        }
    }

    // Static geometry is final on every node.
    if let Ok(collider) = world.get::<&Collider>(other) {
        if !collider.blocking {
            let moving = world
                .get::<&Velocity>(projectile)
                .map(|v| v.0 != DVec3::ZERO)
                .unwrap_or(false);
            return moving;
        }
        if let Ok(shield) = world.get::<&TeamShield>(other) {
            if Some(shield.team) == proj.team && !shield.blocks_team_projectiles {
                return true;
            }
        }
        return false;
    }

    if let Ok(other_proj) = world.get::<&Projectile>(other) {
        if other_proj.exploded || !other_proj.fully_spawned {
            return true;
        }
        if !(proj.kind.is_shootable() && other_proj.kind.is_shootable()) {
            return true;
        }
        if proj.team.is_some() && proj.team == other_proj.team {
            return true;
        }
        return role == NetRole::Client && !other_proj.finalized;
    }

    if let Ok(combatant) = world.get::<&Combatant>(other) {
        if proj.owner == Some(other) {
            let grace_over = proj
                .kind
                .owner_grace_secs()
                .is_some_and(|grace| now - proj.created_at >= grace);
            if !grace_over {
                return true;
            }
        }
        return role == NetRole::Client && !combatant.terminal;
    }

    true
}

/// True once a projectile can no longer take part in hits.
pub fn is_spent(world: &World, entity: Entity) -> bool {
    let exploded = world
        .get::<&Projectile>(entity)
        .map(|p| p.exploded)
        .unwrap_or(true);
    exploded || lifecycle::phase_of(world, entity) != LifecyclePhase::Active
}

/// Route a movement event to the hit pipeline.
pub fn process_event(
    world: &mut World,
    ctx: &mut SimContext<'_>,
    projectile: Entity,
    event: MovementEvent,
) {
    let Some(kind) = world.get::<&Projectile>(projectile).ok().map(|p| p.kind) else {
        return;
    };
    match event {
        MovementEvent::Overlap { other, hit } => process_hit(world, ctx, projectile, other, hit),
        MovementEvent::Stop { other, hit } => {
            if kind.movement_params().bounce.is_some() {
                // Bouncing projectiles come to rest instead of exploding.
                debug!(?projectile, ?kind, "Projectile at rest");
            } else {
                process_hit(world, ctx, projectile, other, hit);
            }
        }
        MovementEvent::Bounce { hit, .. } => {
            emit_effect(ctx, EffectKind::Bounce, projectile, kind, hit.location, hit.normal);
        }
    }
}

/// Resolve a hit of `projectile` against `other`.
pub fn process_hit(
    world: &mut World,
    ctx: &mut SimContext<'_>,
    projectile: Entity,
    other: Entity,
    hit: Hit,
) {
    let Some((owner, team)) = world
        .get::<&Projectile>(projectile)
        .ok()
        .filter(|p| !p.exploded)
        .map(|p| (p.owner, p.team))
    else {
        return;
    };

    let victim_team = world.get::<&Combatant>(other).ok().map(|c| c.team);
    if let Some(victim_team) = victim_team {
        if !is_friendly_fire(ctx, owner, team, other, victim_team) {
            damage_impacted_actor(world, ctx, projectile, other, hit);
        }
    }

    explode(world, ctx, projectile, hit, Some(other));

    // Symmetric resolution for projectile-vs-projectile.
    if world.get::<&Projectile>(other).is_ok() {
        let reversed = Hit {
            location: hit.location,
            normal: -hit.normal,
            travel: world.get::<&Velocity>(other).map(|v| v.0).unwrap_or(DVec3::ZERO),
        };
        process_hit(world, ctx, other, projectile, reversed);
    }
}

/// Direct damage to the combatant the projectile struck.
pub fn damage_impacted_actor(
    world: &mut World,
    ctx: &mut SimContext<'_>,
    projectile: Entity,
    victim: Entity,
    hit: Hit,
) {
    let Some((damage, fake)) = world
        .get::<&Projectile>(projectile)
        .ok()
        .map(|p| (p.damage, p.fake))
    else {
        return;
    };
    if !can_apply_damage(ctx, fake) {
        return;
    }
    let Some(terminal) = world.get::<&Combatant>(victim).ok().map(|c| c.terminal) else {
        return;
    };

    let direction = hit
        .travel
        .try_normalize()
        .unwrap_or(-hit.normal);
    let momentum = momentum_for(damage.momentum, terminal);

    // Radial projectiles deal their full base damage to the actor they hit.
    let kind = if damage.outer_radius > 0.0 {
        DamageKind::Radial
    } else {
        DamageKind::Point
    };
    apply_damage(
        world,
        ctx,
        projectile,
        victim,
        kind,
        damage.base_damage,
        direction * momentum,
        hit.location,
    );
}

/// Explode `projectile` at the hit location.
///
/// Idempotent: the second call on the same entity is a no-op. The hidden half
/// of a matched pair defers to its primary so only one effect plays.
pub fn explode(
    world: &mut World,
    ctx: &mut SimContext<'_>,
    projectile: Entity,
    hit: Hit,
    impacted: Option<Entity>,
) {
    let Some((kind, fake)) = world
        .get::<&Projectile>(projectile)
        .ok()
        .filter(|p| !p.exploded)
        .map(|p| (p.kind, p.fake))
    else {
        return;
    };

    if let Some(primary) = live_primary(world, projectile) {
        if let Ok(mut proj) = world.get::<&mut Projectile>(projectile) {
            proj.exploded = true;
            proj.finalized = true;
        }
        explode(world, ctx, primary, hit, impacted);
        lifecycle::shut_down(world, ctx, projectile);
        return;
    }

    if let Ok(mut proj) = world.get::<&mut Projectile>(projectile) {
        proj.exploded = true;
        proj.detonated = true;
    }
    if let Ok(mut life) = world.get::<&mut Lifecycle>(projectile) {
        life.phase = LifecyclePhase::Exploding;
    }
    if let Ok(mut pos) = world.get::<&mut Position>(projectile) {
        pos.0 = hit.location;
    }

    if can_apply_damage(ctx, fake) {
        hurt_radius(world, ctx, projectile, hit, impacted);
    }

    if let Ok(mut proj) = world.get::<&mut Projectile>(projectile) {
        proj.finalized = true;
    }
    info!(?projectile, ?kind, location = ?hit.location, "Projectile exploded");
    emit_effect(ctx, EffectKind::Explosion, projectile, kind, hit.location, hit.normal);

    lifecycle::shut_down(world, ctx, projectile);
}

/// Radial damage around the explosion point.
///
/// Line of sight is tested from the explosion point and from two offset probe
/// origins (along the surface normal and back along the travel direction), so
/// an explosion flush against a surface still reaches targets above it.
/// Distance is always measured from the real explosion point.
pub fn hurt_radius(
    world: &mut World,
    ctx: &mut SimContext<'_>,
    projectile: Entity,
    hit: Hit,
    impacted: Option<Entity>,
) {
    let Some((damage, kind, owner, team)) = world
        .get::<&Projectile>(projectile)
        .ok()
        .map(|p| (p.damage, p.kind, p.owner, p.team))
    else {
        return;
    };
    if damage.outer_radius <= 0.0 {
        return;
    }

    let origin = hit.location;
    let step = kind.explosion_params().probe_step;
    let mut probes = vec![origin, origin + hit.normal * step];
    if let Some(back) = hit.travel.try_normalize() {
        probes.push(origin - back * step);
    }

    let candidates: Vec<(Entity, DVec3, f64, TeamId, bool)> = world
        .query::<(&Combatant, &Position)>()
        .iter()
        .map(|(e, (c, p))| (e, p.0, c.radius, c.team, c.terminal))
        .collect();

    for (victim, center, radius, victim_team, terminal) in candidates {
        if Some(victim) == impacted {
            continue;
        }
        let distance = (center.distance(origin) - radius).max(0.0);
        if distance > damage.outer_radius {
            continue;
        }
        if is_friendly_fire(ctx, owner, team, victim, victim_team) {
            continue;
        }
        if !probes.iter().any(|probe| line_of_sight(world, *probe, center)) {
            continue;
        }
        let amount = damage.radial_damage_at(distance);
        if amount <= 0.0 {
            continue;
        }
        let direction = (center - origin).try_normalize().unwrap_or(DVec3::Z);
        let momentum = momentum_for(damage.momentum, terminal);
        apply_damage(
            world,
            ctx,
            projectile,
            victim,
            DamageKind::Radial,
            amount,
            direction * momentum,
            origin,
        );
    }
}

/// Whether the segment `from → to` is clear of blocking world geometry.
///
/// A segment starting within `FLUSH_EPSILON` of a plane is treated as blocked
/// by it.
pub fn line_of_sight(world: &World, from: DVec3, to: DVec3) -> bool {
    for (e, (collider, pos)) in world.query::<(&Collider, &Position)>().iter() {
        if !collider.blocking || world.get::<&TeamShield>(e).is_ok() {
            continue;
        }
        match collider.shape {
            ColliderShape::Plane { normal } => {
                let Some(n) = normal.try_normalize() else {
                    continue;
                };
                let d_from = (from - pos.0).dot(n);
                let d_to = (to - pos.0).dot(n);
                if d_from.abs() <= FLUSH_EPSILON || d_from * d_to < 0.0 {
                    return false;
                }
            }
            ColliderShape::Sphere { radius } => {
                if sweep_sphere(from, to, pos.0, radius).is_some() {
                    return false;
                }
            }
        }
    }
    true
}

/// The live primary partner of a hidden half, if any.
pub fn live_primary(world: &World, entity: Entity) -> Option<Entity> {
    let link = *world.get::<&PairLink>(entity).ok()?;
    if link.primary {
        return None;
    }
    let partner_alive = world
        .get::<&Projectile>(link.partner)
        .map(|p| !p.exploded)
        .unwrap_or(false);
    partner_alive.then_some(link.partner)
}

fn can_apply_damage(ctx: &SimContext<'_>, fake: bool) -> bool {
    ctx.role() == NetRole::Authority && !fake
}

fn is_friendly_fire(
    ctx: &SimContext<'_>,
    owner: Option<Entity>,
    team: Option<TeamId>,
    victim: Entity,
    victim_team: TeamId,
) -> bool {
    !ctx.config.friendly_fire && Some(victim) != owner && team == Some(victim_team)
}

fn momentum_for(momentum: f64, terminal: bool) -> f64 {
    if momentum == 0.0 && terminal {
        OVERKILL_MOMENTUM
    } else {
        momentum
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_damage(
    world: &mut World,
    ctx: &mut SimContext<'_>,
    projectile: Entity,
    victim: Entity,
    kind: DamageKind,
    amount: f64,
    momentum: DVec3,
    origin: DVec3,
) {
    if !ctx.damage_ledger.insert((projectile, victim)) {
        return;
    }

    if let Ok(mut combatant) = world.get::<&mut Combatant>(victim) {
        combatant.health -= amount;
        if combatant.health <= 0.0 {
            combatant.terminal = true;
        }
    }
    if let Ok(mut knockback) = world.get::<&mut Knockback>(victim) {
        knockback.0 += momentum;
    }

    let instigator = match world.get::<&mut Projectile>(projectile) {
        Ok(mut proj) => {
            proj.stats_credit += amount;
            proj.owner
        }
        Err(_) => None,
    };

    debug!(?projectile, ?victim, ?kind, amount, "Damage applied");
    ctx.emit(SimEvent::Damage(DamageEvent {
        projectile,
        instigator,
        victim,
        kind,
        amount,
        momentum,
        origin,
        tick: ctx.tick,
    }));
}

pub(crate) fn emit_effect(
    ctx: &mut SimContext<'_>,
    effect: EffectKind,
    projectile: Entity,
    projectile_kind: ordnance_core::kinds::ProjectileKind,
    location: DVec3,
    normal: DVec3,
) {
    ctx.emit(SimEvent::Effect(EffectEvent {
        effect,
        projectile,
        projectile_kind,
        location,
        normal,
    }));
}
