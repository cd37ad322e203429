//! Lifecycle: shutdown, deferred destruction, lifespan expiry and pair propagation.

use glam::DVec3;
use hecs::{Entity, World};
use tracing::debug;

use ordnance_core::components::{Lifecycle, PairLink, Presence, Projectile};
use ordnance_core::enums::{EffectKind, LifecyclePhase, NetRole};
use ordnance_core::events::SimEvent;
use ordnance_core::types::{Position, Velocity};

use super::hit::{self, emit_effect};
use super::movement::Hit;
use super::SimContext;

/// Current phase of an entity. Entities no longer in the world are `Destroyed`.
pub fn phase_of(world: &World, entity: Entity) -> LifecyclePhase {
    world
        .get::<&Lifecycle>(entity)
        .map(|life| life.phase)
        .unwrap_or(LifecyclePhase::Destroyed)
}

/// Partner of a matched pair, if linked.
pub fn partner_of(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<&PairLink>(entity).ok().map(|link| link.partner)
}

/// Begin shutting a projectile down.
///
/// A projectile that never exploded is marked exploded and finalized without
/// damage or effect. Collision and movement stop, looping effects end, stats
/// are credited and destruction is scheduled after the shutdown grace. The
/// partner of a matched pair follows in the same call.
pub fn shut_down(world: &mut World, ctx: &mut SimContext<'_>, entity: Entity) {
    match phase_of(world, entity) {
        LifecyclePhase::Destroyed => return,
        LifecyclePhase::ShuttingDown => {
            propagate(world, ctx, entity);
            return;
        }
        LifecyclePhase::Active | LifecyclePhase::Exploding => {}
    }

    let (kind, owner, fake, credit) = match world.get::<&mut Projectile>(entity) {
        Ok(mut proj) => {
            // Forced teardown: no damage, no effect.
            proj.exploded = true;
            proj.finalized = true;
            let credit = std::mem::take(&mut proj.stats_credit);
            (proj.kind, proj.owner, proj.fake, credit)
        }
        Err(_) => return,
    };
    let location = world.get::<&Position>(entity).map(|p| p.0).unwrap_or(DVec3::ZERO);

    if let Ok(mut life) = world.get::<&mut Lifecycle>(entity) {
        life.phase = LifecyclePhase::ShuttingDown;
        life.destroy_at = Some(ctx.now + ctx.config.shutdown_grace_secs());
    }
    if let Ok(mut presence) = world.get::<&mut Presence>(entity) {
        presence.collision_enabled = false;
        presence.movement_enabled = false;
    }
    if let Ok(mut vel) = world.get::<&mut Velocity>(entity) {
        vel.0 = DVec3::ZERO;
    }

    if kind.explosion_params().has_trail {
        emit_effect(ctx, EffectKind::StopLoop, entity, kind, location, DVec3::Z);
    }
    if credit > 0.0 && !fake && ctx.role() == NetRole::Authority {
        ctx.emit(SimEvent::StatsCredited {
            owner,
            kind,
            damage: credit,
        });
    }
    debug!(?entity, ?kind, "Projectile shutting down");

    propagate(world, ctx, entity);
}

fn propagate(world: &mut World, ctx: &mut SimContext<'_>, entity: Entity) {
    if let Some(partner) = partner_of(world, entity) {
        if phase_of(world, partner) < LifecyclePhase::ShuttingDown {
            shut_down(world, ctx, partner);
        }
    }
}

/// Despawn immediately, unlinking the partner. Returns whether anything was removed.
pub fn destroy_now(world: &mut World, entity: Entity) -> bool {
    if let Some(partner) = partner_of(world, entity) {
        let points_back = world
            .get::<&PairLink>(partner)
            .map(|link| link.partner == entity)
            .unwrap_or(false);
        if points_back {
            let _ = world.remove_one::<PairLink>(partner);
        }
    }
    world.despawn(entity).is_ok()
}

/// Expire lifespans and despawn projectiles whose shutdown grace has elapsed.
/// Despawned entities are appended to `despawned`.
pub fn run_expiry(world: &mut World, ctx: &mut SimContext<'_>, despawned: &mut Vec<Entity>) {
    let now = ctx.now;
    let expired: Vec<(Entity, bool, DVec3)> = world
        .query::<(&Projectile, &Lifecycle, &Position)>()
        .iter()
        .filter(|(_, (proj, life, _))| {
            life.phase == LifecyclePhase::Active && now >= proj.expires_at
        })
        .map(|(e, (proj, _, pos))| (e, proj.kind.explosion_params().explode_on_expiry, pos.0))
        .collect();

    for (entity, explode_on_expiry, location) in expired {
        // The partner may have taken this one down already.
        if phase_of(world, entity) != LifecyclePhase::Active {
            continue;
        }
        if explode_on_expiry {
            let travel = world.get::<&Velocity>(entity).map(|v| v.0).unwrap_or(DVec3::ZERO);
            let hit = Hit {
                location,
                normal: DVec3::Z,
                travel,
            };
            hit::explode(world, ctx, entity, hit, None);
        } else {
            shut_down(world, ctx, entity);
        }
    }

    let due: Vec<Entity> = world
        .query::<&Lifecycle>()
        .iter()
        .filter(|(_, life)| {
            life.phase == LifecyclePhase::ShuttingDown
                && life.destroy_at.is_some_and(|at| now >= at)
        })
        .map(|(e, _)| e)
        .collect();

    for entity in due {
        if destroy_now(world, entity) {
            despawned.push(entity);
        }
    }
}
