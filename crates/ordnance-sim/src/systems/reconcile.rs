//! Pairing authoritative projectiles with the client's own fakes.
//!
//! When a replicated projectile fired by the local connection arrives, the
//! closest outstanding fake of the same kind heading the same way is linked
//! to it. One half stays visible and colliding, the other hides and mirrors.

use hecs::{Entity, World};
use tracing::{debug, info};

use ordnance_core::components::{PairLink, Presence, Projectile};
use ordnance_core::constants::MATCH_TIE_DISTANCE;
use ordnance_core::enums::{FakePolicy, LifecyclePhase};
use ordnance_core::types::{ConnectionId, Position, Velocity};

use crate::prediction::FakeRegistry;

use super::lifecycle;
use super::mirror;
use super::SimContext;

/// Best outstanding fake for `authoritative`, without modifying anything.
///
/// Candidates must share the kind, still be active and (unless the kind is
/// gravity-affected) move in nearly the same direction. The closest wins;
/// candidates within `MATCH_TIE_DISTANCE` of each other are tied, and the
/// one furthest behind along the flight direction wins.
pub fn find_match(
    world: &World,
    registry: &FakeRegistry,
    connection: ConnectionId,
    authoritative: Entity,
    dot_threshold: f64,
) -> Option<Entity> {
    let kind = world.get::<&Projectile>(authoritative).ok()?.kind;
    let auth_pos = world.get::<&Position>(authoritative).ok()?.0;
    let auth_dir = world.get::<&Velocity>(authoritative).ok()?.direction();

    let mut best: Option<(Entity, f64, f64)> = None;
    for &fake in registry.outstanding(connection) {
        let eligible = world
            .get::<&Projectile>(fake)
            .map(|p| p.fake && p.kind == kind && !p.exploded)
            .unwrap_or(false);
        if !eligible || lifecycle::phase_of(world, fake) != LifecyclePhase::Active {
            continue;
        }
        let (Ok(pos), Ok(vel)) = (world.get::<&Position>(fake), world.get::<&Velocity>(fake)) else {
            continue;
        };
        if !kind.is_gravity_affected() && auth_dir.dot(vel.direction()) <= dot_threshold {
            continue;
        }

        let offset = pos.0 - auth_pos;
        let distance = offset.length();
        let along = offset.dot(auth_dir);
        let better = match best {
            None => true,
            Some((_, best_distance, best_along)) => {
                distance < best_distance - MATCH_TIE_DISTANCE
                    || ((distance - best_distance).abs() <= MATCH_TIE_DISTANCE && along < best_along)
            }
        };
        if better {
            best = Some((fake, distance, along));
        }
    }

    best.map(|(fake, _, _)| fake)
}

/// Match `authoritative` against the connection's outstanding fakes and link the pair.
///
/// Returns the matched fake. With no candidate the authoritative projectile
/// simply stays unpaired.
pub fn reconcile(
    world: &mut World,
    ctx: &mut SimContext<'_>,
    registry: &mut FakeRegistry,
    connection: ConnectionId,
    authoritative: Entity,
    prediction_time: f64,
) -> Option<Entity> {
    let Some(fake) = find_match(
        world,
        registry,
        connection,
        authoritative,
        ctx.config.match_dot_threshold,
    ) else {
        debug!(?authoritative, %connection, "No fake matched authoritative projectile");
        return None;
    };
    registry.take(connection, fake);

    let (primary, hidden) = match ctx.config.fake_policy {
        FakePolicy::MoveFakeToAuthoritative => (authoritative, fake),
        FakePolicy::MoveAuthoritativeToFake => (fake, authoritative),
    };
    let _ = world.insert_one(primary, PairLink { partner: hidden, primary: true });
    let _ = world.insert_one(hidden, PairLink { partner: primary, primary: false });

    mirror::copy_state(world, primary, hidden);
    if let Ok(mut presence) = world.get::<&mut Presence>(hidden) {
        presence.visible = false;
        presence.collision_enabled = false;
        presence.movement_enabled = false;
    }

    unify_lifespans(world, ctx.now, authoritative, fake, prediction_time);

    let distance = world
        .get::<&Position>(authoritative)
        .ok()
        .zip(world.get::<&Position>(fake).ok())
        .map(|(a, f)| a.0.distance(f.0))
        .unwrap_or(0.0);
    info!(?authoritative, ?fake, policy = ?ctx.config.fake_policy, distance, "Matched fake projectile");

    // The authoritative half may already be finished (ephemeral or hit during catch-up).
    if lifecycle::phase_of(world, authoritative) != LifecyclePhase::Active {
        lifecycle::shut_down(world, ctx, authoritative);
    }
    Some(fake)
}

/// Both halves expire at the earlier of the fake's expiry and the
/// authoritative lifespan measured from the moment it was fired.
fn unify_lifespans(
    world: &mut World,
    now: f64,
    authoritative: Entity,
    fake: Entity,
    prediction_time: f64,
) {
    let Ok(fake_expiry) = world.get::<&Projectile>(fake).map(|p| p.expires_at) else {
        return;
    };
    let Ok(lifespan) = world
        .get::<&Projectile>(authoritative)
        .map(|p| p.kind.movement_params().lifespan_secs)
    else {
        return;
    };
    let expires_at = fake_expiry.min(now + lifespan - prediction_time);
    for entity in [authoritative, fake] {
        if let Ok(mut proj) = world.get::<&mut Projectile>(entity) {
            proj.expires_at = expires_at;
        }
    }
}
