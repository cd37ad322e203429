//! Authority-side replication: the spawn-time gate and ordinary cadence.
//!
//! Fast or explosive projectiles may finish their whole flight before the
//! next ordinary update, so the gate pushes them to relevant observers right
//! after spawn. Everything else goes out every `net_update_interval_ticks`.
//! A finalized projectile gets one terminal push and nothing after it.

use hecs::{Entity, World};
use tracing::{debug, warn};

use ordnance_core::components::{Projectile, Replication};
use ordnance_core::config::SimConfig;
use ordnance_core::events::TickOutput;
use ordnance_core::net::{Outbound, ProjectileSnapshot, ReplicationState};
use ordnance_core::types::{Position, Rotation, Velocity};

use crate::observer::ObserverConnection;

/// Build the snapshot for a networked projectile.
pub fn snapshot_of(world: &World, entity: Entity) -> Option<ProjectileSnapshot> {
    let proj = world.get::<&Projectile>(entity).ok()?;
    let net_id = proj.net_id?;
    Some(ProjectileSnapshot {
        net_id,
        kind: proj.kind,
        state: ReplicationState {
            position: *world.get::<&Position>(entity).ok()?,
            rotation: *world.get::<&Rotation>(entity).ok()?,
            velocity: *world.get::<&Velocity>(entity).ok()?,
        },
        team: proj.team,
        owner_connection: proj.owner_connection,
        exploded: proj.detonated,
        finalized: proj.finalized,
    })
}

/// Push a just-spawned projectile to every relevant, loaded observer.
///
/// Channels are opened on demand; an observer whose channel cannot be opened
/// is skipped with a warning and picked up by ordinary cadence later. The
/// projectile is marked for a re-send at the end of the tick.
pub fn forced_push(
    world: &mut World,
    observers: &mut [ObserverConnection],
    entity: Entity,
    tick: u64,
    config: &SimConfig,
    out: &mut TickOutput,
) {
    let Some(snapshot) = snapshot_of(world, entity) else {
        return;
    };
    if !snapshot.kind.needs_forced_push() {
        return;
    }

    let position = snapshot.state.position.0;
    for observer in observers.iter_mut() {
        if !observer.fully_loaded || !observer.is_relevant(position, config.relevancy_radius) {
            continue;
        }
        if let Err(err) = observer.try_open_channel() {
            warn!(connection = %observer.id, net_id = %snapshot.net_id, error = %err, "Forced push skipped");
            continue;
        }
        out.outbound.push(Outbound {
            connection: observer.id,
            snapshot: snapshot.clone(),
            forced: true,
        });
    }

    if let Ok(mut rep) = world.get::<&mut Replication>(entity) {
        rep.resend_end_of_tick = true;
        rep.last_sent_tick = Some(tick);
    }
}

/// Ordinary replication for one tick.
pub fn run(
    world: &mut World,
    observers: &mut [ObserverConnection],
    tick: u64,
    config: &SimConfig,
    out: &mut TickOutput,
) {
    let cadence_tick = tick.is_multiple_of(config.net_update_interval_ticks.max(1));

    if cadence_tick {
        for observer in observers.iter_mut().filter(|o| o.fully_loaded) {
            if let Err(err) = observer.try_open_channel() {
                debug!(connection = %observer.id, error = %err, "Channel still unavailable");
            }
        }
    }

    let mut due: Vec<Entity> = world
        .query::<(&Projectile, &Replication)>()
        .iter()
        .filter(|(_, (proj, rep))| {
            proj.net_id.is_some()
                && !rep.terminal_sent
                && (proj.finalized || rep.resend_end_of_tick || cadence_tick)
        })
        .map(|(e, _)| e)
        .collect();
    due.sort_by_key(|e| e.to_bits());

    for entity in due {
        send(world, observers, entity, tick, out);
    }
}

/// Terminal push for a finalized projectile leaving the world between ticks.
///
/// Nothing is sent if the terminal push already went out.
pub fn push_terminal(
    world: &mut World,
    observers: &mut [ObserverConnection],
    entity: Entity,
    tick: u64,
    out: &mut TickOutput,
) {
    let pending = world
        .get::<&Replication>(entity)
        .map(|rep| !rep.terminal_sent)
        .unwrap_or(false);
    let finalized = world
        .get::<&Projectile>(entity)
        .map(|proj| proj.finalized)
        .unwrap_or(false);
    if !pending || !finalized {
        return;
    }

    for observer in observers.iter_mut().filter(|o| o.fully_loaded) {
        if let Err(err) = observer.try_open_channel() {
            warn!(connection = %observer.id, ?entity, error = %err, "Terminal push skipped");
        }
    }
    send(world, observers, entity, tick, out);
}

/// Send the current snapshot to every loaded observer with an open channel.
fn send(
    world: &mut World,
    observers: &[ObserverConnection],
    entity: Entity,
    tick: u64,
    out: &mut TickOutput,
) {
    let Some(snapshot) = snapshot_of(world, entity) else {
        return;
    };
    let terminal = snapshot.finalized;
    for observer in observers.iter().filter(|o| o.fully_loaded && o.is_open()) {
        out.outbound.push(Outbound {
            connection: observer.id,
            snapshot: snapshot.clone(),
            forced: false,
        });
    }
    if let Ok(mut rep) = world.get::<&mut Replication>(entity) {
        rep.resend_end_of_tick = false;
        rep.last_sent_tick = Some(tick);
        rep.terminal_sent = terminal;
    }
}
