//! Simulation engine: one network node's projectile world.
//!
//! `SimulationEngine` owns the hecs ECS world and runs the projectile systems
//! at a fixed tick rate. The same engine runs on the authority (canonical
//! projectiles, damage, replication) and on clients (fakes, replicated
//! copies, reconciliation), selected by `SimConfig::role`. Completely
//! headless, enabling deterministic testing.

use std::collections::{HashMap, HashSet};

use glam::DVec3;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use ordnance_core::components::{Presence, Projectile};
use ordnance_core::config::SimConfig;
use ordnance_core::constants::DT;
use ordnance_core::enums::{LifecyclePhase, NetRole};
use ordnance_core::error::{NetError, Result, SpawnError};
use ordnance_core::events::TickOutput;
use ordnance_core::kinds::ProjectileKind;
use ordnance_core::net::ProjectileSnapshot;
use ordnance_core::types::{ConnectionId, NetId, Position, Rotation, SimTime, Velocity};

use crate::observer::ObserverConnection;
use crate::prediction::{ConnectionPredictionContext, FakeRegistry};
use crate::systems::movement::Hit;
use crate::systems::spawn::SpawnRequest;
use crate::systems::{self, SimContext};

/// The simulation engine. Owns the ECS world and all per-node state.
pub struct SimulationEngine {
    world: World,
    config: SimConfig,
    time: SimTime,
    rng: ChaCha8Rng,
    next_net_id: u32,
    /// Output produced between ticks, handed out with the next tick.
    pending: TickOutput,
    damage_ledger: HashSet<(Entity, Entity)>,
    despawn_buffer: Vec<Entity>,

    // --- Authority ---
    observers: Vec<ObserverConnection>,

    // --- Client ---
    local_connection: Option<ConnectionId>,
    prediction: ConnectionPredictionContext,
    fakes: FakeRegistry,
    /// Net id → local entity. Entries outlive their entity as tombstones.
    net_index: HashMap<NetId, NetEntry>,
}

#[derive(Debug, Clone, Copy)]
struct NetEntry {
    entity: Entity,
    /// When the entity was first seen gone from the world.
    retired_at: Option<f64>,
}

impl NetEntry {
    fn live(entity: Entity) -> Self {
        Self {
            entity,
            retired_at: None,
        }
    }
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config.
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            time: SimTime::default(),
            next_net_id: 1,
            pending: TickOutput::default(),
            damage_ledger: HashSet::new(),
            despawn_buffer: Vec::new(),
            observers: Vec::new(),
            local_connection: None,
            prediction: ConnectionPredictionContext::default(),
            fakes: FakeRegistry::new(),
            net_index: HashMap::new(),
        }
    }

    /// Client engine bound to its own connection.
    pub fn new_client(config: SimConfig, local_connection: ConnectionId) -> Self {
        let mut engine = Self::new(SimConfig {
            role: NetRole::Client,
            ..config
        });
        engine.local_connection = Some(local_connection);
        engine
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self) -> TickOutput {
        let mut out = std::mem::take(&mut self.pending);
        out.tick = self.time.tick;
        self.damage_ledger.clear();

        self.run_systems(&mut out);
        self.time.advance();
        out
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn role(&self) -> NetRole {
        self.config.role
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for placing combatants and geometry.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Fire a projectile.
    ///
    /// On the authority this creates the canonical projectile and runs the
    /// replication gate. On a client it creates a fake for the local
    /// connection's own fire input; anything else has no fire privilege.
    pub fn spawn_projectile(&mut self, request: SpawnRequest) -> Result<Entity> {
        let result = match self.config.role {
            NetRole::Authority => self.spawn_authoritative(&request),
            NetRole::Client => self.spawn_fake(&request),
        };
        if let Err(err) = &result {
            warn!(error = %err, kind = ?request.kind, "Spawn rejected");
        }
        result
    }

    fn spawn_authoritative(&mut self, request: &SpawnRequest) -> Result<Entity> {
        let net_id = NetId(self.next_net_id);
        let now = self.time.elapsed_secs;
        let entity =
            systems::spawn::spawn_authoritative(&mut self.world, &mut self.rng, request, net_id, now)?;
        self.next_net_id += 1;
        self.net_index.insert(net_id, NetEntry::live(entity));
        info!(%net_id, ?entity, kind = ?request.kind, "Projectile spawned");

        systems::replication::forced_push(
            &mut self.world,
            &mut self.observers,
            entity,
            self.time.tick,
            &self.config,
            &mut self.pending,
        );
        Ok(entity)
    }

    fn spawn_fake(&mut self, request: &SpawnRequest) -> Result<Entity> {
        let local = match self.local_connection {
            Some(local) if request.connection == Some(local) => local,
            _ => {
                return Err(SpawnError::NoFirePrivilege {
                    role: self.config.role,
                    connection: request.connection,
                })
            }
        };
        let entity = systems::spawn::spawn_fake(&mut self.world, request, self.time.elapsed_secs)?;
        self.fakes.register(local, entity);
        debug!(?entity, kind = ?request.kind, connection = %local, "Fake projectile spawned");
        Ok(entity)
    }

    /// Register an observer connection (authority).
    pub fn add_observer(&mut self, observer: ObserverConnection) {
        self.observers.retain(|o| o.id != observer.id);
        self.observers.push(observer);
    }

    pub fn observer_mut(
        &mut self,
        connection: ConnectionId,
    ) -> std::result::Result<&mut ObserverConnection, NetError> {
        self.observers
            .iter_mut()
            .find(|o| o.id == connection)
            .ok_or(NetError::UnknownConnection(connection))
    }

    pub fn remove_observer(&mut self, connection: ConnectionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.id != connection);
        before != self.observers.len()
    }

    /// Update the local connection's prediction time (client).
    pub fn set_prediction_time(&mut self, secs: f64) {
        self.prediction.set(secs);
    }

    pub fn prediction_time(&self) -> f64 {
        self.prediction.prediction_time()
    }

    /// Apply an authoritative snapshot (client).
    ///
    /// Returns the local entity the snapshot was applied to, if any.
    pub fn apply_snapshot(&mut self, snapshot: &ProjectileSnapshot) -> Option<Entity> {
        if self.config.role != NetRole::Client {
            warn!(net_id = %snapshot.net_id, "Snapshot ignored on authority");
            return None;
        }
        let catch_up = self.prediction.catch_up_secs(self.config.max_prediction_time);
        let now = self.time.elapsed_secs;
        let mut out = std::mem::take(&mut self.pending);
        let mut ctx = SimContext {
            config: &self.config,
            tick: self.time.tick,
            now,
            out: &mut out,
            damage_ledger: &mut self.damage_ledger,
        };

        let result = match self.net_index.get(&snapshot.net_id).map(|entry| entry.entity) {
            Some(entity) if !self.world.contains(entity) => {
                debug!(net_id = %snapshot.net_id, "Snapshot for destroyed projectile ignored");
                None
            }
            Some(entity) => {
                update_existing(&mut self.world, &mut ctx, entity, snapshot, catch_up);
                Some(entity)
            }
            None => {
                let entity = spawn_from_snapshot(
                    &mut self.world,
                    &mut ctx,
                    &mut self.fakes,
                    self.local_connection,
                    snapshot,
                    catch_up,
                );
                self.net_index.insert(snapshot.net_id, NetEntry::live(entity));
                Some(entity)
            }
        };

        self.pending = out;
        result
    }

    /// Detonate a projectile where it is (shock combo, external trigger).
    pub fn detonate(&mut self, entity: Entity) {
        let Some(hit) = self.current_hit(entity) else {
            return;
        };
        self.with_context(|world, ctx| systems::hit::explode(world, ctx, entity, hit, None));
    }

    /// Destroy a projectile now. Its matched partner shuts down with it.
    ///
    /// On the authority the terminal snapshot goes out with the next tick.
    pub fn teardown(&mut self, entity: Entity) {
        self.with_context(|world, ctx| systems::lifecycle::shut_down(world, ctx, entity));
        self.push_terminal(entity);
        systems::lifecycle::destroy_now(&mut self.world, entity);
        self.fakes.forget(entity);
    }

    /// Tear down every projectile and forget all prediction state.
    pub fn reset(&mut self) {
        let projectiles: Vec<Entity> = self
            .world
            .query::<&Projectile>()
            .iter()
            .map(|(e, _)| e)
            .collect();
        for entity in &projectiles {
            self.with_context(|world, ctx| systems::lifecycle::shut_down(world, ctx, *entity));
        }
        for entity in &projectiles {
            self.push_terminal(*entity);
        }
        for entity in projectiles {
            systems::lifecycle::destroy_now(&mut self.world, entity);
        }
        self.fakes.clear();
        self.net_index.clear();
        info!("Projectile world reset");
    }

    /// Lifecycle phase of `entity`; `Destroyed` once it has left the world.
    pub fn lifecycle_phase(&self, entity: Entity) -> LifecyclePhase {
        systems::lifecycle::phase_of(&self.world, entity)
    }

    pub fn projectile(&self, entity: Entity) -> Option<Projectile> {
        self.world.get::<&Projectile>(entity).ok().map(|p| (*p).clone())
    }

    pub fn position(&self, entity: Entity) -> Option<DVec3> {
        self.world.get::<&Position>(entity).ok().map(|p| p.0)
    }

    pub fn velocity(&self, entity: Entity) -> Option<DVec3> {
        self.world.get::<&Velocity>(entity).ok().map(|v| v.0)
    }

    pub fn presence(&self, entity: Entity) -> Option<Presence> {
        self.world.get::<&Presence>(entity).ok().map(|p| *p)
    }

    pub fn partner(&self, entity: Entity) -> Option<Entity> {
        systems::lifecycle::partner_of(&self.world, entity)
    }

    /// Local entity for a network id (client), if still alive.
    pub fn entity_for(&self, net_id: NetId) -> Option<Entity> {
        self.net_index
            .get(&net_id)
            .map(|entry| entry.entity)
            .filter(|e| self.world.contains(*e))
    }

    /// Network ids still remembered, live or tombstoned.
    pub fn tracked_net_ids(&self) -> usize {
        self.net_index.len()
    }

    pub fn outstanding_fakes(&self) -> usize {
        self.fakes.len()
    }

    /// Snapshot of a networked projectile as the authority would send it.
    pub fn snapshot(&self, entity: Entity) -> Option<ProjectileSnapshot> {
        systems::replication::snapshot_of(&self.world, entity)
    }

    fn current_hit(&self, entity: Entity) -> Option<Hit> {
        let location = self.position(entity)?;
        let travel = self.velocity(entity).unwrap_or(DVec3::ZERO);
        let facing = self
            .world
            .get::<&Rotation>(entity)
            .map(|r| r.0 * DVec3::X)
            .unwrap_or(DVec3::X);
        Some(Hit {
            location,
            normal: -facing,
            travel,
        })
    }

    fn push_terminal(&mut self, entity: Entity) {
        if self.config.role == NetRole::Authority {
            systems::replication::push_terminal(
                &mut self.world,
                &mut self.observers,
                entity,
                self.time.tick,
                &mut self.pending,
            );
        }
    }

    /// Forget tombstones old enough that no snapshot for them is still in flight.
    fn prune_tombstones(&mut self) {
        let now = self.time.elapsed_secs;
        let retention = ProjectileKind::max_lifespan_secs() + self.config.max_prediction_time;
        let world = &self.world;
        self.net_index.retain(|_, entry| {
            if world.contains(entry.entity) {
                return true;
            }
            let retired_at = *entry.retired_at.get_or_insert(now);
            now - retired_at < retention
        });
    }

    /// Run a system call outside the tick, collecting its output for the next tick.
    fn with_context(&mut self, f: impl FnOnce(&mut World, &mut SimContext<'_>)) {
        let mut ctx = SimContext {
            config: &self.config,
            tick: self.time.tick,
            now: self.time.elapsed_secs,
            out: &mut self.pending,
            damage_ledger: &mut self.damage_ledger,
        };
        f(&mut self.world, &mut ctx);
    }

    /// Run all systems in order.
    fn run_systems(&mut self, out: &mut TickOutput) {
        let mut ctx = SimContext {
            config: &self.config,
            tick: self.time.tick,
            now: self.time.elapsed_secs + DT,
            out,
            damage_ledger: &mut self.damage_ledger,
        };

        // 1. Movement + hit pipeline
        systems::movement::run(&mut self.world, &mut ctx);
        // 2. Hidden halves follow their primaries
        systems::mirror::run(&mut self.world);
        // 3. Replication (authority), before anything finalized is despawned
        if self.config.role == NetRole::Authority {
            systems::replication::run(
                &mut self.world,
                &mut self.observers,
                self.time.tick,
                &self.config,
                ctx.out,
            );
        }
        // 4. Lifespan expiry + deferred destruction
        self.despawn_buffer.clear();
        systems::lifecycle::run_expiry(&mut self.world, &mut ctx, &mut self.despawn_buffer);
        // 5. Forget fakes that died unmatched, then stale tombstones
        for entity in self.despawn_buffer.drain(..) {
            self.fakes.forget(entity);
        }
        self.prune_tombstones();
    }
}

/// Sync an entity the client already knows about.
fn update_existing(
    world: &mut World,
    ctx: &mut SimContext<'_>,
    entity: Entity,
    snapshot: &ProjectileSnapshot,
    catch_up: f64,
) {
    let exploded_locally = world
        .get::<&Projectile>(entity)
        .map(|p| p.exploded)
        .unwrap_or(true);
    if exploded_locally {
        return;
    }

    overwrite_state(world, entity, snapshot);
    if snapshot.exploded {
        explode_at_snapshot(world, ctx, entity, snapshot);
        return;
    }
    if snapshot.finalized {
        debug!(net_id = %snapshot.net_id, ?entity, "Projectile torn down by authority");
        systems::lifecycle::shut_down(world, ctx, entity);
        return;
    }
    systems::forward::on_sync(world, ctx, entity, catch_up);
}

/// First sighting of a networked projectile on this client.
fn spawn_from_snapshot(
    world: &mut World,
    ctx: &mut SimContext<'_>,
    fakes: &mut FakeRegistry,
    local_connection: Option<ConnectionId>,
    snapshot: &ProjectileSnapshot,
    catch_up: f64,
) -> Entity {
    let entity = systems::spawn::spawn_replicated(world, snapshot, ctx.now, catch_up);
    debug!(net_id = %snapshot.net_id, ?entity, catch_up, "Replicated projectile spawned");

    if !snapshot.exploded && !snapshot.finalized {
        if let Some(event) = systems::forward::catch_up(world, ctx, entity, catch_up) {
            systems::hit::process_event(world, ctx, entity, event);
        }
    }

    if let Some(local) = local_connection.filter(|c| snapshot.owner_connection == Some(*c)) {
        systems::reconcile::reconcile(world, ctx, fakes, local, entity, catch_up);
    }

    // Ephemeral: already over by the time it reached us.
    if snapshot.exploded {
        explode_at_snapshot(world, ctx, entity, snapshot);
    } else {
        let expired = world
            .get::<&Projectile>(entity)
            .map(|p| p.expires_at <= ctx.now)
            .unwrap_or(false);
        if snapshot.finalized || expired {
            systems::lifecycle::shut_down(world, ctx, entity);
        }
    }

    if let Ok(mut proj) = world.get::<&mut Projectile>(entity) {
        proj.fully_spawned = true;
    }
    entity
}

fn overwrite_state(world: &mut World, entity: Entity, snapshot: &ProjectileSnapshot) {
    if let Ok(mut pos) = world.get::<&mut Position>(entity) {
        *pos = snapshot.state.position;
    }
    if let Ok(mut rot) = world.get::<&mut Rotation>(entity) {
        *rot = snapshot.state.rotation;
    }
    if let Ok(mut vel) = world.get::<&mut Velocity>(entity) {
        *vel = snapshot.state.velocity;
    }
}

fn explode_at_snapshot(
    world: &mut World,
    ctx: &mut SimContext<'_>,
    entity: Entity,
    snapshot: &ProjectileSnapshot,
) {
    let travel = snapshot.state.velocity.0;
    let hit = Hit {
        location: snapshot.state.position.0,
        normal: (-travel).try_normalize().unwrap_or(DVec3::Z),
        travel,
    };
    systems::hit::explode(world, ctx, entity, hit, None);
}
