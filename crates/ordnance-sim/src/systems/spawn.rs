//! Projectile spawning: authoritative, speculative (fake) and replicated instances.

use glam::DVec3;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use ordnance_core::components::{
    Combatant, Lifecycle, Presence, Projectile, Replication, SeekTarget,
};
use ordnance_core::error::{Result, SpawnError};
use ordnance_core::kinds::ProjectileKind;
use ordnance_core::net::ProjectileSnapshot;
use ordnance_core::types::{ConnectionId, NetId, Position, Rotation, TeamId, Velocity};

/// A request to fire one projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub origin: DVec3,
    /// Fire direction; normalized on validation.
    pub direction: DVec3,
    pub owner: Option<Entity>,
    pub kind: Option<ProjectileKind>,
    /// Connection that issued the fire input, if it came from a client.
    pub connection: Option<ConnectionId>,
    /// Lock-on target for homing kinds.
    pub seek_target: Option<Entity>,
}

impl SpawnRequest {
    pub fn new(kind: ProjectileKind, owner: Entity, origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction,
            owner: Some(owner),
            kind: Some(kind),
            connection: None,
            seek_target: None,
        }
    }

    pub fn from_connection(mut self, connection: ConnectionId) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn seeking(mut self, target: Entity) -> Self {
        self.seek_target = Some(target);
        self
    }
}

/// Validated spawn parameters.
struct Validated {
    owner: Entity,
    kind: ProjectileKind,
    direction: DVec3,
    team: TeamId,
}

fn validate(world: &World, request: &SpawnRequest) -> Result<Validated> {
    let owner = request.owner.ok_or(SpawnError::MissingOwner)?;
    let kind = request.kind.ok_or(SpawnError::MissingKind)?;
    let team = world
        .get::<&Combatant>(owner)
        .map(|c| c.team)
        .map_err(|_| SpawnError::OwnerNotFound)?;
    let direction = request
        .direction
        .try_normalize()
        .ok_or(SpawnError::InvalidDirection)?;
    if !request.origin.is_finite() {
        return Err(SpawnError::InvalidDirection);
    }
    Ok(Validated {
        owner,
        kind,
        direction,
        team,
    })
}

/// Spawn the canonical projectile on the authority.
///
/// Kinds with spread get a random deflection inside their cone.
pub fn spawn_authoritative(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    request: &SpawnRequest,
    net_id: NetId,
    now: f64,
) -> Result<Entity> {
    let valid = validate(world, request)?;
    let direction = apply_spread(rng, valid.direction, valid.kind.spread_radians());

    let entity = spawn_projectile(
        world,
        ProjectileInit {
            kind: valid.kind,
            net_id: Some(net_id),
            owner: Some(valid.owner),
            owner_connection: request.connection,
            team: Some(valid.team),
            position: request.origin,
            velocity: direction * valid.kind.movement_params().initial_speed,
            created_at: now,
            fake: false,
        },
    );
    let _ = world.insert_one(entity, Replication::default());
    if let Some(target) = request.seek_target {
        let _ = world.insert_one(entity, SeekTarget(target));
    }
    Ok(entity)
}

/// Spawn a client-local speculative projectile. No spread: the authority
/// decides the final direction.
pub fn spawn_fake(world: &mut World, request: &SpawnRequest, now: f64) -> Result<Entity> {
    let valid = validate(world, request)?;

    let entity = spawn_projectile(
        world,
        ProjectileInit {
            kind: valid.kind,
            net_id: None,
            owner: Some(valid.owner),
            owner_connection: request.connection,
            team: Some(valid.team),
            position: request.origin,
            velocity: valid.direction * valid.kind.movement_params().initial_speed,
            created_at: now,
            fake: true,
        },
    );
    if let Some(target) = request.seek_target {
        let _ = world.insert_one(entity, SeekTarget(target));
    }
    Ok(entity)
}

/// Spawn the local instance of a projectile first seen in a snapshot.
///
/// `catch_up` is the prediction time the caller will forward-predict by; the
/// lifespan is shortened by it.
pub fn spawn_replicated(
    world: &mut World,
    snapshot: &ProjectileSnapshot,
    now: f64,
    catch_up: f64,
) -> Entity {
    let created_at = now - catch_up;
    let entity = spawn_projectile(
        world,
        ProjectileInit {
            kind: snapshot.kind,
            net_id: Some(snapshot.net_id),
            owner: None,
            owner_connection: snapshot.owner_connection,
            team: snapshot.team,
            position: snapshot.state.position.0,
            velocity: snapshot.state.velocity.0,
            created_at,
            fake: false,
        },
    );
    if let Ok(mut rot) = world.get::<&mut Rotation>(entity) {
        *rot = snapshot.state.rotation;
    }
    if let Ok(mut proj) = world.get::<&mut Projectile>(entity) {
        proj.fully_spawned = false;
    }
    entity
}

struct ProjectileInit {
    kind: ProjectileKind,
    net_id: Option<NetId>,
    owner: Option<Entity>,
    owner_connection: Option<ConnectionId>,
    team: Option<TeamId>,
    position: DVec3,
    velocity: DVec3,
    created_at: f64,
    fake: bool,
}

fn spawn_projectile(world: &mut World, init: ProjectileInit) -> Entity {
    let params = init.kind.movement_params();
    world.spawn((
        Projectile {
            kind: init.kind,
            net_id: init.net_id,
            owner: init.owner,
            owner_connection: init.owner_connection,
            team: init.team,
            created_at: init.created_at,
            expires_at: init.created_at + params.lifespan_secs,
            damage: init.kind.damage_params(),
            fake: init.fake,
            exploded: false,
            detonated: false,
            finalized: false,
            fully_spawned: true,
            stats_credit: 0.0,
        },
        Position(init.position),
        Velocity(init.velocity),
        Rotation::facing(init.velocity),
        Lifecycle::default(),
        Presence::default(),
    ))
}

/// Deflect `direction` by a random angle up to `spread` radians.
pub fn apply_spread(rng: &mut ChaCha8Rng, direction: DVec3, spread: f64) -> DVec3 {
    if spread <= 0.0 {
        return direction;
    }
    let (u, v) = direction.any_orthonormal_pair();
    let deflection = rng.gen_range(0.0..spread);
    let around = rng.gen_range(0.0..std::f64::consts::TAU);
    let offset = (u * around.cos() + v * around.sin()) * deflection.sin();
    (direction * deflection.cos() + offset).normalize()
}
