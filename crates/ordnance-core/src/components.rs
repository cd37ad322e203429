//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components.

use glam::DVec3;
use hecs::Entity;
use serde::{Deserialize, Serialize};

use crate::enums::{ColliderShape, LifecyclePhase};
use crate::kinds::{DamageParams, ProjectileKind};
use crate::types::{ConnectionId, NetId, TeamId};

/// Projectile state shared by authoritative, replicated and fake instances.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub kind: ProjectileKind,
    /// Network identity. `None` for client-local fakes.
    pub net_id: Option<NetId>,
    /// Firing combatant. Weak: the owner may be gone while the projectile flies.
    pub owner: Option<Entity>,
    /// Connection that fired this projectile, if a client did.
    pub owner_connection: Option<ConnectionId>,
    pub team: Option<TeamId>,
    /// Simulation time at creation (seconds).
    pub created_at: f64,
    /// Simulation time at which the lifespan ends.
    pub expires_at: f64,
    pub damage: DamageParams,
    /// Client-local speculative instance. Never applies damage.
    pub fake: bool,
    /// Once set, no further hit processing runs against this projectile.
    pub exploded: bool,
    /// An explosion actually played (as opposed to a silent forced teardown).
    pub detonated: bool,
    /// Position is final; no further authoritative movement will be sent.
    pub finalized: bool,
    /// Initial synchronization (catch-up, matching) has completed.
    pub fully_spawned: bool,
    /// Damage dealt so far, credited to the owner when the projectile shuts down.
    pub stats_credit: f64,
}

/// Lifecycle state and the deferred destruction timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lifecycle {
    pub phase: LifecyclePhase,
    /// Simulation time at which the entity is despawned (set on shutdown).
    pub destroy_at: Option<f64>,
}

/// Visibility and simulation switches.
#[derive(Debug, Clone, Copy)]
pub struct Presence {
    pub visible: bool,
    pub collision_enabled: bool,
    pub movement_enabled: bool,
}

impl Default for Presence {
    fn default() -> Self {
        Self {
            visible: true,
            collision_enabled: true,
            movement_enabled: true,
        }
    }
}

/// Non-owning relation between a fake and its authoritative counterpart.
/// Both halves carry one, pointing at each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairLink {
    pub partner: Entity,
    /// This half is the visible, colliding instance.
    pub primary: bool,
}

/// Target a homing projectile steers toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekTarget(pub Entity);

/// Authority-side replication bookkeeping for one projectile.
#[derive(Debug, Clone, Copy, Default)]
pub struct Replication {
    pub last_sent_tick: Option<u64>,
    /// Re-send at the end of the current tick (the spawn push carried pre-movement state).
    pub resend_end_of_tick: bool,
    /// The finalizing snapshot went out; nothing more is sent.
    pub terminal_sent: bool,
}

/// A damageable participant (player pawn, bot).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub team: TeamId,
    pub radius: f64,
    pub health: f64,
    pub max_health: f64,
    /// Dead / ragdolled. Still hittable for knockback.
    pub terminal: bool,
}

/// Static world collider (geometry, trigger volume, shield).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Collider {
    pub shape: ColliderShape,
    /// Non-blocking colliders are volumes: overlapped, never stopped on.
    pub blocking: bool,
}

/// Team-owned shield surface attached to a collider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TeamShield {
    pub team: TeamId,
    /// Whether the shield also stops its own team's projectiles.
    pub blocks_team_projectiles: bool,
}

/// Accumulated knockback on a combatant (for the movement collaborator to consume).
#[derive(Debug, Clone, Copy, Default)]
pub struct Knockback(pub DVec3);
