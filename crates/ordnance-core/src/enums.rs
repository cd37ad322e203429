//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Which side of the network this node simulates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetRole {
    /// Server: owns the canonical projectiles and applies damage.
    #[default]
    Authority,
    /// Client: receives snapshots and spawns speculative projectiles on local fire.
    Client,
}

/// Which half of a matched fake/authoritative pair stays visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FakePolicy {
    /// The fake snaps to the authoritative entity and hides; the authoritative one is primary.
    #[default]
    MoveFakeToAuthoritative,
    /// The authoritative entity adopts the fake's state and hides; the fake is primary
    /// and the authoritative half mirrors it.
    MoveAuthoritativeToFake,
}

/// Projectile lifecycle. `Destroyed` is reported for entities no longer in the world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LifecyclePhase {
    #[default]
    Active,
    /// Explosion in progress (transient within a single call).
    Exploding,
    /// Collision and movement off, waiting for effects to finish.
    ShuttingDown,
    Destroyed,
}

/// Shape of a static collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Sphere centred on the entity's position.
    Sphere { radius: f64 },
    /// Infinite plane through the entity's position; the normal points to open space.
    Plane { normal: glam::DVec3 },
}

/// How a radial or point damage event was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageKind {
    Point,
    Radial,
}

/// Cosmetic effect categories handed to the effect spawning service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Explosion,
    Bounce,
    /// Stop a looping effect (trail) that would not finish on its own.
    StopLoop,
}

/// State of a replication channel to one observer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelState {
    #[default]
    Closed,
    Open,
}
