//! Projectile simulation and client/server reconciliation for ORDNANCE.
//!
//! Owns the hecs ECS world, runs projectile systems at a fixed tick rate,
//! and exchanges snapshots between an authority and its clients.

pub mod engine;
pub mod link;
pub mod observer;
pub mod prediction;
pub mod systems;
pub mod world_setup;

pub use ordnance_core as core;
pub use engine::SimulationEngine;
pub use link::LatencyLink;
pub use observer::ObserverConnection;
pub use systems::spawn::SpawnRequest;
