//! Systems that operate on the simulation world.
//!
//! Systems are free functions over `&mut World` plus a `SimContext` carrying
//! the tick's clock, configuration and output sink. They do not own state;
//! all per-entity state lives in components.

use std::collections::HashSet;

use hecs::Entity;

use ordnance_core::config::SimConfig;
use ordnance_core::enums::NetRole;
use ordnance_core::events::{SimEvent, TickOutput};

pub mod forward;
pub mod hit;
pub mod lifecycle;
pub mod mirror;
pub mod movement;
pub mod reconcile;
pub mod replication;
pub mod spawn;

/// Per-call context shared by the systems.
pub struct SimContext<'a> {
    pub config: &'a SimConfig,
    pub tick: u64,
    /// Simulation time in seconds.
    pub now: f64,
    pub out: &'a mut TickOutput,
    /// (projectile, victim) pairs already damaged this tick.
    pub damage_ledger: &'a mut HashSet<(Entity, Entity)>,
}

impl SimContext<'_> {
    pub fn role(&self) -> NetRole {
        self.config.role
    }

    pub fn emit(&mut self, event: SimEvent) {
        self.out.events.push(event);
    }
}
