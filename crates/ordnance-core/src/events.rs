//! Events emitted by the simulation each tick.
//!
//! The damage application, effect spawning and statistics services consume
//! these; the simulation never waits on them.

use glam::DVec3;
use hecs::Entity;
use serde::{Deserialize, Serialize};

use crate::enums::{DamageKind, EffectKind};
use crate::kinds::ProjectileKind;
use crate::net::Outbound;

/// One damage application against one combatant.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageEvent {
    /// The projectile dealing the damage.
    pub projectile: Entity,
    /// The combatant that fired it, if still known.
    pub instigator: Option<Entity>,
    pub victim: Entity,
    pub kind: DamageKind,
    pub amount: f64,
    pub momentum: DVec3,
    pub origin: DVec3,
    pub tick: u64,
}

/// Fire-and-forget cosmetic spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectEvent {
    pub effect: EffectKind,
    pub projectile: Entity,
    pub projectile_kind: ProjectileKind,
    pub location: DVec3,
    pub normal: DVec3,
}

/// Everything the simulation reports to its collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Damage(DamageEvent),
    Effect(EffectEvent),
    /// Damage credited to the owner for scoring statistics.
    StatsCredited {
        owner: Option<Entity>,
        kind: ProjectileKind,
        damage: f64,
    },
}

/// Output of one simulation tick (plus anything produced between ticks).
#[derive(Debug, Clone, Default)]
pub struct TickOutput {
    pub tick: u64,
    pub events: Vec<SimEvent>,
    pub outbound: Vec<Outbound>,
}

impl TickOutput {
    pub fn damage_events(&self) -> impl Iterator<Item = &DamageEvent> {
        self.events.iter().filter_map(|e| match e {
            SimEvent::Damage(d) => Some(d),
            _ => None,
        })
    }

    pub fn effect_events(&self) -> impl Iterator<Item = &EffectEvent> {
        self.events.iter().filter_map(|e| match e {
            SimEvent::Effect(fx) => Some(fx),
            _ => None,
        })
    }

    /// Count of effects of one category.
    pub fn effect_count(&self, effect: EffectKind) -> usize {
        self.effect_events().filter(|fx| fx.effect == effect).count()
    }

    /// Move everything from `other` into `self`.
    pub fn absorb(&mut self, other: TickOutput) {
        self.events.extend(other.events);
        self.outbound.extend(other.outbound);
    }
}

/// Serializable summary of a tick, used for logs and determinism checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSummary {
    pub tick: u64,
    pub damage_applied: f64,
    pub explosions: usize,
    pub snapshots_sent: usize,
}

impl From<&TickOutput> for TickSummary {
    fn from(out: &TickOutput) -> Self {
        Self {
            tick: out.tick,
            damage_applied: out.damage_events().map(|d| d.amount).sum(),
            explosions: out.effect_count(EffectKind::Explosion),
            snapshots_sent: out.outbound.len(),
        }
    }
}
