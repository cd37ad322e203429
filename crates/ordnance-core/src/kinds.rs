//! Projectile kind catalogue.
//!
//! Every projectile is one of a closed set of kinds. Kind-specific behaviour
//! (gravity, bouncing, homing, spread, owner grace periods) is expressed as
//! pure parameter functions over the variant instead of per-kind code paths.

use serde::{Deserialize, Serialize};

use crate::constants::{EXPLOSION_PROBE_STEP, FORCED_PUSH_SPEED_THRESHOLD};

/// Damage/visual profile of a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Fast straight-flying rocket with a blast radius.
    Rocket,
    /// Bouncing grenade on a fuse.
    Grenade,
    /// Slow energy ball that other shootable projectiles can detonate.
    ShockBall,
    /// Gravity-affected shard fired with spread; point damage only.
    FlakShard,
    /// Very fast plasma bolt; point damage only.
    LinkBolt,
    /// Rocket that homes on a locked target.
    SeekingRocket,
}

/// Integration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementParams {
    /// Launch speed along the fire direction.
    pub initial_speed: f64,
    /// Speed cap applied after homing acceleration (0 = none).
    pub max_speed: f64,
    /// Multiplier on world gravity (0 = straight flight).
    pub gravity_scale: f64,
    /// Bounce response, `None` for projectiles that stop on the first blocking hit.
    pub bounce: Option<BounceParams>,
    /// Homing acceleration toward the seek target (0 = no homing).
    pub homing_acceleration: f64,
    /// Radius of the projectile's collision sphere.
    pub collision_radius: f64,
    /// Seconds before the projectile expires.
    pub lifespan_secs: f64,
}

/// Bounce response against blocking geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BounceParams {
    /// Fraction of the normal velocity kept after the bounce.
    pub restitution: f64,
    /// Fraction of the tangential velocity removed by the bounce.
    pub friction: f64,
    /// Below this speed after a bounce the projectile comes to rest.
    pub stop_speed: f64,
}

/// Damage parameters. An `outer_radius` of zero means point damage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageParams {
    pub base_damage: f64,
    /// Damage at the outer edge of the blast.
    pub minimum_damage: f64,
    /// Full damage is applied inside this radius.
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Exponent on the falloff between the inner and outer radius.
    pub falloff: f64,
    /// Knockback impulse magnitude.
    pub momentum: f64,
}

/// Explosion parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplosionParams {
    /// Explode (rather than silently shut down) when the lifespan ends.
    pub explode_on_expiry: bool,
    /// Offset used for the alternate hurt-radius probe origins.
    pub probe_step: f64,
    /// Whether the projectile carries a looping trail effect.
    pub has_trail: bool,
}

impl ProjectileKind {
    /// All kinds, in declaration order.
    pub const ALL: [ProjectileKind; 6] = [
        ProjectileKind::Rocket,
        ProjectileKind::Grenade,
        ProjectileKind::ShockBall,
        ProjectileKind::FlakShard,
        ProjectileKind::LinkBolt,
        ProjectileKind::SeekingRocket,
    ];

    /// Longest lifespan of any kind.
    pub fn max_lifespan_secs() -> f64 {
        Self::ALL
            .iter()
            .map(|kind| kind.movement_params().lifespan_secs)
            .fold(0.0, f64::max)
    }

    pub fn movement_params(self) -> MovementParams {
        match self {
            ProjectileKind::Rocket => MovementParams {
                initial_speed: 2700.0,
                max_speed: 0.0,
                gravity_scale: 0.0,
                bounce: None,
                homing_acceleration: 0.0,
                collision_radius: 8.0,
                lifespan_secs: 10.0,
            },
            ProjectileKind::Grenade => MovementParams {
                initial_speed: 1500.0,
                max_speed: 0.0,
                gravity_scale: 1.0,
                bounce: Some(BounceParams {
                    restitution: 0.5,
                    friction: 0.2,
                    stop_speed: 120.0,
                }),
                homing_acceleration: 0.0,
                collision_radius: 10.0,
                lifespan_secs: 2.5,
            },
            ProjectileKind::ShockBall => MovementParams {
                initial_speed: 1100.0,
                max_speed: 0.0,
                gravity_scale: 0.0,
                bounce: None,
                homing_acceleration: 0.0,
                collision_radius: 14.0,
                lifespan_secs: 8.0,
            },
            ProjectileKind::FlakShard => MovementParams {
                initial_speed: 3200.0,
                max_speed: 0.0,
                gravity_scale: 0.3,
                bounce: None,
                homing_acceleration: 0.0,
                collision_radius: 4.0,
                lifespan_secs: 2.0,
            },
            ProjectileKind::LinkBolt => MovementParams {
                initial_speed: 7000.0,
                max_speed: 0.0,
                gravity_scale: 0.0,
                bounce: None,
                homing_acceleration: 0.0,
                collision_radius: 6.0,
                lifespan_secs: 3.0,
            },
            ProjectileKind::SeekingRocket => MovementParams {
                initial_speed: 2000.0,
                max_speed: 2400.0,
                gravity_scale: 0.0,
                bounce: None,
                homing_acceleration: 8000.0,
                collision_radius: 8.0,
                lifespan_secs: 10.0,
            },
        }
    }

    pub fn damage_params(self) -> DamageParams {
        match self {
            ProjectileKind::Rocket | ProjectileKind::SeekingRocket => DamageParams {
                base_damage: 100.0,
                minimum_damage: 20.0,
                inner_radius: 15.0,
                outer_radius: 360.0,
                falloff: 1.0,
                momentum: 140_000.0,
            },
            ProjectileKind::Grenade => DamageParams {
                base_damage: 100.0,
                minimum_damage: 20.0,
                inner_radius: 15.0,
                outer_radius: 350.0,
                falloff: 1.0,
                momentum: 90_000.0,
            },
            ProjectileKind::ShockBall => DamageParams {
                base_damage: 55.0,
                minimum_damage: 5.0,
                inner_radius: 20.0,
                outer_radius: 120.0,
                falloff: 1.0,
                momentum: 70_000.0,
            },
            ProjectileKind::FlakShard => DamageParams {
                base_damage: 16.0,
                minimum_damage: 0.0,
                inner_radius: 0.0,
                outer_radius: 0.0,
                falloff: 1.0,
                momentum: 25_000.0,
            },
            ProjectileKind::LinkBolt => DamageParams {
                base_damage: 21.0,
                minimum_damage: 0.0,
                inner_radius: 0.0,
                outer_radius: 0.0,
                falloff: 1.0,
                momentum: 0.0,
            },
        }
    }

    pub fn explosion_params(self) -> ExplosionParams {
        ExplosionParams {
            explode_on_expiry: matches!(self, ProjectileKind::Grenade),
            probe_step: EXPLOSION_PROBE_STEP,
            has_trail: matches!(
                self,
                ProjectileKind::Rocket
                    | ProjectileKind::Grenade
                    | ProjectileKind::ShockBall
                    | ProjectileKind::SeekingRocket
            ),
        }
    }

    /// Whether other projectiles may collide with (and detonate) this one.
    pub fn is_shootable(self) -> bool {
        matches!(self, ProjectileKind::ShockBall)
    }

    /// Seconds after launch during which the projectile cannot hit its own owner.
    /// `None` means it never can.
    pub fn owner_grace_secs(self) -> Option<f64> {
        match self {
            ProjectileKind::Grenade => Some(0.2),
            _ => None,
        }
    }

    /// Half-angle of the random launch cone applied on the authority (radians).
    pub fn spread_radians(self) -> f64 {
        match self {
            ProjectileKind::FlakShard => 0.06,
            _ => 0.0,
        }
    }

    pub fn is_gravity_affected(self) -> bool {
        self.movement_params().gravity_scale != 0.0
    }

    /// High-priority kinds are pushed to observers immediately after spawn:
    /// a fast or blast-radius projectile may finish before ordinary replication
    /// would have shown it.
    pub fn needs_forced_push(self) -> bool {
        self.movement_params().initial_speed > FORCED_PUSH_SPEED_THRESHOLD
            || self.damage_params().outer_radius > 0.0
    }
}

impl DamageParams {
    /// Damage at `distance` from the blast origin, or 0 outside the outer radius.
    pub fn radial_damage_at(&self, distance: f64) -> f64 {
        if self.outer_radius <= 0.0 || distance > self.outer_radius {
            return 0.0;
        }
        if distance <= self.inner_radius {
            return self.base_damage;
        }
        let span = (self.outer_radius - self.inner_radius).max(f64::EPSILON);
        let t = ((distance - self.inner_radius) / span).clamp(0.0, 1.0);
        let scale = (1.0 - t).powf(self.falloff.max(0.0));
        self.minimum_damage + (self.base_damage - self.minimum_damage) * scale
    }
}
