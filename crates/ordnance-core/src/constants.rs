//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Gravitational acceleration along -z (units/s²).
pub const GRAVITY_Z: f64 = -980.0;

// --- Collision ---

/// Distance a projectile is pushed off a surface after a bounce or stop.
pub const SURFACE_PUSH_OUT: f64 = 0.1;

/// Tolerance for treating a point as lying on a surface.
pub const FLUSH_EPSILON: f64 = 1e-3;

/// Default combatant collision radius.
pub const COMBATANT_RADIUS: f64 = 42.0;

/// Default combatant health.
pub const COMBATANT_HEALTH: f64 = 100.0;

// --- Damage ---

/// Momentum applied to a terminal (ragdolled) target when the projectile has none,
/// so overkill hits still produce visible knockback.
pub const OVERKILL_MOMENTUM: f64 = 20_000.0;

/// Offset of the alternate explosion probe origins along the hit normal and
/// against the direction of travel.
pub const EXPLOSION_PROBE_STEP: f64 = 12.0;

// --- Lifecycle ---

/// Deferred destruction window on nodes that render effects (seconds).
pub const VISUAL_SHUTDOWN_GRACE_SECS: f64 = 1.0;

/// Deferred destruction window on headless nodes (seconds).
pub const HEADLESS_SHUTDOWN_GRACE_SECS: f64 = 0.2;

// --- Reconciliation ---

/// Minimum dot product between normalized velocities for a fake to be a match candidate.
pub const MATCH_DOT_THRESHOLD: f64 = 0.95;

/// Fakes whose distances to the authoritative projectile differ by less than
/// this are tied; the one further behind wins.
pub const MATCH_TIE_DISTANCE: f64 = 2.0;

/// Upper bound on the catch-up applied by forward prediction (seconds).
pub const MAX_PREDICTION_TIME: f64 = 0.25;

// --- Replication ---

/// Ordinary replication cadence (ticks between updates). 10 Hz at 60 Hz ticks.
pub const NET_UPDATE_INTERVAL_TICKS: u64 = 6;

/// Projectiles faster than this are pushed out of band right after spawn.
pub const FORCED_PUSH_SPEED_THRESHOLD: f64 = 5_000.0;

/// Observers farther than this from a projectile do not get forced pushes.
pub const RELEVANCY_RADIUS: f64 = 15_000.0;
