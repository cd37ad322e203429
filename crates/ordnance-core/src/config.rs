//! Simulation configuration.
//!
//! Every field has a default so partial TOML files are valid:
//!
//! ```toml
//! role = "Client"
//! headless = false
//! fake_policy = "MoveAuthoritativeToFake"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::{FakePolicy, NetRole};
use crate::error::ConfigError;

/// Configuration for one simulation node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub role: NetRole,
    /// No effects are rendered on this node (dedicated server, bots).
    pub headless: bool,
    /// Same-team projectiles damage teammates.
    pub friendly_fire: bool,
    /// Which half of a matched pair stays visible (client only).
    pub fake_policy: FakePolicy,
    /// Ticks between ordinary replication updates (authority only).
    pub net_update_interval_ticks: u64,
    /// Observers beyond this distance get no forced push.
    pub relevancy_radius: f64,
    /// Clamp on the catch-up applied by forward prediction.
    pub max_prediction_time: f64,
    /// Velocity-direction agreement needed to match a fake.
    pub match_dot_threshold: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            role: NetRole::Authority,
            headless: true,
            friendly_fire: false,
            fake_policy: FakePolicy::default(),
            net_update_interval_ticks: NET_UPDATE_INTERVAL_TICKS,
            relevancy_radius: RELEVANCY_RADIUS,
            max_prediction_time: MAX_PREDICTION_TIME,
            match_dot_threshold: MATCH_DOT_THRESHOLD,
        }
    }
}

impl SimConfig {
    /// Default configuration for a rendering client.
    pub fn client() -> Self {
        Self {
            role: NetRole::Client,
            headless: false,
            ..Default::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.net_update_interval_ticks == 0 {
            return Err(ConfigError::Invalid {
                field: "net_update_interval_ticks",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.relevancy_radius.is_finite() && self.relevancy_radius > 0.0) {
            return Err(ConfigError::Invalid {
                field: "relevancy_radius",
                reason: format!("must be positive, got {}", self.relevancy_radius),
            });
        }
        if !(self.max_prediction_time.is_finite() && self.max_prediction_time >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "max_prediction_time",
                reason: format!("must be non-negative, got {}", self.max_prediction_time),
            });
        }
        if !(-1.0..=1.0).contains(&self.match_dot_threshold) {
            return Err(ConfigError::Invalid {
                field: "match_dot_threshold",
                reason: format!("must lie in [-1, 1], got {}", self.match_dot_threshold),
            });
        }
        Ok(())
    }

    /// Deferred destruction window after shutdown on this node.
    pub fn shutdown_grace_secs(&self) -> f64 {
        if self.headless {
            HEADLESS_SHUTDOWN_GRACE_SECS
        } else {
            VISUAL_SHUTDOWN_GRACE_SECS
        }
    }
}
