//! Error types for ordnance.
//!
//! Only spawn validation surfaces to callers. Channel failures are logged
//! by the replication gate and replication falls back to ordinary cadence.

use thiserror::Error;

use crate::enums::NetRole;
use crate::types::ConnectionId;

/// Synchronous rejection of a spawn request. No entity is created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpawnError {
    /// Request has no owning combatant.
    #[error("Spawn request has no owner")]
    MissingOwner,

    /// Request has no projectile kind.
    #[error("Spawn request has no projectile kind")]
    MissingKind,

    /// Owner entity is not a live combatant on this node.
    #[error("Spawn owner is not a live combatant")]
    OwnerNotFound,

    /// Fire direction is zero or not finite.
    #[error("Spawn direction must be a finite non-zero vector")]
    InvalidDirection,

    /// This node may not create projectiles for the requesting connection.
    #[error("Node with role {role:?} has no fire privilege for {connection:?}")]
    NoFirePrivilege {
        role: NetRole,
        connection: Option<ConnectionId>,
    },
}

/// Replication channel errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetError {
    /// The channel to an observer could not be opened.
    #[error("Replication channel to {0} unavailable")]
    ChannelUnavailable(ConnectionId),

    /// The connection is not registered as an observer.
    #[error("Unknown observer connection {0}")]
    UnknownConnection(ConnectionId),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type for spawn operations.
pub type Result<T, E = SpawnError> = std::result::Result<T, E>;
