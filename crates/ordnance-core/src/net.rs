//! Network protocol types exchanged between the authority and observers.
//!
//! Projectile snapshots are deliberately narrower than a generic transform
//! message: no angular velocity, no sleep state.

use serde::{Deserialize, Serialize};

use crate::kinds::ProjectileKind;
use crate::types::{ConnectionId, NetId, Position, Rotation, TeamId, Velocity};

/// Minimal movement state sent to non-owner observers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicationState {
    pub position: Position,
    pub rotation: Rotation,
    pub velocity: Velocity,
}

/// Authority → observer projectile update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub net_id: NetId,
    pub kind: ProjectileKind,
    pub state: ReplicationState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamId>,
    /// Connection whose fire request created the projectile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_connection: Option<ConnectionId>,
    /// The projectile detonated. Only the terminal push carries it.
    pub exploded: bool,
    /// Final update; nothing follows. Without `exploded` the projectile was
    /// torn down silently.
    #[serde(default)]
    pub finalized: bool,
}

/// A snapshot addressed to one observer connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outbound {
    pub connection: ConnectionId,
    pub snapshot: ProjectileSnapshot,
    /// Sent out of band by the replication gate rather than on ordinary cadence.
    pub forced: bool,
}
