//! Authority-side view of a connected observer.

use glam::DVec3;

use ordnance_core::enums::ChannelState;
use ordnance_core::error::NetError;
use ordnance_core::types::ConnectionId;

/// A client connection receiving projectile snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverConnection {
    pub id: ConnectionId,
    /// Where the observer's view is, for relevancy.
    pub view_origin: DVec3,
    /// Finished loading the level; nothing is pushed before that.
    pub fully_loaded: bool,
    pub channel: ChannelState,
    /// Whether the transport can currently open a new channel (saturation off).
    pub channel_available: bool,
}

impl ObserverConnection {
    pub fn new(id: ConnectionId, view_origin: DVec3) -> Self {
        Self {
            id,
            view_origin,
            fully_loaded: true,
            channel: ChannelState::Closed,
            channel_available: true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.channel == ChannelState::Open
    }

    /// Open the replication channel if it is not open yet.
    pub fn try_open_channel(&mut self) -> Result<(), NetError> {
        if self.is_open() {
            return Ok(());
        }
        if !self.channel_available {
            return Err(NetError::ChannelUnavailable(self.id));
        }
        self.channel = ChannelState::Open;
        Ok(())
    }

    pub fn close_channel(&mut self) {
        self.channel = ChannelState::Closed;
    }

    pub fn is_relevant(&self, position: DVec3, radius: f64) -> bool {
        self.view_origin.distance(position) <= radius
    }
}
