//! Client-side prediction state: outstanding fakes and the connection's prediction time.

use std::collections::HashMap;

use hecs::Entity;

use ordnance_core::types::ConnectionId;

/// Prediction time of the local connection (roughly half the round trip).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConnectionPredictionContext {
    prediction_time: f64,
}

impl ConnectionPredictionContext {
    pub fn new(prediction_time: f64) -> Self {
        let mut ctx = Self::default();
        ctx.set(prediction_time);
        ctx
    }

    /// Update the prediction time. Non-finite values reset it to zero.
    pub fn set(&mut self, prediction_time: f64) {
        self.prediction_time = if prediction_time.is_finite() {
            prediction_time
        } else {
            0.0
        };
    }

    pub fn prediction_time(&self) -> f64 {
        self.prediction_time
    }

    /// Catch-up to apply to a freshly synchronized projectile, clamped to `[0, max]`.
    pub fn catch_up_secs(&self, max: f64) -> f64 {
        self.prediction_time.min(max).max(0.0)
    }
}

/// Fakes awaiting their authoritative counterpart, per owning connection.
///
/// Lists are short (a handful of shots in flight per player), so lookups are linear.
#[derive(Debug, Default)]
pub struct FakeRegistry {
    outstanding: HashMap<ConnectionId, Vec<Entity>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, connection: ConnectionId, fake: Entity) {
        self.outstanding.entry(connection).or_default().push(fake);
    }

    /// Outstanding fakes for `connection`, oldest first.
    pub fn outstanding(&self, connection: ConnectionId) -> &[Entity] {
        self.outstanding
            .get(&connection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Remove a matched fake. Returns false if it was not outstanding.
    pub fn take(&mut self, connection: ConnectionId, fake: Entity) -> bool {
        let Some(list) = self.outstanding.get_mut(&connection) else {
            return false;
        };
        let before = list.len();
        list.retain(|e| *e != fake);
        before != list.len()
    }

    /// Drop a fake from every list (it was destroyed unmatched).
    pub fn forget(&mut self, fake: Entity) {
        for list in self.outstanding.values_mut() {
            list.retain(|e| *e != fake);
        }
    }

    pub fn len(&self) -> usize {
        self.outstanding.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.outstanding.clear();
    }
}
