//! In-process latency link between an authority and a client engine.

use std::collections::VecDeque;

use ordnance_core::constants::DT;
use ordnance_core::net::{Outbound, ProjectileSnapshot};
use ordnance_core::types::ConnectionId;

/// One-way delivery of snapshots to a single connection with a fixed delay.
#[derive(Debug, Clone)]
pub struct LatencyLink {
    connection: ConnectionId,
    delay_ticks: u64,
    in_flight: VecDeque<(u64, ProjectileSnapshot)>,
}

impl LatencyLink {
    pub fn new(connection: ConnectionId, delay_ticks: u64) -> Self {
        Self {
            connection,
            delay_ticks,
            in_flight: VecDeque::new(),
        }
    }

    /// One-way latency in seconds.
    pub fn one_way_secs(&self) -> f64 {
        self.delay_ticks as f64 * DT
    }

    /// Queue every outbound snapshot addressed to this link's connection.
    pub fn send(&mut self, sent_tick: u64, outbound: &[Outbound]) {
        for out in outbound.iter().filter(|o| o.connection == self.connection) {
            self.in_flight
                .push_back((sent_tick + self.delay_ticks, out.snapshot.clone()));
        }
    }

    /// Snapshots whose delay has elapsed by `tick`, in send order.
    pub fn deliver(&mut self, tick: u64) -> Vec<ProjectileSnapshot> {
        let mut ready = Vec::new();
        while self.in_flight.front().is_some_and(|(at, _)| *at <= tick) {
            if let Some((_, snapshot)) = self.in_flight.pop_front() {
                ready.push(snapshot);
            }
        }
        ready
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}
