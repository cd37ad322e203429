//! Core types and definitions for the ORDNANCE projectile netcode.
//!
//! This crate defines the vocabulary shared by the authoritative server
//! and by every client: components, the projectile kind catalogue,
//! network protocol types, events, configuration and constants.
//! It has no dependency on any runtime or transport.

pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod kinds;
pub mod net;
pub mod types;

#[cfg(test)]
mod tests;
