//! Forward prediction: catch a freshly synchronized projectile up to "now".
//!
//! Snapshots describe where the projectile was one prediction time ago from
//! this client's point of view. A single movement step of that length moves
//! it to where the authority believes it is now.

use hecs::{Entity, World};
use tracing::debug;

use super::hit;
use super::mirror;
use super::movement::{self, MovementEvent};
use super::SimContext;

/// Advance `entity` by `prediction_time` seconds in one step.
///
/// Non-positive prediction times leave the entity untouched. A collision
/// during the catch-up is returned for the hit pipeline.
pub fn catch_up(
    world: &mut World,
    ctx: &SimContext<'_>,
    entity: Entity,
    prediction_time: f64,
) -> Option<MovementEvent> {
    if prediction_time <= 0.0 {
        return None;
    }
    let step = movement::step(world, entity, prediction_time, ctx.role(), ctx.now)?;
    movement::apply_step(world, entity, &step);
    debug!(?entity, prediction_time, "Forward predicted projectile");
    step.event
}

/// Post-sync handling for an existing entity whose state was just overwritten.
///
/// The hidden half of a pair adopts its primary's state instead of predicting.
pub fn on_sync(world: &mut World, ctx: &mut SimContext<'_>, entity: Entity, prediction_time: f64) {
    if let Some(primary) = hit::live_primary(world, entity) {
        mirror::copy_state(world, primary, entity);
        return;
    }
    if let Some(event) = catch_up(world, ctx, entity, prediction_time) {
        hit::process_event(world, ctx, entity, event);
    }
    mirror::sync_hidden_partner(world, entity);
}
