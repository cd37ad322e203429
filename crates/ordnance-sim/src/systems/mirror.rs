//! Keeps the hidden half of each matched pair on top of its primary.

use hecs::{Entity, World};

use ordnance_core::components::{Lifecycle, PairLink};
use ordnance_core::enums::LifecyclePhase;
use ordnance_core::types::{Position, Rotation, Velocity};

/// Copy primary state onto every active hidden half.
pub fn run(world: &mut World) {
    let hidden: Vec<(Entity, Entity)> = world
        .query::<(&PairLink, &Lifecycle)>()
        .iter()
        .filter(|(_, (link, life))| !link.primary && life.phase == LifecyclePhase::Active)
        .map(|(e, (link, _))| (e, link.partner))
        .collect();

    for (entity, primary) in hidden {
        copy_state(world, primary, entity);
    }
}

/// If `primary` leads a pair, bring its hidden partner up to date.
pub fn sync_hidden_partner(world: &mut World, primary: Entity) {
    let partner = world
        .get::<&PairLink>(primary)
        .ok()
        .filter(|link| link.primary)
        .map(|link| link.partner);
    if let Some(partner) = partner {
        copy_state(world, primary, partner);
    }
}

/// Copy position, velocity and rotation from `from` to `to`.
pub fn copy_state(world: &mut World, from: Entity, to: Entity) {
    let state = {
        let Ok(pos) = world.get::<&Position>(from) else {
            return;
        };
        let Ok(vel) = world.get::<&Velocity>(from) else {
            return;
        };
        let Ok(rot) = world.get::<&Rotation>(from) else {
            return;
        };
        (*pos, *vel, *rot)
    };
    if let Ok(mut pos) = world.get::<&mut Position>(to) {
        *pos = state.0;
    }
    if let Ok(mut vel) = world.get::<&mut Velocity>(to) {
        *vel = state.1;
    }
    if let Ok(mut rot) = world.get::<&mut Rotation>(to) {
        *rot = state.2;
    }
}
