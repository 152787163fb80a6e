//! Per-tick refresh of cover and degradation caches, and under-fire expiry.

use hecs::{Entity, World};

use sentinel_core::components::{CoverCache, DegradationCache, UnderFire};
use sentinel_core::target::Target;

use crate::cover::CoverSystem;
use crate::degradation::degradation_factor;

pub fn run(world: &mut World, cover: &CoverSystem, now: f64) {
    for (_entity, (target, cover_cache, degradation)) in
        world.query_mut::<(&Target, &mut CoverCache, &mut DegradationCache)>()
    {
        cover_cache.in_cover = cover.in_cover(target.position);
        degradation.factor = degradation_factor(target.health_fraction());
    }

    let expired: Vec<Entity> = world
        .query::<&UnderFire>()
        .iter()
        .filter(|(_, u)| now >= u.until)
        .map(|(e, _)| e)
        .collect();
    for entity in expired {
        let _ = world.remove_one::<UnderFire>(entity);
    }
}
