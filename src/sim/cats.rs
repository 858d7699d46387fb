//! Cat behaviour
//!
//! Cats hunt the pigeon, flee from it in predator mode, or wander when
//! friendly mode is on. Ponds deflect them; a roosted pigeon draws one cat
//! up its tree.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{Cat, Climb, Facing, GameState};
use super::world::World;
use crate::TileCoord;
use crate::tuning::CatTuning;
use crate::unit_from_angle;

/// What the cats are doing this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatMode {
    Hunt,
    Flee,
    Wander,
}

impl CatMode {
    pub fn current(state: &GameState, now: f64) -> Self {
        if state.friendly_mode {
            CatMode::Wander
        } else if state.pigeon.predator_active(now) {
            CatMode::Flee
        } else {
            CatMode::Hunt
        }
    }
}

/// Steer and move every cat one tick
pub fn update_cats(state: &mut GameState, now: f64) {
    let mode = CatMode::current(state, now);
    let pigeon_pos = state.pigeon.pos;
    let roost = state.pigeon.roost();
    let climb_reach = state.tuning.world.tree_collision_radius;

    let GameState {
        cats,
        world,
        rng,
        tuning,
        ..
    } = state;

    for cat in cats.iter_mut() {
        if update_climb(cat, world, mode, roost, climb_reach, tuning.cats.climb_rate) {
            continue;
        }
        let speed = steer(cat, rng, mode, pigeon_pos, &tuning.cats);
        step(cat, world, speed);
    }
}

/// Advance or end a climb, or start one at the pigeon's tree.
/// Returns true when the cat spends this tick climbing.
fn update_climb(
    cat: &mut Cat,
    world: &mut World,
    mode: CatMode,
    roost: Option<TileCoord>,
    reach: f32,
    rate: f32,
) -> bool {
    if let Some(mut climb) = cat.climb {
        if mode == CatMode::Hunt && roost == Some(climb.tree) {
            climb.progress = (climb.progress + rate).min(1.0);
            cat.climb = Some(climb);
            return true;
        }
        world.release_tree(climb.tree, cat.id);
        cat.climb = None;
        log::debug!("Cat {} dropped off tree {:?}", cat.id, climb.tree);
        return false;
    }

    if mode != CatMode::Hunt {
        return false;
    }
    let Some(tile) = roost else {
        return false;
    };
    let Some(tree_pos) = world.tree(tile).map(|t| t.pos) else {
        return false;
    };

    if cat.pos.distance(tree_pos) < reach && world.claim_tree(tile, cat.id) {
        cat.climb = Some(Climb {
            tree: tile,
            progress: 0.0,
        });
        log::debug!("Cat {} started climbing tree {:?}", cat.id, tile);
        return true;
    }
    false
}

/// Pick a heading for this tick and return the speed to move at
fn steer(
    cat: &mut Cat,
    rng: &mut Pcg32,
    mode: CatMode,
    pigeon_pos: Vec2,
    tuning: &CatTuning,
) -> f32 {
    match mode {
        CatMode::Wander => {
            if cat.wander_ticks.is_none_or(|ticks| ticks <= 0.0) {
                cat.dir = unit_from_angle(rng.random::<f32>() * TAU);
                cat.facing = Facing::toward(cat.dir.x);
                cat.wander_ticks =
                    Some(tuning.wander_ticks_min + rng.random::<f32>() * tuning.wander_ticks_range);
            }
            if let Some(ticks) = cat.wander_ticks.as_mut() {
                *ticks -= 1.0;
            }
            cat.speed * tuning.wander_multiplier
        }
        CatMode::Hunt => {
            let to_pigeon = pigeon_pos - cat.pos;
            cat.dir = to_pigeon.normalize_or_zero();
            cat.facing = Facing::toward(to_pigeon.x);
            cat.speed
        }
        CatMode::Flee => {
            let to_pigeon = pigeon_pos - cat.pos;
            cat.dir = -to_pigeon.normalize_or_zero();
            cat.facing = if to_pigeon.x > 0.0 {
                Facing::Left
            } else {
                Facing::Right
            };
            cat.speed * tuning.flee_multiplier
        }
    }
}

/// Move along the heading, sidestepping ponds with a 90° turn
fn step(cat: &mut Cat, world: &mut World, speed: f32) {
    let next = cat.pos + cat.dir * speed;
    if world.is_in_pond(next).is_none() {
        cat.pos = next;
        return;
    }

    let detour = cat.pos + Vec2::new(cat.dir.y, -cat.dir.x) * speed;
    if world.is_in_pond(detour).is_none() {
        cat.pos = detour;
    }
}

/// Remove cats that wandered past the despawn radius; climbers stay
pub fn cleanup_cats(state: &mut GameState) {
    let pigeon_pos = state.pigeon.pos;
    let despawn = state.tuning.cats.despawn_radius;
    let before = state.cats.len();
    state
        .cats
        .retain(|cat| cat.is_climbing() || cat.pos.distance(pigeon_pos) < despawn);
    let removed = before - state.cats.len();
    if removed > 0 {
        log::trace!("Despawned {removed} distant cats");
    }
}

/// Free any tree a departing cat was holding
pub fn release_climb(world: &mut World, cat: &Cat) {
    if let Some(climb) = cat.climb {
        world.release_tree(climb.tree, cat.id);
    }
}
