//! Collision resolution between the pigeon and everything else
//!
//! Order per tick: breadcrumbs, chests, diamonds, then cats. Pickups that
//! drift past the despawn radius are pruned without reward.

use glam::Vec2;

use super::cats::release_climb;
use super::state::{GameEvent, GameState, PickupKind};

/// Outcome of testing one pickup against the pigeon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contact {
    Collected,
    Kept,
    Pruned,
}

#[inline]
fn contact(pigeon: Vec2, item: Vec2, radius: f32, despawn: f32) -> Contact {
    let dist = pigeon.distance(item);
    if dist < radius {
        Contact::Collected
    } else if dist <= despawn {
        Contact::Kept
    } else {
        Contact::Pruned
    }
}

/// Resolve all collisions for this tick
pub fn check_collisions(state: &mut GameState, now: f64) {
    if state.pigeon.is_roosted() {
        return;
    }

    check_breadcrumb_collision(state);
    check_chest_collision(state, now);
    check_diamond_collision(state, now);
    check_cat_collision(state, now);
}

/// Collect pickups of one kind; returns the positions collected
fn collect(state: &mut GameState, kind: PickupKind, radius: f32) -> Vec<Vec2> {
    let pigeon = state.pigeon.pos;
    let despawn = state.tuning.cats.despawn_radius;
    let mut collected = Vec::new();

    state.pickups.retain(|pickup| {
        if pickup.kind != kind {
            return true;
        }
        match contact(pigeon, pickup.pos, radius, despawn) {
            Contact::Collected => {
                collected.push(pickup.pos);
                false
            }
            Contact::Kept => true,
            Contact::Pruned => false,
        }
    });
    collected
}

/// Breadcrumbs: points plus flight time
pub fn check_breadcrumb_collision(state: &mut GameState) {
    let radius = state.tuning.scoring.pickup_radius;
    for pos in collect(state, PickupKind::Breadcrumb, radius) {
        let pigeon = &state.tuning.pigeon;
        state.pigeon.fly_meter_ms =
            (state.pigeon.fly_meter_ms + pigeon.fly_time_per_bread_ms).min(pigeon.max_fly_time_ms);
        state.add_score(state.tuning.scoring.breadcrumb_points);
        state.events.push(GameEvent::BreadcrumbEaten { pos });
    }
}

/// Chests: points plus a speed boost
pub fn check_chest_collision(state: &mut GameState, now: f64) {
    let radius = state.tuning.scoring.powerup_radius;
    for pos in collect(state, PickupKind::Chest, radius) {
        state.pigeon.speed_boost_until = now + state.tuning.pigeon.powerup_duration_ms;
        state.add_score(state.tuning.scoring.chest_points);
        state.events.push(GameEvent::ChestOpened { pos });
        log::debug!("Chest opened, speed boost until {:.0}", state.pigeon.speed_boost_until);
    }
}

/// Diamonds: points plus predator mode
pub fn check_diamond_collision(state: &mut GameState, now: f64) {
    let radius = state.tuning.scoring.powerup_radius;
    for pos in collect(state, PickupKind::Diamond, radius) {
        state.pigeon.predator_until = now + state.tuning.pigeon.powerup_duration_ms;
        state.add_score(state.tuning.scoring.diamond_points);
        state.events.push(GameEvent::DiamondCollected { pos });
        log::debug!("Diamond collected, predator mode until {:.0}", state.pigeon.predator_until);
    }
}

/// Cats: eaten in predator mode, otherwise the session ends
pub fn check_cat_collision(state: &mut GameState, now: f64) {
    if state.pigeon.is_flying() || state.pigeon.is_roosted() || state.friendly_mode {
        return;
    }

    let pigeon = state.pigeon.pos;
    let radius = state.tuning.scoring.cat_collision_radius;
    let predator = state.pigeon.predator_active(now);

    let mut i = 0;
    while i < state.cats.len() {
        if state.cats[i].pos.distance(pigeon) >= radius {
            i += 1;
            continue;
        }

        if !predator {
            state.end();
            return;
        }

        let cat = state.cats.remove(i);
        release_climb(&mut state.world, &cat);
        state.cats_eaten += 1;
        state.add_score(state.tuning.scoring.cat_eat_points);
        state.events.push(GameEvent::CatEaten { pos: cat.pos });
        log::debug!("Cat {} eaten", cat.id);
    }
}
