//! Spawning policy
//!
//! Four independent timers compare against absolute timestamps. A timer that
//! fires is restamped even when the random placement gets rejected, so a bad
//! roll just skips one spawn.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::state::{GameState, PickupKind};
use crate::tuning::PlacementBand;
use crate::unit_from_angle;

/// Run all spawn timers for this tick
pub fn update_spawning(state: &mut GameState, now: f64) {
    let spawning = &state.tuning.spawning;
    let breadcrumb_interval = spawning.breadcrumb_interval_ms;
    let chest_interval = spawning.chest_interval_ms;
    let diamond_interval = spawning.diamond_interval_ms;
    let max_chests = spawning.max_chests;
    let max_diamonds = spawning.max_diamonds;
    let cat_interval = state.tuning.cat_spawn_interval_ms(state.score);

    if now - state.spawn_timers.breadcrumb > breadcrumb_interval {
        spawn_breadcrumb(state);
        state.spawn_timers.breadcrumb = now;
    }

    if now - state.spawn_timers.cat > cat_interval {
        spawn_cat(state);
        state.spawn_timers.cat = now;
    }

    if now - state.spawn_timers.chest > chest_interval && state.chests().count() < max_chests {
        spawn_chest(state);
        state.spawn_timers.chest = now;
    }

    if now - state.spawn_timers.diamond > diamond_interval
        && state.diamonds().count() < max_diamonds
    {
        spawn_diamond(state);
        state.spawn_timers.diamond = now;
    }
}

/// Random point in the band's ring around the pigeon
fn ring_position(state: &mut GameState, band: PlacementBand) -> Vec2 {
    let angle = state.rng.random::<f32>() * TAU;
    let dist = band.min_dist + state.rng.random::<f32>() * band.range;
    state.pigeon.pos + unit_from_angle(angle) * dist
}

/// Drop a breadcrumb near the pigeon unless it would sit under a tree
pub fn spawn_breadcrumb(state: &mut GameState) -> Option<u32> {
    let band = state.tuning.spawning.breadcrumb_band;
    let pos = ring_position(state, band);
    if state.world.nearest_tree(pos, band.tree_clearance).is_some() {
        log::trace!("Breadcrumb at {pos} rejected (tree)");
        return None;
    }
    Some(state.add_pickup(PickupKind::Breadcrumb, pos))
}

/// Place a cat on the spawn circle, heading for the pigeon
pub fn spawn_cat(state: &mut GameState) -> u32 {
    let angle = state.rng.random::<f32>() * TAU;
    let pos = state.pigeon.pos + unit_from_angle(angle) * state.tuning.cats.spawn_radius;
    let speed = state.tuning.cat_speed(state.score);
    let id = state.add_cat(pos, speed);
    log::debug!("Cat {id} spawned at {pos} (speed {speed:.2})");
    id
}

pub fn spawn_chest(state: &mut GameState) -> Option<u32> {
    let band = state.tuning.spawning.chest_band;
    spawn_powerup(state, PickupKind::Chest, band)
}

pub fn spawn_diamond(state: &mut GameState) -> Option<u32> {
    let band = state.tuning.spawning.diamond_band;
    spawn_powerup(state, PickupKind::Diamond, band)
}

/// Chests and diamonds avoid both trees and ponds
fn spawn_powerup(state: &mut GameState, kind: PickupKind, band: PlacementBand) -> Option<u32> {
    let pos = ring_position(state, band);
    if state.world.nearest_tree(pos, band.tree_clearance).is_some()
        || state.world.is_in_pond(pos).is_some()
    {
        log::trace!("{kind:?} at {pos} rejected");
        return None;
    }
    let id = state.add_pickup(kind, pos);
    log::debug!("{kind:?} {id} spawned at {pos}");
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Facing;
    use crate::tuning::Tuning;

    fn playing() -> GameState {
        let mut state = GameState::new(21, Tuning::default());
        state.start(0.0);
        state.pickups.clear();
        state
    }

    #[test]
    fn test_nothing_spawns_before_intervals() {
        let mut state = playing();
        update_spawning(&mut state, 2000.0);
        assert!(state.pickups.is_empty());
        assert!(state.cats.is_empty());
        assert_eq!(state.spawn_timers.breadcrumb, 0.0);
    }

    #[test]
    fn test_breadcrumb_timer_restamps_even_on_reject() {
        let mut state = playing();
        // Every spot in the ring has a tree within this clearance
        state.tuning.spawning.breadcrumb_band.tree_clearance = 2000.0;
        assert_eq!(spawn_breadcrumb(&mut state), None);

        update_spawning(&mut state, 2001.0);
        assert_eq!(state.breadcrumbs().count(), 0);
        assert_eq!(state.spawn_timers.breadcrumb, 2001.0);
        // Not yet due again
        update_spawning(&mut state, 4000.0);
        assert_eq!(state.spawn_timers.breadcrumb, 2001.0);
    }

    #[test]
    fn test_cat_interval_follows_score() {
        let mut state = playing();
        update_spawning(&mut state, 3000.0);
        assert!(state.cats.is_empty());
        update_spawning(&mut state, 3001.0);
        assert_eq!(state.cats.len(), 1);

        // At score 100 the interval bottoms out at 1500 ms
        state.score = 100;
        update_spawning(&mut state, 4502.0);
        assert_eq!(state.cats.len(), 2);
    }

    #[test]
    fn test_cat_spawns_on_circle_facing_pigeon() {
        let mut state = playing();
        state.pigeon.pos = Vec2::new(100.0, -50.0);
        state.score = 250;
        spawn_cat(&mut state);
        let cat = &state.cats[0];
        assert!((cat.pos.distance(state.pigeon.pos) - 400.0).abs() < 1e-2);
        let expected_dir = (state.pigeon.pos - cat.pos).normalize();
        assert!(cat.dir.distance(expected_dir) < 1e-5);
        assert_eq!(cat.facing, Facing::toward(cat.dir.x));
        assert!((cat.speed - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_chest_cap_holds_timer() {
        let mut state = playing();
        state.add_pickup(PickupKind::Chest, Vec2::new(1000.0, 0.0));
        state.add_pickup(PickupKind::Chest, Vec2::new(0.0, 1000.0));
        update_spawning(&mut state, 15_001.0);
        assert_eq!(state.chests().count(), 2);
        assert_eq!(state.spawn_timers.chest, 0.0);
        assert_eq!(state.spawn_timers.diamond, 0.0);
    }

    #[test]
    fn test_diamond_cap_is_one() {
        let mut state = playing();
        let mut now = 0.0;
        for _ in 0..20 {
            now += 25_001.0;
            state.spawn_timers.diamond = now - 25_001.0;
            update_spawning(&mut state, now);
        }
        assert!(state.diamonds().count() <= 1);
    }

    #[test]
    fn test_breadcrumbs_land_in_band_clear_of_trees() {
        let mut state = playing();
        for _ in 0..200 {
            spawn_breadcrumb(&mut state);
        }
        assert!(state.breadcrumbs().count() > 100);
        let crumbs: Vec<Vec2> = state.breadcrumbs().map(|p| p.pos).collect();
        for pos in crumbs {
            let dist = pos.length();
            assert!((99.99..350.01).contains(&dist), "dist {dist}");
            assert!(state.world.nearest_tree(pos, 30.0).is_none());
        }
    }

    #[test]
    fn test_powerups_avoid_ponds_and_trees() {
        let mut state = playing();
        for _ in 0..200 {
            spawn_chest(&mut state);
            spawn_diamond(&mut state);
        }
        let placed: Vec<(PickupKind, Vec2)> =
            state.pickups.iter().map(|p| (p.kind, p.pos)).collect();
        assert!(!placed.is_empty());
        for (kind, pos) in placed {
            assert!(state.world.is_in_pond(pos).is_none());
            assert!(state.world.nearest_tree(pos, 40.0).is_none());
            let dist = pos.length();
            match kind {
                PickupKind::Chest => assert!((149.99..350.01).contains(&dist)),
                PickupKind::Diamond => assert!((179.99..400.01).contains(&dist)),
                PickupKind::Breadcrumb => unreachable!(),
            }
        }
    }
}
