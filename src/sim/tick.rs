//! Per-tick simulation driver
//!
//! Advances the session one step against an absolute timestamp supplied by
//! the caller's scheduler.

use glam::Vec2;

use super::cats::{cleanup_cats, update_cats};
use super::collision::check_collisions;
use super::pigeon::{activate, move_pigeon, update_flight, update_powerups};
use super::spawn::update_spawning;
use super::state::{GameEvent, GameState};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Absolute timestamp of this tick in milliseconds
    pub now_ms: f64,
    /// Held directional input (unit length or zero)
    pub intent: Vec2,
    /// New pointer/touch destination
    pub move_target: Option<Vec2>,
    /// Activate action (take off, land, roost, launch)
    pub activate: bool,
    /// Toggle friendly mode
    pub toggle_friendly: bool,
}

/// Build a movement intent from held directions
pub fn normalize_intent(up: bool, down: bool, left: bool, right: bool) -> Vec2 {
    let axis = |neg: bool, pos: bool| (pos as i32 - neg as i32) as f32;
    Vec2::new(axis(left, right), axis(up, down)).normalize_or_zero()
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    if !state.is_playing() {
        return;
    }
    let now = input.now_ms;

    if input.toggle_friendly {
        state.friendly_mode = !state.friendly_mode;
        state.events.push(GameEvent::FriendlyModeChanged {
            enabled: state.friendly_mode,
        });
        log::debug!("Friendly mode {}", if state.friendly_mode { "on" } else { "off" });
    }

    if input.activate {
        activate(state, now);
    }

    update_flight(state, now);
    update_powerups(state, now);

    if let Some(target) = input.move_target {
        state.move_target = Some(target);
    }
    move_pigeon(state, input.intent);

    update_cats(state, now);
    cleanup_cats(state);
    update_spawning(state, now);
    check_collisions(state, now);
}

/// Simple demo AI: chase breadcrumbs, flee cats, fly when cornered
pub fn autopilot(state: &GameState, now: f64) -> TickInput {
    let pigeon = state.pigeon.pos;
    let threat = state
        .cats
        .iter()
        .filter(|c| !c.is_climbing())
        .map(|c| (c.pos, c.pos.distance(pigeon)))
        .min_by(|a, b| a.1.total_cmp(&b.1));

    let mut input = TickInput {
        now_ms: now,
        ..Default::default()
    };

    if state.pigeon.is_roosted() {
        // Leave the tree once something climbs after us
        input.activate = state.cats.iter().any(|c| c.is_climbing());
        return input;
    }

    match threat {
        Some((cat_pos, dist)) if dist < 120.0 && !state.pigeon.predator_active(now) => {
            input.intent = (pigeon - cat_pos).normalize_or_zero();
            input.activate = !state.pigeon.is_flying() && state.pigeon.fly_meter_ms > 0.0;
            return input;
        }
        _ => {}
    }

    if let Some(crumb) = state
        .breadcrumbs()
        .min_by(|a, b| a.pos.distance(pigeon).total_cmp(&b.pos.distance(pigeon)))
    {
        input.intent = (crumb.pos - pigeon).normalize_or_zero();
    }
    input
}
