//! Pigeon state machine and movement
//!
//! A single "activate" action drives Grounded/Flying/Roosted transitions;
//! the fly meter drains against absolute timestamps so pausing the
//! scheduler never costs flight time.

use glam::Vec2;

use super::state::{FlightState, GameEvent, GameState};

/// Handle the activate action (space / fly button)
pub fn activate(state: &mut GameState, now: f64) {
    if !state.is_playing() {
        return;
    }

    let tuning = &state.tuning.pigeon;
    let pigeon = &mut state.pigeon;

    if pigeon
        .last_activation
        .is_some_and(|t| now - t < tuning.activate_cooldown_ms)
    {
        return;
    }

    match pigeon.flight {
        FlightState::Flying { .. } => {
            // Manual landing; drained time is not refunded
            pigeon.flight = FlightState::Grounded;
            pigeon.last_activation = Some(now);
            state.events.push(GameEvent::Landed);
            log::debug!("Landed manually ({:.0} ms left)", pigeon.fly_meter_ms);
        }

        FlightState::Roosted { tree } => {
            let tree_pos = state
                .world
                .tree(tree)
                .map(|t| t.pos)
                .unwrap_or(pigeon.pos);
            pigeon.pos = Vec2::new(
                tree_pos.x + tuning.roost_launch_offset * pigeon.facing.sign(),
                tree_pos.y,
            );
            pigeon.flight = FlightState::Flying { drained_at: now };
            pigeon.last_activation = Some(now);
            state.events.push(GameEvent::TookOff);
            log::debug!("Launched off tree {:?}", tree);
        }

        FlightState::Grounded => {
            let reach = tuning.roost_reach;
            if let Some(tree) = state.world.nearest_tree(pigeon.pos, reach) {
                pigeon.pos = tree.pos;
                pigeon.flight = FlightState::Roosted { tree: tree.tile };
                pigeon.last_activation = Some(now);
                state.move_target = None;
                state.events.push(GameEvent::Roosted { tree: tree.tile });
                log::debug!("Roosted on tree {:?}", tree.tile);
            } else if pigeon.fly_meter_ms > 0.0 {
                pigeon.flight = FlightState::Flying { drained_at: now };
                pigeon.last_activation = Some(now);
                state.events.push(GameEvent::TookOff);
                log::debug!("Took off with {:.0} ms of flight", pigeon.fly_meter_ms);
            }
        }
    }
}

/// Drain the fly meter and land automatically when it runs out
pub fn update_flight(state: &mut GameState, now: f64) {
    let pigeon = &mut state.pigeon;
    let FlightState::Flying { drained_at } = pigeon.flight else {
        return;
    };

    let remaining = pigeon.fly_meter_ms - (now - drained_at);
    if remaining <= 0.0 {
        pigeon.fly_meter_ms = 0.0;
        pigeon.flight = FlightState::Grounded;
        state.events.push(GameEvent::Landed);
        log::debug!("Out of flight time");
    } else {
        pigeon.fly_meter_ms = remaining;
        pigeon.flight = FlightState::Flying { drained_at: now };
    }
}

/// Apply the speed boost multiplier while the chest buff runs
pub fn update_powerups(state: &mut GameState, now: f64) {
    let tuning = &state.tuning.pigeon;
    state.pigeon.speed = if state.pigeon.speed_boost_active(now) {
        tuning.speed * tuning.speed_boost_factor
    } else {
        tuning.speed
    };
}

/// Move one step along `intent`, or toward the move target when idle
pub fn move_pigeon(state: &mut GameState, intent: Vec2) {
    if state.pigeon.is_roosted() {
        return;
    }

    let speed = state.pigeon.speed;
    let mut delta = intent;

    if delta != Vec2::ZERO {
        // Held directions supersede a pointer target
        state.move_target = None;
    } else if let Some(target) = state.move_target {
        delta = target - state.pigeon.pos;
        if delta.length() < speed * 2.0 {
            state.move_target = None;
            return;
        }
    }

    if delta == Vec2::ZERO {
        return;
    }

    let step = delta.normalize_or_zero() * speed;
    let next = state.pigeon.pos + step;

    let blocked = !state.pigeon.is_flying()
        && state
            .world
            .nearest_tree(next, state.tuning.world.tree_collision_radius)
            .is_some();
    if !blocked {
        state.pigeon.pos = next;
    }

    state.pigeon.facing = state.pigeon.facing.from_dx(delta.x);
}
