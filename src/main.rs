//! Pigeon Run headless driver
//!
//! Plays one autopilot session at a fixed 60 Hz of simulated time and logs
//! the result. Usage: `pigeon-run [seed] [tuning.json]`

use pigeon_run::highscores::format_duration;
use pigeon_run::sim::{GameEvent, GameState, autopilot, tick};
use pigeon_run::view::{Viewport, drawables, hud};
use pigeon_run::{HighScores, Tuning};

const TICK_MS: f64 = 1000.0 / 60.0;
/// Stop after ten simulated minutes if the autopilot never gets caught
const MAX_TICKS: u64 = 60 * 60 * 10;
const DEFAULT_SEED: u64 = 0x5EED;

fn load_tuning(path: Option<String>) -> Tuning {
    let Some(path) = path else {
        return Tuning::default();
    };
    match std::fs::read_to_string(&path) {
        Ok(json) => match Tuning::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {path}");
                tuning
            }
            Err(e) => {
                log::warn!("Bad tuning file {path}: {e}; using defaults");
                Tuning::default()
            }
        },
        Err(e) => {
            log::warn!("Cannot read {path}: {e}; using defaults");
            Tuning::default()
        }
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_SEED);
    let tuning = load_tuning(args.next());

    let mut state = GameState::new(seed, tuning);
    state.start(0.0);

    let screen = glam::Vec2::new(800.0, 600.0);
    let mut now = 0.0;
    let mut ticks = 0;

    while state.is_playing() && ticks < MAX_TICKS {
        now += TICK_MS;
        ticks += 1;

        let input = autopilot(&state, now);
        tick(&mut state, &input);

        for event in state.drain_events() {
            match event {
                GameEvent::CatEaten { .. } | GameEvent::Roosted { .. } => {
                    log::debug!("{event:?} at {now:.0} ms")
                }
                _ => log::trace!("{event:?}"),
            }
        }

        // Once a simulated second, exercise the render queries like a frontend would
        if ticks % 60 == 0 {
            let vp = Viewport::centered_on(state.pigeon.pos, screen);
            let visible = drawables(&mut state, &vp).len();
            let status = hud(&state, now);
            log::debug!(
                "t={}s score={} visible={} prompt={:?}",
                ticks / 60,
                status.score,
                visible,
                status.prompt
            );
        }
    }

    let duration = now - state.started_at;
    let score = state.final_score().unwrap_or(state.score);
    let stats = state.world.cache_stats();
    log::info!(
        "Session over after {}: score {}, {} cats eaten, {} tiles cached",
        format_duration(duration),
        score,
        state.cats_eaten,
        stats.ground
    );

    let mut scores = HighScores::new();
    match scores.add_score(score, duration, state.cats_eaten) {
        Some(rank) => log::info!("Leaderboard rank {rank}"),
        None => log::info!("Score did not place on the leaderboard"),
    }

    match scores.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize leaderboard: {e}"),
    }
}
