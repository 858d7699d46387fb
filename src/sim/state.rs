//! Game state and core simulation types
//!
//! One `GameState` owns everything a session mutates: the world caches,
//! the pigeon, cats, pickups and spawn timers. Starting a new session
//! rebuilds all of it in place.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::world::World;
use crate::TileCoord;
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Created but not started
    Ready,
    /// Active gameplay
    Playing,
    /// Caught by a cat
    Ended { final_score: u64 },
}

/// Horizontal sprite orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing for a horizontal component; zero keeps `self`
    pub fn from_dx(self, dx: f32) -> Self {
        if dx > 0.0 {
            Facing::Right
        } else if dx < 0.0 {
            Facing::Left
        } else {
            self
        }
    }

    /// Strictly positive dx faces right, anything else left
    pub fn toward(dx: f32) -> Self {
        if dx > 0.0 { Facing::Right } else { Facing::Left }
    }

    /// -1.0 or +1.0
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Pigeon movement state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum FlightState {
    /// Walking, blocked by trees
    #[default]
    Grounded,
    /// Airborne, draining the fly meter since `drained_at`
    Flying { drained_at: f64 },
    /// Perched on the tree at `tree`
    Roosted { tree: TileCoord },
}

/// The player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pigeon {
    pub pos: Vec2,
    /// Current speed (units per tick), includes the boost multiplier
    pub speed: f32,
    pub facing: Facing,
    pub flight: FlightState,
    /// Timestamp of the last accepted activation (ms); `None` until the first
    pub last_activation: Option<f64>,
    /// Stored flight time (ms)
    pub fly_meter_ms: f64,
    pub speed_boost_until: f64,
    pub predator_until: f64,
}

impl Pigeon {
    pub fn new(speed: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            speed,
            facing: Facing::Right,
            flight: FlightState::Grounded,
            last_activation: None,
            fly_meter_ms: 0.0,
            speed_boost_until: 0.0,
            predator_until: 0.0,
        }
    }

    #[inline]
    pub fn is_flying(&self) -> bool {
        matches!(self.flight, FlightState::Flying { .. })
    }

    #[inline]
    pub fn is_roosted(&self) -> bool {
        matches!(self.flight, FlightState::Roosted { .. })
    }

    /// Tree the pigeon is perched on
    pub fn roost(&self) -> Option<TileCoord> {
        match self.flight {
            FlightState::Roosted { tree } => Some(tree),
            _ => None,
        }
    }

    #[inline]
    pub fn speed_boost_active(&self, now: f64) -> bool {
        now < self.speed_boost_until
    }

    /// Cat-eater buff
    #[inline]
    pub fn predator_active(&self, now: f64) -> bool {
        now < self.predator_until
    }
}

/// A cat climbing a tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Climb {
    pub tree: TileCoord,
    /// 0 at the trunk base, 1 at the top
    pub progress: f32,
}

/// An enemy cat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cat {
    pub id: u32,
    pub pos: Vec2,
    /// Unit heading (or zero when on top of the pigeon)
    pub dir: Vec2,
    pub facing: Facing,
    pub speed: f32,
    /// Ticks left on the current wander heading (friendly mode)
    pub wander_ticks: Option<f32>,
    pub climb: Option<Climb>,
}

impl Cat {
    pub fn is_climbing(&self) -> bool {
        self.climb.is_some()
    }
}

/// Collectible kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    /// Points and flight time
    Breadcrumb,
    /// Points and a speed boost
    Chest,
    /// Points and predator mode
    Diamond,
}

/// A collectible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub pos: Vec2,
}

/// Things that happened during a tick, for audio and UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BreadcrumbEaten { pos: Vec2 },
    ChestOpened { pos: Vec2 },
    DiamondCollected { pos: Vec2 },
    CatEaten { pos: Vec2 },
    Caught { final_score: u64 },
    TookOff,
    Landed,
    Roosted { tree: TileCoord },
    FriendlyModeChanged { enabled: bool },
}

/// Absolute timestamps of the last spawn per kind (ms)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SpawnTimers {
    pub breadcrumb: f64,
    pub cat: f64,
    pub chest: f64,
    pub diamond: f64,
}

impl SpawnTimers {
    pub fn all_at(now: f64) -> Self {
        Self {
            breadcrumb: now,
            cat: now,
            chest: now,
            diamond: now,
        }
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed (world layout and gameplay RNG)
    pub seed: u64,
    pub tuning: Tuning,
    /// Gameplay RNG (spawn placement, wander headings)
    pub rng: Pcg32,
    pub world: World,
    pub phase: GamePhase,
    pub score: u64,
    /// Cats wander and cannot hurt the pigeon
    pub friendly_mode: bool,
    pub pigeon: Pigeon,
    /// Active cats (ascending id)
    pub cats: Vec<Cat>,
    /// Active pickups (ascending id)
    pub pickups: Vec<Pickup>,
    pub spawn_timers: SpawnTimers,
    /// World-space "walk here" target from pointer input
    pub move_target: Option<Vec2>,
    /// Session start timestamp (ms)
    pub started_at: f64,
    /// Cats eaten this session
    pub cats_eaten: u32,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a session in the `Ready` phase
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let world = World::new(world_seed(seed), tuning.world.clone());
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            world,
            phase: GamePhase::Ready,
            score: 0,
            friendly_mode: false,
            pigeon: Pigeon::new(tuning.pigeon.speed),
            cats: Vec::new(),
            pickups: Vec::new(),
            spawn_timers: SpawnTimers::default(),
            move_target: None,
            started_at: 0.0,
            cats_eaten: 0,
            events: Vec::new(),
            next_id: 1,
            tuning,
        }
    }

    /// Begin a fresh session at `now`, discarding all previous state
    pub fn start(&mut self, now: f64) {
        self.world.reset_with_seed(world_seed(self.seed));
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.pigeon = Pigeon::new(self.tuning.pigeon.speed);
        self.cats.clear();
        self.pickups.clear();
        self.events.clear();
        self.score = 0;
        self.cats_eaten = 0;
        self.friendly_mode = false;
        self.move_target = None;
        self.next_id = 1;

        for _ in 0..self.tuning.spawning.initial_breadcrumbs {
            super::spawn::spawn_breadcrumb(self);
        }

        // Timers start now so nothing mass-spawns on the first tick
        self.spawn_timers = SpawnTimers::all_at(now);
        self.started_at = now;
        self.phase = GamePhase::Playing;
        log::info!(
            "Session started (seed {}, {} breadcrumbs)",
            self.seed,
            self.pickups.len()
        );
    }

    /// Start again with a different seed
    pub fn restart(&mut self, seed: u64, now: f64) {
        self.seed = seed;
        self.start(now);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Score at session end, for the high-score collaborator
    pub fn final_score(&self) -> Option<u64> {
        match self.phase {
            GamePhase::Ended { final_score } => Some(final_score),
            _ => None,
        }
    }

    pub fn add_score(&mut self, points: u64) {
        self.score += points;
    }

    /// Terminal transition: stop ticking and report the score
    pub fn end(&mut self) {
        let final_score = self.score;
        self.phase = GamePhase::Ended { final_score };
        self.events.push(GameEvent::Caught { final_score });
        log::info!("Session ended with score {final_score}");
    }

    pub fn pickups_of(&self, kind: PickupKind) -> impl Iterator<Item = &Pickup> {
        self.pickups.iter().filter(move |p| p.kind == kind)
    }

    pub fn breadcrumbs(&self) -> impl Iterator<Item = &Pickup> {
        self.pickups_of(PickupKind::Breadcrumb)
    }

    pub fn chests(&self) -> impl Iterator<Item = &Pickup> {
        self.pickups_of(PickupKind::Chest)
    }

    pub fn diamonds(&self) -> impl Iterator<Item = &Pickup> {
        self.pickups_of(PickupKind::Diamond)
    }

    /// Place a pickup (used by spawning and by tests)
    pub fn add_pickup(&mut self, kind: PickupKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.pickups.push(Pickup { id, kind, pos });
        id
    }

    /// Place a cat heading toward the pigeon
    pub fn add_cat(&mut self, pos: Vec2, speed: f32) -> u32 {
        let id = self.next_entity_id();
        let dir = (self.pigeon.pos - pos).normalize_or_zero();
        self.cats.push(Cat {
            id,
            pos,
            dir,
            facing: Facing::toward(dir.x),
            speed,
            wander_ticks: None,
            climb: None,
        });
        id
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// World layout seed derived from the run seed
fn world_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}
