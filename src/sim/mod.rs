//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Timestamps come from the caller, never from a clock
//! - Seeded RNG only
//! - World features depend only on (tile, seed)
//! - No rendering or platform dependencies

pub mod cats;
pub mod collision;
pub mod hash;
pub mod pigeon;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod world;

pub use cats::{CatMode, cleanup_cats, update_cats};
pub use collision::check_collisions;
pub use hash::hash;
pub use pigeon::{activate, move_pigeon, update_flight, update_powerups};
pub use spawn::update_spawning;
pub use state::{
    Cat, Climb, Facing, FlightState, GameEvent, GamePhase, GameState, Pickup, PickupKind, Pigeon,
};
pub use tick::{TickInput, autopilot, normalize_intent, tick};
pub use world::{CacheStats, GroundTile, Pond, TerrainKind, Tree, World};
