//! Pigeon Run - an infinite-world arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world generation, pigeon, cats, spawning, collisions)
//! - `view`: Viewport culling and drawable records for the renderer
//! - `tuning`: Data-driven game balance
//! - `highscores`: Leaderboard handed to the persistence layer

pub mod highscores;
pub mod sim;
pub mod tuning;
pub mod view;

pub use highscores::HighScores;
pub use tuning::Tuning;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// World grid constants
pub mod consts {
    /// Side length of one world tile (world units)
    pub const TILE_SIZE: f32 = 40.0;

    /// Tile radius scanned around a point when testing pond containment.
    /// Ponds reach at most 55 units from their tile centre, so two tiles is enough.
    pub const POND_SEARCH_RADIUS: i32 = 2;

    /// Extra tiles scanned around the viewport to avoid pop-in at the edges
    pub const VIEW_MARGIN_TILES: f32 = 2.0;

    /// Hash channels (one per independent generation decision)
    pub const CH_GROUND_KIND: u32 = 1;
    pub const CH_GROUND_DETAIL: u32 = 2;
    pub const CH_GROUND_DECOR: u32 = 3;
    pub const CH_TREE: u32 = 42;
    pub const CH_POND: u32 = 99;
    pub const CH_POND_RX: u32 = 100;
    pub const CH_POND_RY: u32 = 101;
}

/// Integer tile address on the infinite grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub tx: i32,
    pub ty: i32,
}

impl TileCoord {
    pub const fn new(tx: i32, ty: i32) -> Self {
        Self { tx, ty }
    }

    /// World-space centre of this tile
    #[inline]
    pub fn center(self) -> Vec2 {
        tile_to_world(self.tx, self.ty)
    }

    /// World-space top-left corner of this tile
    #[inline]
    pub fn origin(self) -> Vec2 {
        Vec2::new(
            self.tx as f32 * consts::TILE_SIZE,
            self.ty as f32 * consts::TILE_SIZE,
        )
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.tx + dx, self.ty + dy)
    }
}

/// Convert world coordinates to the containing tile (floor division)
#[inline]
pub fn world_to_tile(pos: Vec2) -> TileCoord {
    TileCoord::new(
        (pos.x / consts::TILE_SIZE).floor() as i32,
        (pos.y / consts::TILE_SIZE).floor() as i32,
    )
}

/// Convert tile coordinates to the world-space centre of that tile
#[inline]
pub fn tile_to_world(tx: i32, ty: i32) -> Vec2 {
    Vec2::new(
        tx as f32 * consts::TILE_SIZE + consts::TILE_SIZE / 2.0,
        ty as f32 * consts::TILE_SIZE + consts::TILE_SIZE / 2.0,
    )
}

/// Unit vector for an angle in radians
#[inline]
pub fn unit_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}
