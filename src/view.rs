//! Render-facing queries
//!
//! Culls the world and entity lists to a camera rectangle and hands back
//! plain records. Drawing itself belongs to the embedding renderer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::TileCoord;
use crate::consts::{TILE_SIZE, VIEW_MARGIN_TILES};
use crate::sim::state::{Facing, FlightState, GameState, PickupKind};
use crate::sim::world::{GroundTile, Pond, Tree, World};

/// Camera rectangle in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Top-left corner
    pub origin: Vec2,
    pub size: Vec2,
}

impl Viewport {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Camera following `center` (usually the pigeon)
    pub fn centered_on(center: Vec2, size: Vec2) -> Self {
        Self::new(center - size / 2.0, size)
    }

    /// Point inside the rectangle grown by `margin` on every side
    pub fn contains(&self, p: Vec2, margin: f32) -> bool {
        let min = self.origin - Vec2::splat(margin);
        let max = self.origin + self.size + Vec2::splat(margin);
        p.cmpge(min).all() && p.cmple(max).all()
    }

    #[inline]
    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        p - self.origin
    }

    #[inline]
    pub fn screen_to_world(&self, p: Vec2) -> Vec2 {
        p + self.origin
    }
}

/// Entity culling margin in world units
const ENTITY_MARGIN: f32 = VIEW_MARGIN_TILES * TILE_SIZE;

pub fn ground_tiles(world: &mut World, vp: &Viewport) -> Vec<(TileCoord, GroundTile)> {
    world.ground_in_view(vp.origin, vp.size).collect()
}

pub fn trees(world: &mut World, vp: &Viewport) -> Vec<Tree> {
    world.trees_in_view(vp.origin, vp.size).collect()
}

pub fn ponds(world: &mut World, vp: &Viewport) -> Vec<Pond> {
    world.ponds_in_view(vp.origin, vp.size).collect()
}

/// What a drawable record depicts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DrawableKind {
    Tree {
        has_pigeon: bool,
        climbing_cat: Option<u32>,
    },
    Breadcrumb,
    Chest,
    Diamond,
    Cat {
        id: u32,
        facing: Facing,
        /// Climb height in [0, 1] while on a tree
        climb_progress: Option<f32>,
    },
    Pigeon {
        facing: Facing,
        flying: bool,
    },
}

/// One sprite's worth of state, in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drawable {
    pub pos: Vec2,
    pub kind: DrawableKind,
}

/// Everything visible in `vp`, unsorted
pub fn drawables(state: &mut GameState, vp: &Viewport) -> Vec<Drawable> {
    let roost = state.pigeon.roost();
    let mut out: Vec<Drawable> = state
        .world
        .trees_in_view(vp.origin, vp.size)
        .filter(|tree| vp.contains(tree.pos, ENTITY_MARGIN))
        .map(|tree| Drawable {
            pos: tree.pos,
            kind: DrawableKind::Tree {
                has_pigeon: roost == Some(tree.tile),
                climbing_cat: tree.climbing_cat,
            },
        })
        .collect();

    out.extend(
        state
            .pickups
            .iter()
            .filter(|p| vp.contains(p.pos, ENTITY_MARGIN))
            .map(|p| Drawable {
                pos: p.pos,
                kind: match p.kind {
                    PickupKind::Breadcrumb => DrawableKind::Breadcrumb,
                    PickupKind::Chest => DrawableKind::Chest,
                    PickupKind::Diamond => DrawableKind::Diamond,
                },
            }),
    );

    out.extend(
        state
            .cats
            .iter()
            .filter(|c| vp.contains(c.pos, ENTITY_MARGIN))
            .map(|c| Drawable {
                pos: c.pos,
                kind: DrawableKind::Cat {
                    id: c.id,
                    facing: c.facing,
                    climb_progress: c.climb.map(|climb| climb.progress),
                },
            }),
    );

    // A roosted pigeon is drawn as part of its tree
    let pigeon = &state.pigeon;
    if !pigeon.is_roosted() && vp.contains(pigeon.pos, ENTITY_MARGIN) {
        out.push(Drawable {
            pos: pigeon.pos,
            kind: DrawableKind::Pigeon {
                facing: pigeon.facing,
                flying: pigeon.is_flying(),
            },
        });
    }

    out
}

/// Painter's order: lower y first
pub fn sort_by_depth(drawables: &mut [Drawable]) {
    drawables.sort_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
}

/// Text prompt next to the fly button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightPrompt {
    /// In the air with this many seconds left
    Flying { secs: u32 },
    /// Roosted; activate launches
    FlyOff,
    /// Grounded with stored flight time
    Ready { secs: u32 },
    /// Grounded with an empty meter
    NeedBread,
}

/// HUD snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HudStatus {
    pub score: u64,
    pub speed_boost_secs: u32,
    pub predator_secs: u32,
    pub friendly_mode: bool,
    pub fly_meter_ms: f64,
    pub max_fly_ms: f64,
    pub prompt: FlightPrompt,
}

/// Whole seconds left until `until`, never negative
fn secs_left(until: f64, now: f64) -> u32 {
    ((until - now) / 1000.0).ceil().max(0.0) as u32
}

pub fn hud(state: &GameState, now: f64) -> HudStatus {
    let pigeon = &state.pigeon;
    let prompt = match pigeon.flight {
        FlightState::Flying { drained_at } => FlightPrompt::Flying {
            secs: secs_left(drained_at + pigeon.fly_meter_ms, now),
        },
        FlightState::Roosted { .. } => FlightPrompt::FlyOff,
        FlightState::Grounded => match secs_left(pigeon.fly_meter_ms, 0.0) {
            0 => FlightPrompt::NeedBread,
            secs => FlightPrompt::Ready { secs },
        },
    };

    HudStatus {
        score: state.score,
        speed_boost_secs: secs_left(pigeon.speed_boost_until, now),
        predator_secs: secs_left(pigeon.predator_until, now),
        friendly_mode: state.friendly_mode,
        fly_meter_ms: pigeon.fly_meter_ms,
        max_fly_ms: state.tuning.pigeon.max_fly_time_ms,
        prompt,
    }
}
