//! Infinite procedural world
//!
//! Tiles are generated lazily from the coordinate hash and memoized for the
//! rest of the session. Trees and ponds use negative caching: a tile that was
//! evaluated as empty stays empty without another hash draw.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hash::hash;
use crate::consts::*;
use crate::tuning::WorldTuning;
use crate::{TileCoord, world_to_tile};

/// Ground terrain kinds, rarest last
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainKind {
    Grass,
    DarkGrass,
    Dirt,
}

/// Cosmetic ground data for one tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundTile {
    pub kind: TerrainKind,
    /// Colour jitter in [-10, 10)
    pub variation: f32,
    pub has_flower: bool,
    pub has_rock: bool,
    pub has_tuft: bool,
}

/// A tree, at most one per tile, always at the tile centre
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub tile: TileCoord,
    pub pos: Vec2,
    pub radius: f32,
    /// Cat currently climbing this tree
    pub climbing_cat: Option<u32>,
}

/// An elliptical pond centred on its tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pond {
    pub tile: TileCoord,
    pub pos: Vec2,
    pub radius_x: f32,
    pub radius_y: f32,
}

impl Pond {
    /// Normalized ellipse containment (strict)
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        let nx = (p.x - self.pos.x) / self.radius_x;
        let ny = (p.y - self.pos.y) / self.radius_y;
        nx * nx + ny * ny < 1.0
    }
}

/// Memoized generation result for one tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cached<T> {
    Present(T),
    Absent,
}

impl<T: Copy> Cached<T> {
    #[inline]
    fn get(&self) -> Option<T> {
        match self {
            Cached::Present(value) => Some(*value),
            Cached::Absent => None,
        }
    }
}

/// Cache occupancy, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub ground: usize,
    pub trees: usize,
    pub ponds: usize,
}

/// Lazily generated infinite world
#[derive(Debug, Clone)]
pub struct World {
    seed: u32,
    tuning: WorldTuning,
    ground: HashMap<TileCoord, GroundTile>,
    trees: HashMap<TileCoord, Cached<Tree>>,
    ponds: HashMap<TileCoord, Cached<Pond>>,
}

impl World {
    pub fn new(seed: u32, tuning: WorldTuning) -> Self {
        Self {
            seed,
            tuning,
            ground: HashMap::new(),
            trees: HashMap::new(),
            ponds: HashMap::new(),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Drop every cached tile
    pub fn reset(&mut self) {
        self.ground.clear();
        self.trees.clear();
        self.ponds.clear();
    }

    /// Drop every cached tile and switch to a new world seed
    pub fn reset_with_seed(&mut self, seed: u32) {
        self.reset();
        self.seed = seed;
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            ground: self.ground.len(),
            trees: self.trees.len(),
            ponds: self.ponds.len(),
        }
    }

    /// Hash draw for a tile on the given channel, perturbed by the world seed
    #[inline]
    fn roll(&self, tile: TileCoord, channel: u32) -> f32 {
        let seed = channel.wrapping_add(self.seed.wrapping_mul(0x9E37_79B9));
        hash(tile.tx, tile.ty, seed)
    }

    /// Ground data for a tile
    pub fn ground_tile_at(&mut self, tx: i32, ty: i32) -> GroundTile {
        let tile = TileCoord::new(tx, ty);
        if let Some(ground) = self.ground.get(&tile) {
            return *ground;
        }

        let h1 = self.roll(tile, CH_GROUND_KIND);
        let h2 = self.roll(tile, CH_GROUND_DETAIL);
        let h3 = self.roll(tile, CH_GROUND_DECOR);

        // Rarest threshold first
        let kind = if h1 > 0.92 {
            TerrainKind::Dirt
        } else if h1 > 0.85 {
            TerrainKind::DarkGrass
        } else {
            TerrainKind::Grass
        };

        let ground = GroundTile {
            kind,
            variation: h2 * 20.0 - 10.0,
            has_flower: h3 > 0.95,
            has_rock: h3 < 0.03,
            has_tuft: h2 > 0.9,
        };
        self.ground.insert(tile, ground);
        ground
    }

    /// Tree on the tile containing `pos`, if any
    pub fn tree_at(&mut self, pos: Vec2) -> Option<Tree> {
        self.tree_at_tile(world_to_tile(pos))
    }

    pub fn tree_at_tile(&mut self, tile: TileCoord) -> Option<Tree> {
        if let Some(cached) = self.trees.get(&tile) {
            return cached.get();
        }

        let entry = if self.roll(tile, CH_TREE) < self.tuning.tree_density {
            Cached::Present(Tree {
                tile,
                pos: tile.center(),
                radius: self.tuning.tree_collision_radius,
                climbing_cat: None,
            })
        } else {
            Cached::Absent
        };
        self.trees.insert(tile, entry);
        entry.get()
    }

    /// Pond on the tile containing `pos`, if any
    pub fn pond_at(&mut self, pos: Vec2) -> Option<Pond> {
        self.pond_at_tile(world_to_tile(pos))
    }

    pub fn pond_at_tile(&mut self, tile: TileCoord) -> Option<Pond> {
        if let Some(cached) = self.ponds.get(&tile) {
            return cached.get();
        }

        // Trees win the tile; the pond channel is never drawn under a tree
        if self.tree_at_tile(tile).is_some() {
            self.ponds.insert(tile, Cached::Absent);
            return None;
        }

        let entry = if self.roll(tile, CH_POND) < self.tuning.pond_density {
            let t = &self.tuning;
            Cached::Present(Pond {
                tile,
                pos: tile.center(),
                radius_x: t.pond_radius_x_min + self.roll(tile, CH_POND_RX) * t.pond_radius_x_range,
                radius_y: t.pond_radius_y_min + self.roll(tile, CH_POND_RY) * t.pond_radius_y_range,
            })
        } else {
            Cached::Absent
        };
        self.ponds.insert(tile, entry);
        entry.get()
    }

    /// First pond (row-major scan around the point's tile) whose ellipse contains `pos`
    pub fn is_in_pond(&mut self, pos: Vec2) -> Option<Pond> {
        let center = world_to_tile(pos);
        let r = POND_SEARCH_RADIUS;
        for dy in -r..=r {
            for dx in -r..=r {
                if let Some(pond) = self.pond_at_tile(center.offset(dx, dy)) {
                    if pond.contains(pos) {
                        return Some(pond);
                    }
                }
            }
        }
        None
    }

    /// Closest tree strictly within `max_dist`; ties keep the first in scan order
    pub fn nearest_tree(&mut self, pos: Vec2, max_dist: f32) -> Option<Tree> {
        let center = world_to_tile(pos);
        let r = (max_dist / TILE_SIZE).ceil() as i32 + 1;

        let mut nearest = None;
        let mut nearest_dist = max_dist;
        for dy in -r..=r {
            for dx in -r..=r {
                if let Some(tree) = self.tree_at_tile(center.offset(dx, dy)) {
                    let dist = pos.distance(tree.pos);
                    if dist < nearest_dist {
                        nearest_dist = dist;
                        nearest = Some(tree);
                    }
                }
            }
        }
        nearest
    }

    /// Trees on tiles covering the view rectangle plus margin, row-major
    pub fn trees_in_view(&mut self, cam: Vec2, size: Vec2) -> impl Iterator<Item = Tree> + '_ {
        view_tiles(cam, size).filter_map(move |tile| self.tree_at_tile(tile))
    }

    /// Ponds on tiles covering the view rectangle plus margin, row-major
    pub fn ponds_in_view(&mut self, cam: Vec2, size: Vec2) -> impl Iterator<Item = Pond> + '_ {
        view_tiles(cam, size).filter_map(move |tile| self.pond_at_tile(tile))
    }

    /// Ground tiles covering the view rectangle with one tile of bleed
    pub fn ground_in_view(
        &mut self,
        cam: Vec2,
        size: Vec2,
    ) -> impl Iterator<Item = (TileCoord, GroundTile)> + '_ {
        let start = world_to_tile(cam).offset(-1, -1);
        let end = world_to_tile(cam + size).offset(1, 1);
        tile_rect(start, end).map(move |tile| (tile, self.ground_tile_at(tile.tx, tile.ty)))
    }

    /// Cached tree on a tile (no generation)
    pub fn tree(&self, tile: TileCoord) -> Option<&Tree> {
        match self.trees.get(&tile) {
            Some(Cached::Present(tree)) => Some(tree),
            _ => None,
        }
    }

    /// Give a cat the climbing slot of a tree. Fails if another cat holds it.
    pub fn claim_tree(&mut self, tile: TileCoord, cat_id: u32) -> bool {
        match self.trees.get_mut(&tile) {
            Some(Cached::Present(tree)) => match tree.climbing_cat {
                None => {
                    tree.climbing_cat = Some(cat_id);
                    true
                }
                Some(holder) => holder == cat_id,
            },
            _ => false,
        }
    }

    /// Free the climbing slot if `cat_id` holds it
    pub fn release_tree(&mut self, tile: TileCoord, cat_id: u32) {
        if let Some(Cached::Present(tree)) = self.trees.get_mut(&tile) {
            if tree.climbing_cat == Some(cat_id) {
                tree.climbing_cat = None;
            }
        }
    }
}

/// Tile rectangle for a view plus the fixed margin
fn view_tiles(cam: Vec2, size: Vec2) -> impl Iterator<Item = TileCoord> {
    let margin = VIEW_MARGIN_TILES * TILE_SIZE;
    let start = TileCoord::new(
        ((cam.x - margin) / TILE_SIZE).floor() as i32,
        ((cam.y - margin) / TILE_SIZE).floor() as i32,
    );
    let end = TileCoord::new(
        ((cam.x + size.x + margin) / TILE_SIZE).ceil() as i32,
        ((cam.y + size.y + margin) / TILE_SIZE).ceil() as i32,
    );
    tile_rect(start, end)
}

/// Inclusive tile rectangle, row-major
fn tile_rect(start: TileCoord, end: TileCoord) -> impl Iterator<Item = TileCoord> {
    (start.ty..=end.ty)
        .flat_map(move |ty| (start.tx..=end.tx).map(move |tx| TileCoord::new(tx, ty)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn world() -> World {
        World::new(0, WorldTuning::default())
    }

    fn first_tree(world: &mut World) -> Tree {
        for ty in -20..20 {
            for tx in -20..20 {
                if let Some(tree) = world.tree_at_tile(TileCoord::new(tx, ty)) {
                    return tree;
                }
            }
        }
        panic!("no tree in a 40x40 tile block");
    }

    fn first_pond(world: &mut World) -> Pond {
        for ty in -30..30 {
            for tx in -30..30 {
                if let Some(pond) = world.pond_at_tile(TileCoord::new(tx, ty)) {
                    return pond;
                }
            }
        }
        panic!("no pond in a 60x60 tile block");
    }

    #[test]
    fn test_ground_thresholds_follow_hash() {
        let mut world = world();
        for ty in -15..15 {
            for tx in -15..15 {
                let tile = world.ground_tile_at(tx, ty);
                let h1 = hash(tx, ty, CH_GROUND_KIND);
                let expected = if h1 > 0.92 {
                    TerrainKind::Dirt
                } else if h1 > 0.85 {
                    TerrainKind::DarkGrass
                } else {
                    TerrainKind::Grass
                };
                assert_eq!(tile.kind, expected);
                assert!((-10.0..10.0).contains(&tile.variation));
                assert!(!(tile.has_flower && tile.has_rock));
            }
        }
    }

    #[test]
    fn test_tree_sits_at_tile_center() {
        let mut world = world();
        let tree = first_tree(&mut world);
        assert_eq!(tree.pos, tree.tile.center());
        assert_eq!(tree.radius, 25.0);
        assert_eq!(tree.climbing_cat, None);
        // Any point on the same tile finds the same tree
        let corner = tree.tile.origin() + Vec2::splat(1.0);
        assert_eq!(world.tree_at(corner), Some(tree));
    }

    #[test]
    fn test_negative_results_are_cached() {
        let mut world = world();
        let empty = (0..100)
            .map(|tx| TileCoord::new(tx, 0))
            .find(|&tile| world.tree_at_tile(tile).is_none())
            .expect("an empty tile");
        let before = world.cache_stats().trees;
        assert_eq!(world.tree_at_tile(empty), None);
        assert_eq!(world.cache_stats().trees, before);
    }

    #[test]
    fn test_pond_lookup_caches_tree_too() {
        let mut world = world();
        world.pond_at_tile(TileCoord::new(3, 3));
        let stats = world.cache_stats();
        assert_eq!(stats.ponds, 1);
        assert_eq!(stats.trees, 1);
    }

    #[test]
    fn test_pond_radii_in_range() {
        let mut world = world();
        let pond = first_pond(&mut world);
        assert!((35.0..55.0).contains(&pond.radius_x));
        assert!((25.0..40.0).contains(&pond.radius_y));
        assert!(world.tree_at_tile(pond.tile).is_none());
    }

    /// A point covered by two ponds on neighbouring tiles
    fn overlapping_ponds(world: &mut World) -> Vec2 {
        for ty in -300..300 {
            for tx in -300..300 {
                let Some(a) = world.pond_at_tile(TileCoord::new(tx, ty)) else {
                    continue;
                };
                for (dx, dy) in [(1, 0), (-1, 1), (0, 1), (1, 1)] {
                    let Some(b) = world.pond_at_tile(TileCoord::new(tx + dx, ty + dy)) else {
                        continue;
                    };
                    let mid = (a.pos + b.pos) / 2.0;
                    if a.contains(mid) && b.contains(mid) {
                        return mid;
                    }
                }
            }
        }
        panic!("no overlapping ponds");
    }

    #[test]
    fn test_overlapping_ponds_pick_first_row_major() {
        let mut world = world();
        let point = overlapping_ponds(&mut world);

        let center = world_to_tile(point);
        let mut covering = Vec::new();
        for ty in center.ty - POND_SEARCH_RADIUS..=center.ty + POND_SEARCH_RADIUS {
            for tx in center.tx - POND_SEARCH_RADIUS..=center.tx + POND_SEARCH_RADIUS {
                if let Some(pond) = world.pond_at_tile(TileCoord::new(tx, ty)) {
                    if pond.contains(point) {
                        covering.push(pond);
                    }
                }
            }
        }
        assert!(covering.len() >= 2);

        let earliest = covering
            .iter()
            .min_by_key(|p| (p.tile.ty, p.tile.tx))
            .copied();
        assert_eq!(world.is_in_pond(point), earliest);
        // Repeated queries agree
        assert_eq!(world.is_in_pond(point), earliest);
    }

    #[test]
    fn test_is_in_pond_center_and_outside() {
        let mut world = world();
        let pond = first_pond(&mut world);
        let hit = world.is_in_pond(pond.pos).expect("centre is inside");
        assert!(hit.contains(pond.pos));

        // Just past the horizontal radius is outside this pond
        let outside = pond.pos + Vec2::new(pond.radius_x + 0.5, 0.0);
        if let Some(other) = world.is_in_pond(outside) {
            assert_ne!(other.tile, pond.tile);
        }
    }

    #[test]
    fn test_nearest_tree_matches_brute_force() {
        let mut world = world();
        let tree = first_tree(&mut world);
        let query = tree.pos + Vec2::new(30.0, -20.0);
        let found = world.nearest_tree(query, 200.0).expect("tree within range");

        let mut best = f32::MAX;
        for ty in -10..=10 {
            for tx in -10..=10 {
                let tile = world_to_tile(query).offset(tx, ty);
                if let Some(t) = world.tree_at_tile(tile) {
                    best = best.min(query.distance(t.pos));
                }
            }
        }
        assert_eq!(query.distance(found.pos), best);
    }

    #[test]
    fn test_nearest_tree_distance_is_strict() {
        let mut world = world();
        let tree = first_tree(&mut world);
        let query = tree.pos + Vec2::new(10.0, 0.0);
        assert!(world.nearest_tree(query, 10.0).is_none_or(|t| t.tile != tree.tile));
        assert_eq!(world.nearest_tree(query, 10.5).map(|t| t.tile), Some(tree.tile));
    }

    #[test]
    fn test_trees_in_view_row_major() {
        let mut world = world();
        let cam = Vec2::new(-400.0, -400.0);
        let size = Vec2::new(800.0, 800.0);
        let trees: Vec<Tree> = world.trees_in_view(cam, size).collect();
        assert!(!trees.is_empty());
        for pair in trees.windows(2) {
            let (a, b) = (pair[0].tile, pair[1].tile);
            assert!((a.ty, a.tx) < (b.ty, b.tx));
        }
        // Margin reaches two tiles past the view
        for tree in &trees {
            assert!(tree.tile.tx >= -12 && tree.tile.tx <= 12);
            assert!(tree.tile.ty >= -12 && tree.tile.ty <= 12);
        }
    }

    #[test]
    fn test_ponds_in_view_never_overlap_trees() {
        let mut world = world();
        let cam = Vec2::new(-1200.0, -1200.0);
        let size = Vec2::new(2400.0, 2400.0);
        let ponds: Vec<Pond> = world.ponds_in_view(cam, size).collect();
        for pond in ponds {
            assert!(world.tree_at_tile(pond.tile).is_none());
        }
    }

    #[test]
    fn test_ground_in_view_covers_viewport() {
        let mut world = world();
        let tiles: Vec<_> = world
            .ground_in_view(Vec2::new(0.0, 0.0), Vec2::new(600.0, 500.0))
            .collect();
        // 15 + 2 bleed + 1 partial columns, 12 + 2 bleed + 1 partial rows
        assert_eq!(tiles.len(), 18 * 15);
        assert_eq!(tiles[0].0, TileCoord::new(-1, -1));
    }

    #[test]
    fn test_reset_clears_caches() {
        let mut world = world();
        world.ground_tile_at(0, 0);
        world.pond_at_tile(TileCoord::new(0, 0));
        assert_ne!(world.cache_stats(), CacheStats::default());
        world.reset();
        assert_eq!(world.cache_stats(), CacheStats::default());
    }

    #[test]
    fn test_seed_changes_world() {
        let mut a = World::new(1, WorldTuning::default());
        let mut b = World::new(2, WorldTuning::default());
        let differs = (0..400).any(|i| {
            let tile = TileCoord::new(i % 20, i / 20);
            a.tree_at_tile(tile).is_some() != b.tree_at_tile(tile).is_some()
        });
        assert!(differs);
    }

    #[test]
    fn test_claim_is_exclusive() {
        let mut world = world();
        let tree = first_tree(&mut world);
        assert!(world.claim_tree(tree.tile, 7));
        assert!(world.claim_tree(tree.tile, 7));
        assert!(!world.claim_tree(tree.tile, 8));

        world.release_tree(tree.tile, 8);
        assert_eq!(world.tree(tree.tile).and_then(|t| t.climbing_cat), Some(7));

        world.release_tree(tree.tile, 7);
        assert!(world.claim_tree(tree.tile, 8));
    }

    #[test]
    fn test_claim_without_tree_fails() {
        let mut world = world();
        let empty = (0..100)
            .map(|tx| TileCoord::new(tx, 1))
            .find(|&tile| world.tree_at_tile(tile).is_none())
            .expect("an empty tile");
        assert!(!world.claim_tree(empty, 1));
    }

    proptest! {
        #[test]
        fn prop_queries_are_idempotent(tx in -500i32..500, ty in -500i32..500) {
            let mut world = world();
            let tile = TileCoord::new(tx, ty);
            prop_assert_eq!(world.ground_tile_at(tx, ty), world.ground_tile_at(tx, ty));
            prop_assert_eq!(world.tree_at_tile(tile), world.tree_at_tile(tile));
            prop_assert_eq!(world.pond_at_tile(tile), world.pond_at_tile(tile));

            // A fresh world generates the same tile
            let mut fresh = World::new(0, WorldTuning::default());
            prop_assert_eq!(fresh.pond_at_tile(tile), world.pond_at_tile(tile));
        }

        #[test]
        fn prop_tree_and_pond_exclusive(
            tx in -500i32..500,
            ty in -500i32..500,
            pond_first in any::<bool>(),
        ) {
            let mut world = world();
            let tile = TileCoord::new(tx, ty);
            let (tree, pond) = if pond_first {
                let pond = world.pond_at_tile(tile);
                (world.tree_at_tile(tile), pond)
            } else {
                let tree = world.tree_at_tile(tile);
                (tree, world.pond_at_tile(tile))
            };
            prop_assert!(!(tree.is_some() && pond.is_some()));
        }

        #[test]
        fn prop_pond_hit_satisfies_ellipse(x in -3000.0f32..3000.0, y in -3000.0f32..3000.0) {
            let mut world = world();
            let p = Vec2::new(x, y);
            if let Some(pond) = world.is_in_pond(p) {
                let nx = (p.x - pond.pos.x) / pond.radius_x;
                let ny = (p.y - pond.pos.y) / pond.radius_y;
                prop_assert!(nx * nx + ny * ny < 1.0);
            }
        }
    }
}
