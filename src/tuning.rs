//! Data-driven game balance
//!
//! Every gameplay number lives here so balance passes can ship as JSON.
//! Missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};

/// World generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    /// Probability that a tile holds a tree
    pub tree_density: f32,
    /// Probability that a tree-free tile holds a pond
    pub pond_density: f32,
    /// Collision radius of a tree trunk
    pub tree_collision_radius: f32,
    /// Pond horizontal radius: min + hash * range
    pub pond_radius_x_min: f32,
    pub pond_radius_x_range: f32,
    /// Pond vertical radius: min + hash * range
    pub pond_radius_y_min: f32,
    pub pond_radius_y_range: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            tree_density: 0.02,
            pond_density: 0.015,
            tree_collision_radius: 25.0,
            pond_radius_x_min: 35.0,
            pond_radius_x_range: 20.0,
            pond_radius_y_min: 25.0,
            pond_radius_y_range: 15.0,
        }
    }
}

/// Pigeon movement, flight and buffs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PigeonTuning {
    /// Base movement speed (units per tick)
    pub speed: f32,
    /// Speed multiplier while the chest buff runs
    pub speed_boost_factor: f32,
    /// Flight time earned per breadcrumb (ms)
    pub fly_time_per_bread_ms: f64,
    /// Flight meter cap (ms)
    pub max_fly_time_ms: f64,
    /// Minimum gap between accepted activations (ms)
    pub activate_cooldown_ms: f64,
    /// How close a tree must be to roost on it
    pub roost_reach: f32,
    /// Horizontal hop when launching off a tree
    pub roost_launch_offset: f32,
    /// Duration of chest and diamond buffs (ms)
    pub powerup_duration_ms: f64,
}

impl Default for PigeonTuning {
    fn default() -> Self {
        Self {
            speed: 3.0,
            speed_boost_factor: 1.8,
            fly_time_per_bread_ms: 1000.0,
            max_fly_time_ms: 30_000.0,
            activate_cooldown_ms: 300.0,
            roost_reach: 50.0,
            roost_launch_offset: 40.0,
            powerup_duration_ms: 20_000.0,
        }
    }
}

/// Cat movement and lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatTuning {
    pub base_speed: f32,
    /// Score points per extra unit of cat speed
    pub speed_score_divisor: f32,
    /// Speed multiplier while fleeing a predator pigeon
    pub flee_multiplier: f32,
    /// Speed multiplier while wandering in friendly mode
    pub wander_multiplier: f32,
    /// Wander heading duration: min + random * range (ticks)
    pub wander_ticks_min: f32,
    pub wander_ticks_range: f32,
    /// Climb progress gained per tick
    pub climb_rate: f32,
    /// Distance from the pigeon at which cats appear
    pub spawn_radius: f32,
    /// Distance beyond which cats and pickups are pruned
    pub despawn_radius: f32,
}

impl Default for CatTuning {
    fn default() -> Self {
        Self {
            base_speed: 1.5,
            speed_score_divisor: 500.0,
            flee_multiplier: 1.3,
            wander_multiplier: 0.5,
            wander_ticks_min: 60.0,
            wander_ticks_range: 120.0,
            climb_rate: 0.01,
            spawn_radius: 400.0,
            despawn_radius: 600.0,
        }
    }
}

/// Placement band and tree clearance for one pickup kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementBand {
    pub min_dist: f32,
    pub range: f32,
    pub tree_clearance: f32,
}

/// Spawn timers and caps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub breadcrumb_interval_ms: f64,
    pub chest_interval_ms: f64,
    pub diamond_interval_ms: f64,
    /// Cat interval: max(base - per_point * score, min)
    pub cat_interval_base_ms: f64,
    pub cat_interval_per_point_ms: f64,
    pub cat_interval_min_ms: f64,
    pub max_chests: usize,
    pub max_diamonds: usize,
    pub initial_breadcrumbs: usize,
    pub breadcrumb_band: PlacementBand,
    pub chest_band: PlacementBand,
    pub diamond_band: PlacementBand,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            breadcrumb_interval_ms: 2000.0,
            chest_interval_ms: 15_000.0,
            diamond_interval_ms: 25_000.0,
            cat_interval_base_ms: 3000.0,
            cat_interval_per_point_ms: 20.0,
            cat_interval_min_ms: 1500.0,
            max_chests: 2,
            max_diamonds: 1,
            initial_breadcrumbs: 8,
            breadcrumb_band: PlacementBand {
                min_dist: 100.0,
                range: 250.0,
                tree_clearance: 30.0,
            },
            chest_band: PlacementBand {
                min_dist: 150.0,
                range: 200.0,
                tree_clearance: 40.0,
            },
            diamond_band: PlacementBand {
                min_dist: 180.0,
                range: 220.0,
                tree_clearance: 40.0,
            },
        }
    }
}

/// Points and contact radii
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreTuning {
    pub breadcrumb_points: u64,
    pub chest_points: u64,
    pub diamond_points: u64,
    pub cat_eat_points: u64,
    pub pickup_radius: f32,
    pub powerup_radius: f32,
    pub cat_collision_radius: f32,
}

impl Default for ScoreTuning {
    fn default() -> Self {
        Self {
            breadcrumb_points: 10,
            chest_points: 50,
            diamond_points: 100,
            cat_eat_points: 200,
            pickup_radius: 25.0,
            powerup_radius: 35.0,
            cat_collision_radius: 35.0,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub pigeon: PigeonTuning,
    pub cats: CatTuning,
    pub spawning: SpawnTuning,
    pub scoring: ScoreTuning,
}

impl Tuning {
    /// Parse a (possibly partial) balance table; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning = serde_json::from_str(json)?;
        log::debug!("Loaded tuning overrides");
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Cat spawn cadence at the given score
    pub fn cat_spawn_interval_ms(&self, score: u64) -> f64 {
        let s = &self.spawning;
        (s.cat_interval_base_ms - score as f64 * s.cat_interval_per_point_ms)
            .max(s.cat_interval_min_ms)
    }

    /// Speed of a newly spawned cat at the given score
    pub fn cat_speed(&self, score: u64) -> f32 {
        self.cats.base_speed + score as f32 / self.cats.speed_score_divisor
    }
}
