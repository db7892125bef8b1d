//! Simulation tunables
//!
//! Every constant the growth model depends on lives here. Hosts can override
//! any subset from YAML; omitted fields keep their defaults.

use rand::Rng;
use serde::Deserialize;
use std::f32::consts::PI;

/// Inclusive range of floats sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Inclusive range of counts sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CountSpan {
    pub min: usize,
    pub max: usize,
}

impl CountSpan {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Lattice cell sizing
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GridParams {
    /// Edge length of one lattice cell in pixels
    pub cell_size: f32,
}

impl Default for GridParams {
    fn default() -> Self {
        Self { cell_size: 40.0 }
    }
}

/// Scaffold construction parameters
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ScaffoldParams {
    /// Extra columns built beyond each side of the viewport
    pub padding_cells: i32,
    /// Rows built below the visible bottom edge
    pub rows_below: i32,
    /// Rows built above the visible top edge
    pub rows_above: i32,
    /// Number of hand-placed struts available before the full build
    pub manual_limit: u32,
    /// Cells added per frame during the full build
    pub cells_per_tick: usize,
    /// Upper bound on vines seeded from the bottom row
    pub initial_roots: usize,
    /// Spacing between candidate root struts
    pub root_stride: usize,
}

impl Default for ScaffoldParams {
    fn default() -> Self {
        Self {
            padding_cells: 10,
            rows_below: 1,
            rows_above: 2,
            manual_limit: 5,
            cells_per_tick: 1,
            initial_roots: 10,
            root_stride: 4,
        }
    }
}

/// Vine segment growth and branching
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct VineParams {
    /// Deepest generation allowed to exist (root = 0)
    pub max_depth: u32,
    /// Root length as a fraction of viewport height
    pub root_length: Span,
    /// Relative +/- variance applied to root lengths
    pub length_variance: f32,
    /// Growth speed in pixels per second
    pub growth_rate: Span,
    /// Children spawned when a segment finishes
    pub branch_count: CountSpan,
    /// Maximum deviation of a child from its parent's angle (radians)
    pub branch_angle: f32,
    /// Child length as a fraction of the parent's length
    pub child_length: Span,
    /// Delay between a segment finishing and its children appearing (seconds)
    pub branch_delay: Span,
    /// Maximum deviation of a root from straight up (radians)
    pub root_angle_spread: f32,
}

impl Default for VineParams {
    fn default() -> Self {
        Self {
            max_depth: 12,
            root_length: Span::new(0.1, 0.2),
            length_variance: 0.5,
            growth_rate: Span::new(30.0, 60.0),
            branch_count: CountSpan::new(2, 4),
            branch_angle: PI / 4.0,
            child_length: Span::new(0.5, 0.8),
            branch_delay: Span::new(0.05, 0.3),
            root_angle_spread: PI / 6.0,
        }
    }
}

/// Flowering and seed emission
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FlowerParams {
    /// Chance that a finished shallow segment flowers
    pub chance: f64,
    /// Deepest generation that may flower
    pub max_depth: u32,
    /// Flowers per flowering segment
    pub count: CountSpan,
    /// Anchor positions as fractions of segment length
    pub position: Span,
    /// Bloom progress added per frame
    pub progress_step: f32,
    /// Chance that a fully bloomed flower emits a seed
    pub seed_chance: f64,
    /// Delay before an emitted seed is released (seconds)
    pub emit_delay: Span,
}

impl Default for FlowerParams {
    fn default() -> Self {
        Self {
            chance: 0.3,
            max_depth: 2,
            count: CountSpan::new(3, 6),
            position: Span::new(0.3, 1.0),
            progress_step: 0.02,
            seed_chance: 0.9,
            emit_delay: Span::new(0.0, 1.5),
        }
    }
}

/// Seed flight and landing
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SeedParams {
    /// Horizontal drift in pixels per second
    pub drift: Span,
    /// Fall speed in pixels per second
    pub fall_speed: Span,
    /// Drawn radius in pixels
    pub size: Span,
    /// Chance that a landed seed grows a new root
    pub land_spawn_chance: f64,
    /// Hard limit on seed-grown roots per session
    pub population_cap: u32,
    /// Distance below ground after which a seed is retired
    pub fallback_margin: f32,
}

impl Default for SeedParams {
    fn default() -> Self {
        Self {
            drift: Span::new(-15.0, 15.0),
            fall_speed: Span::new(40.0, 90.0),
            size: Span::new(1.5, 3.0),
            land_spawn_chance: 0.25,
            population_cap: 100,
            fallback_margin: 200.0,
        }
    }
}

/// Frame loop parameters
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SchedulerParams {
    /// Largest delta fed to the simulation in one frame (seconds)
    pub max_delta: f32,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self { max_delta: 0.1 }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub grid: GridParams,
    pub scaffold: ScaffoldParams,
    pub vine: VineParams,
    pub flower: FlowerParams,
    pub seed: SeedParams,
    pub scheduler: SchedulerParams,
}

impl SimConfig {
    /// Parse from YAML string, keeping defaults for omitted fields
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        let config: SimConfig = serde_yaml::from_str(yaml)
            .map_err(|e| format!("YAML parse error: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the growth model cannot run with
    pub fn validate(&self) -> Result<(), String> {
        if !(self.grid.cell_size >= 1.0) {
            return Err(format!("cell_size must be at least 1 pixel, got {}", self.grid.cell_size));
        }
        if self.scaffold.cells_per_tick == 0 {
            return Err("cells_per_tick must be at least 1".to_string());
        }
        if self.scaffold.padding_cells < 0 || self.scaffold.rows_below < 0 || self.scaffold.rows_above < 0 {
            return Err("scaffold padding and row margins must not be negative".to_string());
        }
        if self.vine.max_depth == 0 {
            return Err("max_depth must be at least 1".to_string());
        }
        if self.seed.population_cap == 0 {
            return Err("population_cap must be at least 1".to_string());
        }

        let spans = [
            ("vine.root_length", self.vine.root_length),
            ("vine.growth_rate", self.vine.growth_rate),
            ("vine.child_length", self.vine.child_length),
            ("vine.branch_delay", self.vine.branch_delay),
            ("flower.position", self.flower.position),
            ("flower.emit_delay", self.flower.emit_delay),
            ("seed.drift", self.seed.drift),
            ("seed.fall_speed", self.seed.fall_speed),
            ("seed.size", self.seed.size),
        ];
        for (name, span) in spans {
            if span.min > span.max {
                return Err(format!("{} has min {} above max {}", name, span.min, span.max));
            }
        }
        if self.vine.branch_count.min > self.vine.branch_count.max {
            return Err("vine.branch_count has min above max".to_string());
        }
        if self.flower.count.min > self.flower.count.max {
            return Err("flower.count has min above max".to_string());
        }

        let chances = [
            ("flower.chance", self.flower.chance),
            ("flower.seed_chance", self.flower.seed_chance),
            ("seed.land_spawn_chance", self.seed.land_spawn_chance),
        ];
        for (name, p) in chances {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{} must be within [0, 1], got {}", name, p));
            }
        }

        Ok(())
    }
}
