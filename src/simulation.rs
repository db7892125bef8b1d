//! Simulation controller
//!
//! Owns every piece of session state: the scaffold, the vines, the seeds, the
//! population counter, the event timeline and the random source. One instance
//! is one independent garden.

use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::animation::Timeline;
use crate::config::SimConfig;
use crate::growth::{GrowthEvent, VineGrowth, VineSegment};
use crate::lattice::{BuildProgress, LatticeGeometry, ScaffoldBuilder, Stage, Strut};
use crate::particles::{Ground, Population, Seed, SeedField};

/// Snapshot of counters for hosts and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationStats {
    pub stage: Stage,
    pub struts: usize,
    pub segments: usize,
    pub flowering: usize,
    pub seeds_airborne: usize,
    pub seeds_landed: usize,
    pub pending_events: usize,
    pub trees: u32,
}

pub struct Simulation {
    config: SimConfig,
    geometry: LatticeGeometry,
    scaffold: ScaffoldBuilder,
    vines: VineGrowth,
    seeds: SeedField,
    population: Population,
    timeline: Timeline<GrowthEvent>,
    /// Simulation seconds since the session started
    clock: f64,
    rng: StdRng,
    rng_seed: u64,
}

impl Simulation {
    /// Build a simulation from a configuration that has already been validated
    pub fn new(config: SimConfig, width: f32, height: f32) -> Self {
        debug_assert!(config.validate().is_ok(), "invalid config: {:?}", config.validate());
        Self {
            geometry: LatticeGeometry::compute(width, height, config.grid.cell_size),
            scaffold: ScaffoldBuilder::new(config.scaffold),
            vines: VineGrowth::new(config.vine, config.flower),
            seeds: SeedField::new(config.seed),
            population: Population::new(config.seed.population_cap),
            timeline: Timeline::new(),
            clock: 0.0,
            rng: StdRng::seed_from_u64(42),
            rng_seed: 42,
            config,
        }
    }

    /// Validate `config` before building the simulation
    pub fn try_new(config: SimConfig, width: f32, height: f32) -> Result<Self, String> {
        config.validate()?;
        Ok(Self::new(config, width, height))
    }

    /// Reseed the random source for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = seed;
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.scaffold.stage()
    }

    /// Geometry of the current viewport
    pub fn geometry(&self) -> &LatticeGeometry {
        &self.geometry
    }

    /// Geometry the existing structures were laid out against
    pub fn world(&self) -> &LatticeGeometry {
        self.scaffold.world().unwrap_or(&self.geometry)
    }

    pub fn struts(&self) -> &[Strut] {
        self.scaffold.struts()
    }

    pub fn segments(&self) -> &[VineSegment] {
        self.vines.segments()
    }

    pub fn seeds(&self) -> &[Seed] {
        self.seeds.seeds()
    }

    pub fn manual_count(&self) -> u32 {
        self.scaffold.manual_count()
    }

    /// Roots grown from landed seeds
    pub fn trees(&self) -> u32 {
        self.population.count()
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Place the next hand-specified strut. Returns the updated counter.
    pub fn add_manual_strut(&mut self) -> u32 {
        self.scaffold.add_manual_strut(&self.geometry)
    }

    /// Start the full lattice build. A no-op while one is running or after it finished.
    pub fn build_full_lattice(&mut self) -> bool {
        self.scaffold.start_full_build(&self.geometry)
    }

    /// Recompute the lattice for a new viewport. Existing struts and vines keep
    /// their coordinates.
    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.geometry = LatticeGeometry::compute(width, height, self.config.grid.cell_size);
        log::debug!(
            "viewport resized to {}x{}: {} rows x {} cols",
            width,
            height,
            self.geometry.rows,
            self.geometry.cols
        );
    }

    /// Advance everything by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.clock += dt as f64;

        if self.scaffold.is_building()
            && self.scaffold.advance(self.config.scaffold.cells_per_tick) == BuildProgress::Completed
        {
            self.seed_initial_vines();
        }

        while let Some(event) = self.timeline.pop_due(self.clock) {
            match event {
                GrowthEvent::SpawnBranches { segment } => {
                    self.vines.spawn_branches(segment, &mut self.rng);
                }
                GrowthEvent::EmitSeed { position } => {
                    self.seeds.emit(position, &mut self.rng);
                }
            }
        }
        self.vines.commit();

        self.vines.update_all(dt, self.clock, &mut self.rng, &mut self.timeline);

        let world = *self.world();
        let ground = Ground {
            y: world.ground_y(),
            min_x: 0.0,
            max_x: world.width,
        };
        let roots = self.seeds.update_all(
            dt,
            &ground,
            self.scaffold.struts(),
            &mut self.population,
            &mut self.rng,
        );
        for point in roots {
            self.vines.plant_root(point, world.height, &mut self.rng);
        }
        self.vines.commit();
    }

    fn seed_initial_vines(&mut self) {
        let height = self.world().height;
        let points = self.scaffold.root_candidates(&mut self.rng);
        for point in &points {
            self.vines.plant_root(*point, height, &mut self.rng);
        }
        log::info!("stage: building -> vine-growing, {} initial vines", points.len());
    }

    /// Whether another frame is needed
    pub fn should_continue(&self) -> bool {
        self.stage() == Stage::Building
            || !self.vines.is_empty()
            || self.seeds.any_airborne()
            || !self.timeline.is_empty()
    }

    /// Drop everything and return to the initial stage
    pub fn reset(&mut self) {
        self.scaffold.reset();
        self.vines.clear();
        self.seeds.clear();
        self.population.reset();
        self.timeline.clear();
        self.clock = 0.0;
        self.rng = StdRng::seed_from_u64(self.rng_seed);
        log::info!("simulation reset");
    }

    pub fn stats(&self) -> SimulationStats {
        SimulationStats {
            stage: self.stage(),
            struts: self.scaffold.struts().len(),
            segments: self.vines.len(),
            flowering: self.vines.flowering_count(),
            seeds_airborne: self.seeds.airborne_count(),
            seeds_landed: self.seeds.landed_count(),
            pending_events: self.timeline.len(),
            trees: self.population.count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FlowerParams, SeedParams, VineParams};
    use crate::math::Vec2;

    /// Default tunables with a shallow depth limit so long runs stay small
    fn reference() -> Simulation {
        let config = SimConfig {
            vine: VineParams {
                max_depth: 4,
                ..Default::default()
            },
            ..Default::default()
        };
        Simulation::new(config, 800.0, 600.0).with_seed(7)
    }

    fn finish_build(sim: &mut Simulation) {
        sim.build_full_lattice();
        let mut guard = 0;
        while sim.stage() == Stage::Building {
            sim.step(1.0 / 60.0);
            guard += 1;
            assert!(guard < 10_000);
        }
    }

    #[test]
    fn test_scenario_manual_then_noop() {
        let mut sim = reference();
        assert_eq!(sim.geometry().rows, 15);
        assert_eq!(sim.geometry().cols, 20);
        assert_eq!(sim.stage(), Stage::Initial);
        assert!(!sim.should_continue());

        for expected in 1..=5 {
            assert_eq!(sim.add_manual_strut(), expected);
        }
        assert_eq!(sim.struts().len(), 5);
        assert_eq!(sim.add_manual_strut(), 5);
        assert_eq!(sim.struts().len(), 5);
        assert!(sim.should_continue());
    }

    #[test]
    fn test_full_build_transitions_once() {
        let mut sim = reference();
        assert!(sim.build_full_lattice());
        assert!(!sim.build_full_lattice());

        let mut transitions = 0;
        let mut previous = sim.stage();
        for _ in 0..2_000 {
            sim.step(1.0 / 60.0);
            if previous == Stage::Building && sim.stage() == Stage::VineGrowing {
                transitions += 1;
            }
            previous = sim.stage();
        }
        assert_eq!(transitions, 1);
        assert_eq!(sim.stage(), Stage::VineGrowing);
        assert!(!sim.build_full_lattice());

        let min_x = sim.struts().iter().map(|s| s.start.x).fold(f32::MAX, f32::min);
        let max_x = sim.struts().iter().map(|s| s.end.x).fold(f32::MIN, f32::max);
        assert!(min_x <= -400.0);
        assert!(max_x >= 1200.0);
    }

    #[test]
    fn test_build_seeds_initial_vines() {
        let mut sim = reference();
        finish_build(&mut sim);
        let roots = sim.segments().iter().filter(|s| s.depth == 0).count();
        assert!(roots >= 1 && roots <= 10);
        assert_eq!(sim.trees(), 0);
        assert!(sim.should_continue());
    }

    #[test]
    fn test_long_run_invariants() {
        let mut sim = reference();
        finish_build(&mut sim);

        let mut landed_before: Vec<bool> = Vec::new();
        for _ in 0..1_200 {
            sim.step(1.0 / 30.0);

            let landed: Vec<bool> = sim.seeds().iter().map(|s| s.landed).collect();
            for (was, now) in landed_before.iter().zip(&landed) {
                assert!(!*was || *now, "landed seed reverted");
            }
            landed_before = landed;
        }

        for segment in sim.segments() {
            assert!(segment.depth <= 4);
            if let Some(parent) = segment.parent {
                assert_eq!(segment.depth, sim.segments()[parent].depth + 1);
            }
            if segment.flowering.is_flowering {
                assert!((3..=6).contains(&segment.flowering.flowers.len()));
                assert!(segment.depth <= 2);
            }
        }
        assert!(sim.trees() <= 100);
    }

    #[test]
    fn test_population_cap_across_landings() {
        let config = SimConfig {
            seed: SeedParams {
                land_spawn_chance: 1.0,
                population_cap: 100,
                ..Default::default()
            },
            flower: FlowerParams {
                chance: 0.0,
                ..Default::default()
            },
            vine: VineParams {
                max_depth: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut sim = Simulation::new(config, 800.0, 600.0).with_seed(1);
        for i in 0..300 {
            sim.seeds.emit(Vec2::new(1.0 + i as f32 * 2.5, 0.0), &mut sim.rng);
        }
        for _ in 0..2_000 {
            sim.step(0.05);
        }
        assert_eq!(sim.trees(), 100);
        assert_eq!(sim.stats().seeds_airborne, 0);
        assert_eq!(sim.segments().iter().filter(|s| s.depth == 0).count(), 100);
    }

    #[test]
    fn test_seed_lands_on_scaffold_strut() {
        let mut sim = reference();
        finish_build(&mut sim);

        // Directly above the horizontal strut of row 5 (y = 200), falling straight down
        let x = 205.0;
        sim.seeds.push(Seed::new(Vec2::new(x, 190.0), Vec2::new(0.0, 50.0), 2.0));
        let index = sim.seeds().len() - 1;
        for _ in 0..10 {
            sim.step(0.05);
        }
        let seed = &sim.seeds()[index];
        assert!(seed.landed);
        assert_eq!(seed.position.y, 200.0);
        assert_eq!(seed.position.x, x);
    }

    #[test]
    fn test_zero_delta_freezes_growth() {
        let mut sim = reference();
        finish_build(&mut sim);
        for _ in 0..120 {
            sim.step(1.0 / 60.0);
        }

        let clock = sim.clock();
        let lengths: Vec<f32> = sim.segments().iter().map(|s| s.current_length).collect();
        sim.step(0.0);

        assert_eq!(sim.clock(), clock);
        let after: Vec<f32> = sim.segments().iter().map(|s| s.current_length).collect();
        assert_eq!(lengths, after[..lengths.len()].to_vec());
        if let Some(due) = sim.timeline.next_due() {
            assert!(due > clock);
        }
    }

    #[test]
    fn test_try_new_rejects_invalid_config() {
        let config = SimConfig {
            flower: FlowerParams {
                chance: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = Simulation::try_new(config, 800.0, 600.0).err();
        assert!(err.is_some_and(|e| e.contains("flower.chance")));
        assert!(Simulation::try_new(SimConfig::default(), 800.0, 600.0).is_ok());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid config")]
    fn test_new_asserts_valid_config() {
        let config = SimConfig {
            seed: SeedParams {
                land_spawn_chance: -0.1,
                ..Default::default()
            },
            ..Default::default()
        };
        let _ = Simulation::new(config, 800.0, 600.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut sim = reference();
        finish_build(&mut sim);
        for _ in 0..300 {
            sim.step(1.0 / 30.0);
        }
        sim.reset();

        let stats = sim.stats();
        assert_eq!(stats.stage, Stage::Initial);
        assert_eq!(stats.struts, 0);
        assert_eq!(stats.segments, 0);
        assert_eq!(stats.pending_events, 0);
        assert_eq!(stats.trees, 0);
        assert_eq!(sim.clock(), 0.0);
        assert!(!sim.should_continue());
        assert!(sim.build_full_lattice());
    }

    #[test]
    fn test_resize_keeps_existing_geometry() {
        let mut sim = reference();
        for _ in 0..5 {
            sim.add_manual_strut();
        }
        let before = sim.struts().to_vec();
        sim.on_resize(1600.0, 1200.0);

        assert_eq!(sim.geometry().cols, 40);
        assert_eq!(sim.struts(), before.as_slice());
        assert_eq!(sim.world().width, 800.0);
    }

    #[test]
    fn test_same_seed_same_garden() {
        let run = || {
            let mut sim = reference();
            finish_build(&mut sim);
            for _ in 0..500 {
                sim.step(1.0 / 30.0);
            }
            sim.stats()
        };
        assert_eq!(run(), run());
    }
}
