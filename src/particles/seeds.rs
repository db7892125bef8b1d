//! Falling seeds
//!
//! Seeds drift down at a constant velocity until they cross a horizontal
//! strut or reach the ground. A landing may grow a new vine, subject to the
//! session-wide population cap.

use rand::Rng;
use crate::config::SeedParams;
use crate::lattice::Strut;
use crate::math::Vec2;

/// A single seed particle
#[derive(Debug, Clone, PartialEq)]
pub struct Seed {
    pub position: Vec2,
    pub prev_y: f32,
    /// Pixels per second, fixed at creation
    pub velocity: Vec2,
    pub landed: bool,
    pub size: f32,
}

/// Where a seed came to rest
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Landing {
    Ground(Vec2),
    Strut(Vec2),
    /// Fell past the ground without touching anything
    Lost,
}

/// Floor plane that stops seeds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ground {
    pub y: f32,
    pub min_x: f32,
    pub max_x: f32,
}

impl Seed {
    pub fn new(position: Vec2, velocity: Vec2, size: f32) -> Self {
        Self {
            position,
            prev_y: position.y,
            velocity,
            landed: false,
            size,
        }
    }

    /// Advance by `dt` seconds and test for landing. A landed seed never moves again.
    pub fn update(&mut self, dt: f32, ground: &Ground, struts: &[Strut], fallback_margin: f32) -> Option<Landing> {
        if self.landed {
            return None;
        }

        self.prev_y = self.position.y;
        self.position = self.position + self.velocity.scale(dt.max(0.0));

        let over_ground = self.position.x >= ground.min_x && self.position.x <= ground.max_x;
        if over_ground && self.position.y >= ground.y {
            self.position.y = ground.y;
            self.landed = true;
            return Some(Landing::Ground(self.position));
        }

        if let Some(strut_y) = self.crossed_strut(struts) {
            self.position.y = strut_y;
            self.landed = true;
            return Some(Landing::Strut(self.position));
        }

        if self.position.y > ground.y + fallback_margin {
            self.landed = true;
            return Some(Landing::Lost);
        }

        None
    }

    /// Uppermost horizontal strut crossed this frame beneath the seed's x
    fn crossed_strut(&self, struts: &[Strut]) -> Option<f32> {
        let (prev_y, y, x) = (self.prev_y, self.position.y, self.position.x);
        struts
            .iter()
            .filter(|s| s.is_horizontal() && s.spans_x(x))
            .map(|s| s.start.y)
            .filter(|&strut_y| prev_y < strut_y && strut_y <= y)
            .min_by(|a, b| a.total_cmp(b))
    }
}

/// Session-wide limit on vines grown from seeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Population {
    count: u32,
    cap: u32,
}

impl Population {
    pub fn new(cap: u32) -> Self {
        Self { count: 0, cap }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_full(&self) -> bool {
        self.count >= self.cap
    }

    /// Reserve one slot; false once the cap is reached
    pub fn try_claim(&mut self) -> bool {
        if self.is_full() {
            return false;
        }
        self.count += 1;
        true
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}

/// All seeds of a session
#[derive(Debug, Clone)]
pub struct SeedField {
    pub params: SeedParams,
    seeds: Vec<Seed>,
}

impl SeedField {
    pub fn new(params: SeedParams) -> Self {
        Self {
            params,
            seeds: Vec::new(),
        }
    }

    pub fn seeds(&self) -> &[Seed] {
        &self.seeds
    }

    pub fn airborne(&self) -> impl Iterator<Item = &Seed> {
        self.seeds.iter().filter(|s| !s.landed)
    }

    pub fn airborne_count(&self) -> usize {
        self.airborne().count()
    }

    pub fn landed_count(&self) -> usize {
        self.seeds.len() - self.airborne_count()
    }

    pub fn any_airborne(&self) -> bool {
        self.seeds.iter().any(|s| !s.landed)
    }

    /// Release a seed at `position` with randomized drift and fall speed
    pub fn emit<R: Rng + ?Sized>(&mut self, position: Vec2, rng: &mut R) {
        let velocity = Vec2::new(self.params.drift.sample(rng), self.params.fall_speed.sample(rng));
        let size = self.params.size.sample(rng);
        self.seeds.push(Seed::new(position, velocity, size));
    }

    pub fn push(&mut self, seed: Seed) {
        self.seeds.push(seed);
    }

    /// Advance every airborne seed. Returns the points where new vines should root.
    pub fn update_all<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        ground: &Ground,
        struts: &[Strut],
        population: &mut Population,
        rng: &mut R,
    ) -> Vec<Vec2> {
        let mut roots = Vec::new();
        let margin = self.params.fallback_margin;
        let chance = self.params.land_spawn_chance;

        for seed in self.seeds.iter_mut().filter(|s| !s.landed) {
            let point = match seed.update(dt, ground, struts, margin) {
                Some(Landing::Ground(p)) | Some(Landing::Strut(p)) => p,
                Some(Landing::Lost) | None => continue,
            };

            if rng.gen_bool(chance) && population.try_claim() {
                roots.push(point);
                if population.is_full() {
                    log::info!("seed population cap of {} reached", population.count());
                }
            }
        }
        roots
    }

    pub fn clear(&mut self) {
        self.seeds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{LatticeGeometry, Orientation, StrutKey};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const GROUND: Ground = Ground {
        y: 600.0,
        min_x: 0.0,
        max_x: 800.0,
    };

    fn horizontal(row: i32, col: i32) -> Strut {
        let geo = LatticeGeometry::compute(800.0, 600.0, 40.0);
        Strut::from_key(StrutKey::new(row, col, Orientation::Horizontal), &geo)
    }

    fn falling(x: f32, y: f32) -> Seed {
        Seed::new(Vec2::new(x, y), Vec2::new(0.0, 100.0), 2.0)
    }

    #[test]
    fn test_lands_on_strut_not_ground() {
        // Strut at y = 400 spanning x 200..240
        let struts = vec![horizontal(10, 5)];
        let mut seed = falling(220.0, 380.0);

        assert_eq!(seed.update(0.1, &GROUND, &struts, 200.0), None);
        assert_eq!(seed.position.y, 390.0);

        let landing = seed.update(0.1, &GROUND, &struts, 200.0);
        assert_eq!(landing, Some(Landing::Strut(Vec2::new(220.0, 400.0))));
        assert!(seed.landed);
    }

    #[test]
    fn test_misses_strut_outside_span() {
        let struts = vec![horizontal(10, 5)];
        let mut seed = falling(300.0, 395.0);
        assert_eq!(seed.update(0.1, &GROUND, &struts, 200.0), None);
        assert!(!seed.landed);
    }

    #[test]
    fn test_ignores_vertical_struts() {
        let geo = LatticeGeometry::compute(800.0, 600.0, 40.0);
        let struts = vec![Strut::from_key(StrutKey::new(10, 5, Orientation::Vertical), &geo)];
        let mut seed = falling(200.0, 395.0);
        assert_eq!(seed.update(0.1, &GROUND, &struts, 200.0), None);
    }

    #[test]
    fn test_starting_on_strut_does_not_land() {
        let struts = vec![horizontal(10, 5)];
        let mut seed = falling(220.0, 400.0);
        assert_eq!(seed.update(0.1, &GROUND, &struts, 200.0), None);
    }

    #[test]
    fn test_picks_uppermost_crossed_strut() {
        let struts = vec![horizontal(11, 5), horizontal(10, 5)];
        let mut seed = falling(220.0, 390.0);
        let landing = seed.update(1.0, &GROUND, &struts, 200.0);
        assert_eq!(landing, Some(Landing::Strut(Vec2::new(220.0, 400.0))));
    }

    #[test]
    fn test_ground_landing_and_terminal_state() {
        let mut seed = falling(100.0, 595.0);
        let landing = seed.update(0.1, &GROUND, &[], 200.0);
        assert_eq!(landing, Some(Landing::Ground(Vec2::new(100.0, 600.0))));

        let snapshot = seed.clone();
        for _ in 0..10 {
            assert_eq!(seed.update(0.1, &GROUND, &[], 200.0), None);
        }
        assert_eq!(seed, snapshot);
    }

    #[test]
    fn test_offscreen_seed_is_retired() {
        let mut seed = falling(-50.0, 700.0);
        assert_eq!(seed.update(0.1, &GROUND, &[], 200.0), None);
        let landing = seed.update(2.0, &GROUND, &[], 200.0);
        assert_eq!(landing, Some(Landing::Lost));
        assert!(seed.landed);
    }

    #[test]
    fn test_population_cap_holds() {
        let mut rng = StdRng::seed_from_u64(11);
        let params = SeedParams {
            land_spawn_chance: 1.0,
            population_cap: 100,
            ..Default::default()
        };
        let mut field = SeedField::new(params);
        let mut population = Population::new(params.population_cap);

        for i in 0..250 {
            field.push(falling(i as f32 * 3.0, 590.0));
        }
        let roots = field.update_all(1.0, &GROUND, &[], &mut population, &mut rng);

        assert_eq!(roots.len(), 100);
        assert_eq!(population.count(), 100);
        assert_eq!(field.landed_count(), 250);
        assert!(!field.any_airborne());

        field.push(falling(10.0, 590.0));
        let more = field.update_all(1.0, &GROUND, &[], &mut population, &mut rng);
        assert!(more.is_empty());
        assert_eq!(population.count(), 100);
    }

    #[test]
    fn test_emit_uses_configured_ranges() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut field = SeedField::new(SeedParams::default());
        for _ in 0..20 {
            field.emit(Vec2::new(10.0, 10.0), &mut rng);
        }
        for seed in field.seeds() {
            assert!(!seed.landed);
            assert!(seed.velocity.y >= 40.0 && seed.velocity.y <= 90.0);
            assert!(seed.velocity.x >= -15.0 && seed.velocity.x <= 15.0);
        }
        assert_eq!(field.airborne_count(), 20);
    }
}
