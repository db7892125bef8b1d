use rand::Rng;
use std::f32::consts::FRAC_PI_2;
use crate::animation::Timeline;
use crate::config::{FlowerParams, VineParams};
use crate::math::Vec2;

/// Deferred growth work, fired on simulation time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrowthEvent {
    /// A finished segment sprouts its children
    SpawnBranches { segment: usize },
    /// A bloomed flower releases a seed
    EmitSeed { position: Vec2 },
}

/// A flower anchored part way along a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flower {
    /// Anchor as a fraction of the segment's full length
    pub fraction: f32,
    pub position: Vec2,
    /// Bloom progress (0.0 = bud, 1.0 = fully open)
    pub progress: f32,
}

impl Flower {
    pub fn is_bloomed(&self) -> bool {
        self.progress >= 1.0
    }
}

/// Flower sub-state of a segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flowering {
    pub is_flowering: bool,
    pub flowers: Vec<Flower>,
    /// Drives the flower hue (0.0 to 1.0)
    pub color_seed: f32,
}

impl Flowering {
    pub fn is_fully_bloomed(&self) -> bool {
        self.is_flowering && self.flowers.iter().all(Flower::is_bloomed)
    }
}

/// One straight, growing piece of vine
#[derive(Debug, Clone, PartialEq)]
pub struct VineSegment {
    pub start: Vec2,
    /// Direction in screen space (radians, -PI/2 is up)
    pub angle: f32,
    pub max_length: f32,
    pub current_length: f32,
    /// Pixels per second
    pub growth_rate: f32,
    /// Generation (0 = root)
    pub depth: u32,
    pub finished: bool,
    pub flowering: Flowering,
    pub has_attempted_spawn: bool,
    pub parent: Option<usize>,
}

impl VineSegment {
    pub fn new(start: Vec2, angle: f32, max_length: f32, growth_rate: f32, depth: u32) -> Self {
        Self {
            start,
            angle,
            max_length: max_length.max(0.0),
            current_length: 0.0,
            growth_rate,
            depth,
            finished: false,
            flowering: Flowering::default(),
            has_attempted_spawn: false,
            parent: None,
        }
    }

    /// Current growing tip
    pub fn tip(&self) -> Vec2 {
        self.start.advance(self.angle, self.current_length)
    }

    /// Point at `fraction` of the full length
    pub fn point_at(&self, fraction: f32) -> Vec2 {
        self.start.advance(self.angle, self.max_length * fraction)
    }
}

/// Owns every vine segment and advances their growth
#[derive(Debug, Clone)]
pub struct VineGrowth {
    pub params: VineParams,
    pub flower_params: FlowerParams,
    segments: Vec<VineSegment>,
    /// Children spawned during a pass, merged by `commit`
    pending: Vec<VineSegment>,
}

impl VineGrowth {
    pub fn new(params: VineParams, flower_params: FlowerParams) -> Self {
        Self {
            params,
            flower_params,
            segments: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn segments(&self) -> &[VineSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.pending.is_empty()
    }

    pub fn max_depth(&self) -> u32 {
        self.segments.iter().map(|s| s.depth).max().unwrap_or(0)
    }

    pub fn flowering_count(&self) -> usize {
        self.segments.iter().filter(|s| s.flowering.is_flowering).count()
    }

    /// Start a new root pointing roughly upward. Its length is a fraction of
    /// the viewport height with +/- variance.
    pub fn plant_root<R: Rng + ?Sized>(&mut self, start: Vec2, viewport_height: f32, rng: &mut R) {
        let spread = self.params.root_angle_spread;
        let angle = -FRAC_PI_2 + if spread > 0.0 { rng.gen_range(-spread..=spread) } else { 0.0 };

        let base = self.params.root_length.sample(rng) * viewport_height;
        let variance = self.params.length_variance.abs();
        let jitter = if variance > 0.0 { rng.gen_range(-variance..=variance) } else { 0.0 };
        let growth_rate = self.params.growth_rate.sample(rng);

        self.pending.push(VineSegment::new(start, angle, base * (1.0 + jitter), growth_rate, 0));
    }

    /// Create the children of a finished segment. Returns how many were added.
    pub fn spawn_branches<R: Rng + ?Sized>(&mut self, parent: usize, rng: &mut R) -> usize {
        let Some(segment) = self.segments.get(parent) else {
            return 0;
        };
        if segment.depth >= self.params.max_depth {
            return 0;
        }

        let origin = segment.tip();
        let (angle, length, depth) = (segment.angle, segment.max_length, segment.depth);
        let count = self.params.branch_count.sample(rng);
        let spread = self.params.branch_angle;

        for _ in 0..count {
            let deviation = if spread > 0.0 { rng.gen_range(-spread..=spread) } else { 0.0 };
            let mut child = VineSegment::new(
                origin,
                angle + deviation,
                length * self.params.child_length.sample(rng),
                self.params.growth_rate.sample(rng),
                depth + 1,
            );
            child.parent = Some(parent);
            self.pending.push(child);
        }
        count
    }

    /// Move segments created since the last pass into the live collection
    pub fn commit(&mut self) -> usize {
        let added = self.pending.len();
        self.segments.append(&mut self.pending);
        added
    }

    /// Advance one segment by `dt` seconds at simulation time `now`
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        dt: f32,
        now: f64,
        rng: &mut R,
        timeline: &mut Timeline<GrowthEvent>,
    ) {
        let vine = self.params;
        let flower = self.flower_params;
        let Some(segment) = self.segments.get_mut(index) else {
            return;
        };

        if !segment.finished {
            segment.current_length += segment.growth_rate * dt.max(0.0);
            if segment.current_length >= segment.max_length {
                segment.current_length = segment.max_length;
                segment.finished = true;

                if segment.depth < vine.max_depth {
                    let delay = vine.branch_delay.sample(rng) as f64;
                    timeline.schedule(now + delay, GrowthEvent::SpawnBranches { segment: index });
                }

                if segment.depth <= flower.max_depth && rng.gen_bool(flower.chance) {
                    begin_flowering(segment, &flower, rng);
                }
            }
        }

        if !segment.flowering.is_flowering {
            return;
        }

        // Bloom advances per frame, independent of dt
        for f in &mut segment.flowering.flowers {
            f.progress = (f.progress + flower.progress_step).min(1.0);
        }

        if segment.flowering.is_fully_bloomed() && !segment.has_attempted_spawn {
            segment.has_attempted_spawn = true;
            for f in &segment.flowering.flowers {
                if rng.gen_bool(flower.seed_chance) {
                    let delay = flower.emit_delay.sample(rng) as f64;
                    timeline.schedule(now + delay, GrowthEvent::EmitSeed { position: f.position });
                }
            }
        }
    }

    /// Advance every live segment
    pub fn update_all<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        now: f64,
        rng: &mut R,
        timeline: &mut Timeline<GrowthEvent>,
    ) {
        for index in 0..self.segments.len() {
            self.update(index, dt, now, rng, timeline);
        }
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.pending.clear();
    }
}

fn begin_flowering<R: Rng + ?Sized>(segment: &mut VineSegment, params: &FlowerParams, rng: &mut R) {
    let count = params.count.sample(rng);
    let flowers = (0..count)
        .map(|_| {
            let fraction = params.position.sample(rng);
            Flower {
                fraction,
                position: segment.point_at(fraction),
                progress: 0.0,
            }
        })
        .collect();

    segment.flowering = Flowering {
        is_flowering: true,
        flowers,
        color_seed: rng.gen::<f32>(),
    };
}
