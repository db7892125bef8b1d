use super::color::{hsv_to_rgb, Color};
use super::surface::Surface;
use crate::animation::{ease, Easing};
use crate::math::Vec2;
use crate::simulation::Simulation;

/// Colors and sizes of the drawn garden
#[derive(Debug, Clone, Copy)]
pub struct RenderStyle {
    pub background: Color,
    pub strut: Color,
    pub strut_width: f32,
    pub vine: Color,
    /// Line width of a root; deeper segments get thinner
    pub vine_width: f32,
    pub vine_taper: f32,
    pub min_vine_width: f32,
    pub flower_radius: f32,
    pub seed: Color,
    /// Segments shorter than this on screen are not drawn
    pub min_segment_px: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: Color::rgba(0.04, 0.05, 0.06, 1.0),
            strut: Color::rgba(0.55, 0.5, 0.42, 0.6),
            strut_width: 1.5,
            vine: Color::rgba(0.25, 0.62, 0.3, 0.95),
            vine_width: 3.0,
            vine_taper: 0.2,
            min_vine_width: 0.5,
            flower_radius: 5.0,
            seed: Color::rgba(0.85, 0.75, 0.45, 1.0),
            min_segment_px: 1.0,
        }
    }
}

/// Maps world coordinates onto the surface. Structures keep the viewport they
/// were built for, so a resized surface stretches them.
#[derive(Debug, Clone, Copy)]
struct Projection {
    sx: f32,
    sy: f32,
    width: f32,
    height: f32,
}

impl Projection {
    fn new(world_width: f32, world_height: f32, width: f32, height: f32) -> Self {
        let ratio = |surface: f32, world: f32| if world > 0.0 { surface / world } else { 1.0 };
        Self {
            sx: ratio(width, world_width),
            sy: ratio(height, world_height),
            width,
            height,
        }
    }

    fn apply(&self, p: Vec2) -> Vec2 {
        p.scale_xy(self.sx, self.sy)
    }

    fn line_visible(&self, a: Vec2, b: Vec2) -> bool {
        a.x.max(b.x) >= 0.0 && a.x.min(b.x) <= self.width && a.y.max(b.y) >= 0.0 && a.y.min(b.y) <= self.height
    }
}

/// Draws the current simulation state
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    pub style: RenderStyle,
}

impl Renderer {
    pub fn draw<S: Surface + ?Sized>(&self, sim: &Simulation, surface: &mut S) {
        let style = &self.style;
        let (width, height) = surface.size();
        let world = sim.world();
        let projection = Projection::new(world.width, world.height, width, height);

        surface.clear(style.background);

        for strut in sim.struts() {
            let (a, b) = (projection.apply(strut.start), projection.apply(strut.end));
            if projection.line_visible(a, b) {
                surface.line(a, b, style.strut_width, style.strut);
            }
        }

        // One path per depth, since depth alone decides the line width
        let mut buckets: Vec<Vec<(Vec2, Vec2)>> = Vec::new();
        for segment in sim.segments() {
            if segment.current_length <= 0.0 {
                continue;
            }
            let (a, b) = (projection.apply(segment.start), projection.apply(segment.tip()));
            if a.distance(&b) < style.min_segment_px || !projection.line_visible(a, b) {
                continue;
            }
            let depth = segment.depth as usize;
            if buckets.len() <= depth {
                buckets.resize_with(depth + 1, Vec::new);
            }
            buckets[depth].push((a, b));
        }
        for (depth, bucket) in buckets.iter().enumerate() {
            let width = (style.vine_width - depth as f32 * style.vine_taper).max(style.min_vine_width);
            surface.line_batch(bucket, width, style.vine);
        }

        for segment in sim.segments().iter().filter(|s| s.flowering.is_flowering) {
            let hue = segment.flowering.color_seed;
            let color = hsv_to_rgb(hue, 0.55, 1.0);
            for flower in &segment.flowering.flowers {
                let radius = style.flower_radius * ease(flower.progress, Easing::Bloom);
                if radius <= 0.0 {
                    continue;
                }
                let alpha = 0.4 + 0.6 * ease(flower.progress, Easing::EaseInOut);
                surface.circle(projection.apply(flower.position), radius, color.with_alpha(alpha));
            }
        }

        for seed in sim.seeds().iter().filter(|s| !s.landed) {
            surface.circle(projection.apply(seed.position), seed.size, style.seed);
        }
    }
}
