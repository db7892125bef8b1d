//! Easing functions for growth animations

/// Easing function types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    /// Smooth ease-in-out
    EaseInOut,
    /// Flower opening: quick bud swell, slow middle, quick final unfurl
    Bloom,
}

/// Apply easing function to a value t in range [0, 1]
pub fn ease(t: f32, easing: Easing) -> f32 {
    let t = t.clamp(0.0, 1.0);

    match easing {
        Easing::EaseInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
            }
        }
        Easing::Bloom => {
            // Three linear bands: 0..1/3 -> 0..0.5, 1/3..2/3 -> 0.5..0.6, 2/3..1 -> 0.6..1
            const THIRD: f32 = 1.0 / 3.0;
            if t < THIRD {
                t * 1.5
            } else if t < 2.0 * THIRD {
                0.5 + (t - THIRD) * 0.3
            } else {
                0.6 + (t - 2.0 * THIRD) * 1.2
            }
        }
    }
}
