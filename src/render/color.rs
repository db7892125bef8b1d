/// RGBA color with components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    /// CSS `rgba()` string for canvas styles
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {:.3})",
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            self.a.clamp(0.0, 1.0)
        )
    }
}

/// HSV to RGB conversion, all components in [0, 1]
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Color {
    let h = h.rem_euclid(1.0) * 6.0;
    let i = h.floor() as i32;
    let f = h - h.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match i % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Color::rgba(r, g, b, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_to_rgb() {
        let red = hsv_to_rgb(0.0, 1.0, 1.0);
        assert!((red.r - 1.0).abs() < 0.01);
        assert!(red.g.abs() < 0.01);
        assert!(red.b.abs() < 0.01);

        let green = hsv_to_rgb(1.0 / 3.0, 1.0, 1.0);
        assert!(green.r.abs() < 0.01);
        assert!((green.g - 1.0).abs() < 0.01);

        // Hue wraps around
        let wrapped = hsv_to_rgb(1.0, 1.0, 1.0);
        assert!((wrapped.r - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_css_string() {
        assert_eq!(Color::rgba(1.0, 0.5, 0.0, 0.25).to_css(), "rgba(255, 128, 0, 0.250)");
        assert_eq!(Color::rgba(2.0, -1.0, 0.0, 5.0).to_css(), "rgba(255, 0, 0, 1.000)");
    }
}
