//! Fixed perceptual color scale for magnitude markers

/// Viridis anchor stops as `(position, [r, g, b])`, matching Plotly's table
const VIRIDIS: [(f64, [u8; 3]); 17] = [
    (0.0, [0x44, 0x01, 0x54]),
    (16.0 / 255.0, [0x48, 0x18, 0x6a]),
    (32.0 / 255.0, [0x47, 0x2d, 0x7b]),
    (48.0 / 255.0, [0x42, 0x40, 0x86]),
    (64.0 / 255.0, [0x3b, 0x52, 0x8b]),
    (80.0 / 255.0, [0x33, 0x63, 0x8d]),
    (96.0 / 255.0, [0x2c, 0x72, 0x8e]),
    (112.0 / 255.0, [0x26, 0x82, 0x8e]),
    (128.0 / 255.0, [0x21, 0x91, 0x8c]),
    (144.0 / 255.0, [0x1f, 0xa0, 0x88]),
    (160.0 / 255.0, [0x28, 0xae, 0x80]),
    (176.0 / 255.0, [0x3f, 0xbc, 0x73]),
    (192.0 / 255.0, [0x5e, 0xc9, 0x62]),
    (208.0 / 255.0, [0x84, 0xd4, 0x4b]),
    (224.0 / 255.0, [0xad, 0xdc, 0x30]),
    (240.0 / 255.0, [0xd8, 0xe2, 0x19]),
    (1.0, [0xfd, 0xe7, 0x25]),
];

/// Linear Viridis mapping over `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    min: f64,
    max: f64,
}

impl ColorScale {
    pub fn viridis(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Scale starting at zero and ending at the largest value seen.
    /// An empty input yields `[0, 0]`.
    pub fn zero_to_max<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let max = values.into_iter().fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |m| m.max(v)))
        });
        Self::viridis(0.0, max.unwrap_or(0.0))
    }

    /// Plotly colorscale name
    pub fn name(&self) -> &'static str {
        "Viridis"
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Position of `value` in `[0, 1]`, clamped. A degenerate range maps to 0.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if !(span > 0.0) || !value.is_finite() {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    /// RGB color for `value`
    pub fn rgb(&self, value: f64) -> [u8; 3] {
        Self::sample(self.normalize(value))
    }

    /// RGB color at normalized position `t`
    pub fn sample(t: f64) -> [u8; 3] {
        let t = t.clamp(0.0, 1.0);
        let upper = VIRIDIS
            .iter()
            .position(|(pos, _)| *pos >= t)
            .unwrap_or(VIRIDIS.len() - 1);
        if upper == 0 {
            return VIRIDIS[0].1;
        }

        let (p0, c0) = VIRIDIS[upper - 1];
        let (p1, c1) = VIRIDIS[upper];
        let f = (t - p0) / (p1 - p0);
        let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * f).round() as u8;

        [lerp(c0[0], c1[0]), lerp(c0[1], c1[1]), lerp(c0[2], c1[2])]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_to_max() {
        let scale = ColorScale::zero_to_max([3.0, 5.0, 4.2]);
        assert_eq!(scale.min(), 0.0);
        assert_eq!(scale.max(), 5.0);

        let empty = ColorScale::zero_to_max(std::iter::empty());
        assert_eq!(empty.max(), 0.0);

        let negative = ColorScale::zero_to_max([-0.5, -1.2]);
        assert_eq!(negative.max(), -0.5);
    }

    #[test]
    fn test_endpoints() {
        let scale = ColorScale::viridis(0.0, 5.0);
        assert_eq!(scale.rgb(0.0), [0x44, 0x01, 0x54]);
        assert_eq!(scale.rgb(5.0), [0xfd, 0xe7, 0x25]);
        // Out of range values clamp
        assert_eq!(scale.rgb(-2.0), [0x44, 0x01, 0x54]);
        assert_eq!(scale.rgb(9.0), [0xfd, 0xe7, 0x25]);
    }

    #[test]
    fn test_midpoint_is_teal() {
        let [r, g, b] = ColorScale::viridis(0.0, 1.0).rgb(0.5);
        assert!(g > r && b > r, "expected a teal, got {r},{g},{b}");
    }

    #[test]
    fn test_degenerate_range() {
        let scale = ColorScale::viridis(0.0, 0.0);
        assert_eq!(scale.normalize(3.0), 0.0);
        assert_eq!(scale.normalize(f64::NAN), 0.0);
        assert_eq!(scale.rgb(3.0), [0x44, 0x01, 0x54]);
    }
}
