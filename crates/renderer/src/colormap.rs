//! Fixed colormaps for field rendering.

/// A colormap defined by evenly spaced RGB stops with linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// Blue-cyan-yellow-red rainbow, used for temperature.
    Jet,
    /// Perceptually uniform purple-green-yellow, used for wind speed.
    Viridis,
}

const JET_STOPS: [[u8; 3]; 6] = [
    [0, 0, 128],
    [0, 0, 255],
    [0, 255, 255],
    [255, 255, 0],
    [255, 0, 0],
    [128, 0, 0],
];

const VIRIDIS_STOPS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [72, 40, 120],
    [62, 74, 137],
    [49, 104, 142],
    [38, 130, 142],
    [31, 158, 137],
    [53, 183, 121],
    [109, 205, 89],
    [253, 231, 37],
];

impl Colormap {
    fn stops(&self) -> &'static [[u8; 3]] {
        match self {
            Colormap::Jet => &JET_STOPS,
            Colormap::Viridis => &VIRIDIS_STOPS,
        }
    }

    /// Sample the colormap at `t` in [0, 1]. Out-of-range input is clamped.
    pub fn sample(&self, t: f32) -> [u8; 3] {
        let stops = self.stops();
        let t = t.clamp(0.0, 1.0);

        let scaled = t * (stops.len() - 1) as f32;
        let low = scaled.floor() as usize;
        let high = (low + 1).min(stops.len() - 1);
        let frac = scaled - low as f32;

        let mut rgb = [0u8; 3];
        for (i, channel) in rgb.iter_mut().enumerate() {
            let a = stops[low][i] as f32;
            let b = stops[high][i] as f32;
            *channel = (a + (b - a) * frac).round() as u8;
        }
        rgb
    }
}
