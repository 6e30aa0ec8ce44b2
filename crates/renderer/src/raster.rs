//! Field rasterization: clamp, colorize, encode.

use snap_common::SnapResult;

use crate::colormap::Colormap;
use crate::png;

/// Map a field to RGBA pixels.
///
/// Values are clamped to `[min, max]` before color lookup; NaN points become
/// fully transparent pixels.
pub fn colorize(values: &[f32], min: f32, max: f32, colormap: Colormap) -> Vec<u8> {
    let range = max - min;
    let mut pixels = Vec::with_capacity(values.len() * 4);

    for &value in values {
        if value.is_nan() {
            pixels.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }

        let t = if range.abs() < f32::EPSILON {
            0.5
        } else {
            ((value.clamp(min, max)) - min) / range
        };

        let [r, g, b] = colormap.sample(t);
        pixels.extend_from_slice(&[r, g, b, 255]);
    }

    pixels
}

/// Render a 2-D field straight to PNG bytes, one pixel per grid point.
pub fn encode_field_png(
    values: &[f32],
    width: usize,
    height: usize,
    min: f32,
    max: f32,
    colormap: Colormap,
) -> SnapResult<Vec<u8>> {
    let pixels = colorize(values, min, max, colormap);
    png::create_png_auto(&pixels, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_applied_before_lookup() {
        let pixels = colorize(&[-100.0, -30.0, 40.0, 100.0], -30.0, 40.0, Colormap::Jet);

        // Below-range and min-range values get the same color
        assert_eq!(&pixels[0..4], &pixels[4..8]);
        // Above-range and max-range values get the same color
        assert_eq!(&pixels[8..12], &pixels[12..16]);
        // Min and max colors differ
        assert_ne!(&pixels[0..4], &pixels[8..12]);
    }

    #[test]
    fn test_nan_is_transparent() {
        let pixels = colorize(&[f32::NAN, 0.0], 0.0, 30.0, Colormap::Viridis);

        assert_eq!(&pixels[0..4], &[0, 0, 0, 0]);
        assert_eq!(pixels[7], 255);
    }

    #[test]
    fn test_degenerate_range() {
        // min == max must not divide by zero
        let pixels = colorize(&[5.0, 5.0], 5.0, 5.0, Colormap::Jet);
        assert_eq!(pixels.len(), 8);
        assert_eq!(pixels[3], 255);
    }

    #[test]
    fn test_png_output_well_formed() {
        let values: Vec<f32> = (0..64).map(|i| i as f32).collect();
        let data = encode_field_png(&values, 8, 8, 0.0, 63.0, Colormap::Viridis).unwrap();

        // PNG signature
        assert_eq!(&data[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
        // First chunk is IHDR with our dimensions
        assert_eq!(&data[12..16], b"IHDR");
        assert_eq!(u32::from_be_bytes(data[16..20].try_into().unwrap()), 8);
        assert_eq!(u32::from_be_bytes(data[20..24].try_into().unwrap()), 8);
    }
}
