//! PNG encoding for RGBA image data.
//!
//! Two encoding modes:
//! - **Indexed (color type 3)** when the image has ≤256 unique colors, with
//!   a tRNS chunk carrying per-entry alpha.
//! - **RGBA (color type 6)** as the fallback.
//!
//! `create_png_auto` picks between them.

use std::collections::HashMap;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use snap_common::{SnapError, SnapResult};

/// Maximum palette entries for indexed PNG.
const MAX_PALETTE_SIZE: usize = 256;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Create a PNG with automatic format selection.
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> SnapResult<Vec<u8>> {
    check_dimensions(pixels, width, height)?;

    match extract_palette(pixels) {
        Some((palette, indices)) => create_png_indexed(width, height, &palette, &indices),
        None => create_png_rgba(pixels, width, height),
    }
}

/// Create an RGBA (color type 6) PNG.
pub fn create_png_rgba(pixels: &[u8], width: usize, height: usize) -> SnapResult<Vec<u8>> {
    check_dimensions(pixels, width, height)?;

    let mut out = Vec::new();
    out.extend_from_slice(&PNG_SIGNATURE);
    write_ihdr(&mut out, width, height, 6);

    // Filter type 0 (None) per scanline.
    let mut raw = Vec::with_capacity(height * (1 + width * 4));
    for row in pixels.chunks_exact(width * 4) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    write_chunk(&mut out, b"IDAT", &deflate(&raw)?);
    write_chunk(&mut out, b"IEND", &[]);
    Ok(out)
}

/// Create an indexed (color type 3) PNG from a palette and per-pixel indices.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
) -> SnapResult<Vec<u8>> {
    if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(SnapError::RenderError(format!(
            "Palette size {} out of range",
            palette.len()
        )));
    }
    if indices.len() != width * height {
        return Err(SnapError::RenderError(format!(
            "Index buffer is {} entries for a {}x{} image",
            indices.len(),
            width,
            height
        )));
    }

    let mut out = Vec::new();
    out.extend_from_slice(&PNG_SIGNATURE);
    write_ihdr(&mut out, width, height, 3);

    let mut plte = Vec::with_capacity(palette.len() * 3);
    let mut trns = Vec::with_capacity(palette.len());
    for &(r, g, b, a) in palette {
        plte.extend_from_slice(&[r, g, b]);
        trns.push(a);
    }
    write_chunk(&mut out, b"PLTE", &plte);

    // tRNS is only needed while some entry is non-opaque.
    if trns.iter().any(|&a| a != 255) {
        write_chunk(&mut out, b"tRNS", &trns);
    }

    let mut raw = Vec::with_capacity(height * (1 + width));
    for row in indices.chunks_exact(width) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    write_chunk(&mut out, b"IDAT", &deflate(&raw)?);
    write_chunk(&mut out, b"IEND", &[]);
    Ok(out)
}

fn check_dimensions(pixels: &[u8], width: usize, height: usize) -> SnapResult<()> {
    if width == 0 || height == 0 {
        return Err(SnapError::RenderError("Zero-sized image".to_string()));
    }
    if pixels.len() != width * height * 4 {
        return Err(SnapError::RenderError(format!(
            "Pixel buffer is {} bytes for a {}x{} RGBA image",
            pixels.len(),
            width,
            height
        )));
    }
    Ok(())
}

/// Build a palette if the image has ≤256 unique colors.
///
/// Returns the palette plus one index per pixel, or `None` when the image
/// needs full RGBA.
fn extract_palette(pixels: &[u8]) -> Option<(Vec<(u8, u8, u8, u8)>, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for chunk in pixels.chunks_exact(4) {
        let packed = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);

        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push((chunk[0], chunk[1], chunk[2], chunk[3]));
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

fn write_ihdr(out: &mut Vec<u8>, width: usize, height: usize, color_type: u8) {
    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(color_type);
    ihdr.push(0); // compression
    ihdr.push(0); // filter
    ihdr.push(0); // interlace
    write_chunk(out, b"IHDR", &ihdr);
}

fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
}

fn deflate(raw: &[u8]) -> SnapResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(raw)
        .map_err(|e| SnapError::RenderError(format!("Deflate failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| SnapError::RenderError(format!("Deflate failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_types(png: &[u8]) -> Vec<String> {
        let mut types = Vec::new();
        let mut offset = 8;
        while offset + 8 <= png.len() {
            let len = u32::from_be_bytes(png[offset..offset + 4].try_into().unwrap()) as usize;
            types.push(String::from_utf8_lossy(&png[offset + 4..offset + 8]).to_string());
            offset += 12 + len;
        }
        types
    }

    #[test]
    fn test_rgba_png_structure() {
        // 2x2 gradient, all colors unique
        let pixels = vec![
            255, 0, 0, 255, //
            0, 255, 0, 255, //
            0, 0, 255, 255, //
            9, 9, 9, 255,
        ];
        let png = create_png_rgba(&pixels, 2, 2).unwrap();

        assert_eq!(&png[0..8], &PNG_SIGNATURE);
        assert_eq!(chunk_types(&png), vec!["IHDR", "IDAT", "IEND"]);
        assert_eq!(png[25], 6); // color type
    }

    #[test]
    fn test_auto_picks_indexed_for_few_colors() {
        // 4x4 image with only two colors
        let mut pixels = Vec::new();
        for i in 0..16 {
            if i % 2 == 0 {
                pixels.extend_from_slice(&[10, 20, 30, 255]);
            } else {
                pixels.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
        let png = create_png_auto(&pixels, 4, 4).unwrap();

        // Indexed PNG carries a palette, and tRNS for the transparent entry
        let types = chunk_types(&png);
        assert!(types.contains(&"PLTE".to_string()));
        assert!(types.contains(&"tRNS".to_string()));
        assert_eq!(png[25], 3);
    }

    #[test]
    fn test_auto_falls_back_to_rgba() {
        // 300 unique colors forces RGBA
        let mut pixels = Vec::new();
        for i in 0..300u32 {
            pixels.extend_from_slice(&[(i % 256) as u8, (i / 256) as u8, 0, 255]);
        }
        let png = create_png_auto(&pixels, 300, 1).unwrap();

        assert!(!chunk_types(&png).contains(&"PLTE".to_string()));
        assert_eq!(png[25], 6);
    }

    #[test]
    fn test_opaque_palette_omits_trns() {
        let mut pixels = Vec::new();
        for _ in 0..4 {
            pixels.extend_from_slice(&[1, 2, 3, 255]);
        }
        let png = create_png_auto(&pixels, 2, 2).unwrap();
        assert!(!chunk_types(&png).contains(&"tRNS".to_string()));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        assert!(create_png_rgba(&[0; 16], 3, 3).is_err());
        assert!(create_png_auto(&[], 0, 0).is_err());
    }
}
