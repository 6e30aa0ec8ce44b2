//! GRIB2 data unpacking.
//!
//! Only simple packing (data representation template 5.0) is implemented;
//! that is what the NOAA AI-model buckets publish. Other templates surface
//! as `SnapError::UnsupportedPacking` at the call site.

use snap_common::{SnapError, SnapResult};

/// Unpack simple-packed data.
///
/// value = (R + packed * 2^E) * 10^-D, with R the reference value, E the
/// binary scale factor and D the decimal scale factor. Grid points masked
/// out by the bitmap come back as `None`; `bits_per_value == 0` means every
/// point equals the reference value.
pub fn unpack_simple(
    packed: &[u8],
    num_points: u32,
    bits_per_value: u8,
    reference_value: f32,
    binary_scale_factor: i16,
    decimal_scale_factor: i16,
    bitmap: Option<&[u8]>,
) -> SnapResult<Vec<Option<f32>>> {
    let num_points = num_points as usize;

    if bits_per_value == 0 {
        return Ok((0..num_points)
            .map(|i| point_present(bitmap, i).then_some(reference_value))
            .collect());
    }
    if bits_per_value as usize > 32 {
        return Err(SnapError::UnpackingError(format!(
            "Bits per value {} out of range",
            bits_per_value
        )));
    }

    let binary_scale = 2.0_f32.powi(binary_scale_factor as i32);
    let decimal_scale = 10.0_f32.powi(-(decimal_scale_factor as i32));
    let bits = bits_per_value as usize;

    let mut values = Vec::with_capacity(num_points);
    let mut bit_position = 0;

    for i in 0..num_points {
        if !point_present(bitmap, i) {
            // Masked points are not stored in the data section.
            values.push(None);
            continue;
        }

        let packed_value = extract_bits(packed, bit_position, bits)?;
        bit_position += bits;

        let value = (reference_value + (packed_value as f32) * binary_scale) * decimal_scale;
        values.push(Some(value));
    }

    Ok(values)
}

/// Bitmap lookup: 1 bit per grid point, MSB first, 1 = value present.
fn point_present(bitmap: Option<&[u8]>, index: usize) -> bool {
    match bitmap {
        None => true,
        Some(bm) => {
            let byte_idx = index / 8;
            let bit_idx = 7 - (index % 8);
            match bm.get(byte_idx) {
                Some(byte) => (byte >> bit_idx) & 1 == 1,
                None => true,
            }
        }
    }
}

/// Read `num_bits` big-endian bits starting at `start_bit`.
fn extract_bits(data: &[u8], start_bit: usize, num_bits: usize) -> SnapResult<u32> {
    let mut result = 0u32;

    for i in 0..num_bits {
        let absolute_bit = start_bit + i;
        let byte_idx = absolute_bit / 8;
        let bit_idx = 7 - (absolute_bit % 8);

        let byte = data.get(byte_idx).ok_or_else(|| {
            SnapError::UnpackingError("Data section shorter than packed length".to_string())
        })?;

        result = (result << 1) | ((byte >> bit_idx) & 1) as u32;
    }

    Ok(result)
}
