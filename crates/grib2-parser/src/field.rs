//! Near-surface field extraction.

use bytes::Bytes;

use snap_common::{SnapError, SnapResult};

use crate::reader::Grib2Reader;

/// A decoded 2-D near-surface field.
#[derive(Debug, Clone)]
pub struct SurfaceField {
    /// WMO short name, e.g. "TMP".
    pub name: String,
    /// Description of the level the field sits at.
    pub level: String,
    /// Grid width (longitude points).
    pub width: usize,
    /// Grid height (latitude points).
    pub height: usize,
    /// Row-major values; masked points are NaN.
    pub values: Vec<f32>,
}

/// Decode every near-surface message in a GRIB2 file.
///
/// Messages at other vertical levels are skipped without decoding. An
/// unsupported packing template on a near-surface message fails the whole
/// file; the caller treats that as the provider failing.
pub fn extract_surface_fields(data: Bytes) -> SnapResult<Vec<SurfaceField>> {
    let mut reader = Grib2Reader::new(data);
    let mut fields = Vec::new();

    while let Some(message) = reader.next_message()? {
        if !message.is_near_surface() {
            continue;
        }

        let (rows, cols) = message.grid_dims();
        let values = message.decode_values()?;

        if values.len() != (rows as usize) * (cols as usize) {
            return Err(SnapError::InvalidGrib2(format!(
                "Field {} has {} values for a {}x{} grid",
                message.short_name(),
                values.len(),
                cols,
                rows
            )));
        }

        fields.push(SurfaceField {
            name: message.short_name(),
            level: message.level_description(),
            width: cols as usize,
            height: rows as usize,
            values,
        });
    }

    Ok(fields)
}
