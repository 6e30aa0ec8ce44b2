//! Raster rendering of gridded forecast fields.
//!
//! One pixel per grid point: values are clamped to a fixed range, mapped
//! through a fixed colormap, and encoded as PNG. No axes, labels or margins.

pub mod colormap;
pub mod png;
pub mod raster;

pub use colormap::Colormap;
pub use png::create_png_auto;
pub use raster::encode_field_png;
