//! GRIB2 parser (WMO FM 92 GRIB Edition 2).
//!
//! Pure Rust parsing of GRIB2 forecast files: message framing, section
//! decoding, simple-packing data unpacking, and extraction of near-surface
//! fields as named 2-D grids.

pub mod field;
pub mod reader;
pub mod sections;
pub mod tables;
pub mod unpack;

pub use field::{extract_surface_fields, SurfaceField};
pub use reader::{Grib2Message, Grib2Reader};
pub use tables::{is_near_surface, parameter_short_name};
pub use unpack::unpack_simple;
