//! GRIB2 parameter and level code tables.
//!
//! Translates (discipline, category, number) triples into WMO short names
//! and classifies fixed-surface codes. Only the meteorological parameters
//! the snapshot pipeline cares about are named; everything else falls back
//! to a `P{d}_{c}_{n}` code so unknown fields stay identifiable in logs.

/// Look up the WMO short name for a parameter.
pub fn parameter_short_name(discipline: u8, category: u8, number: u8) -> String {
    match (discipline, category, number) {
        // Discipline 0: meteorological products

        // Category 0: temperature
        (0, 0, 0) => "TMP".to_string(),
        (0, 0, 6) => "DPT".to_string(),

        // Category 1: moisture
        (0, 1, 0) => "SPFH".to_string(),
        (0, 1, 1) => "RH".to_string(),
        (0, 1, 8) => "APCP".to_string(),

        // Category 2: momentum
        (0, 2, 0) => "WDIR".to_string(),
        (0, 2, 1) => "WIND".to_string(),
        (0, 2, 2) => "UGRD".to_string(),
        (0, 2, 3) => "VGRD".to_string(),
        (0, 2, 22) => "GUST".to_string(),

        // Category 3: mass
        (0, 3, 0) => "PRES".to_string(),
        (0, 3, 1) => "PRMSL".to_string(),
        (0, 3, 5) => "HGT".to_string(),

        _ => format!("P{}_{}_{}", discipline, category, number),
    }
}

/// Human-readable description for a fixed surface.
pub fn level_description(level_type: u8, level_value: u32) -> String {
    match level_type {
        1 => "surface".to_string(),
        100 => format!("{} mb", level_value),
        101 => "mean sea level".to_string(),
        102 => format!("{} m above MSL", level_value),
        103 => format!("{} m above ground", level_value),
        200 => "entire atmosphere".to_string(),
        _ => format!("Level type {} value {}", level_type, level_value),
    }
}

/// Whether a fixed surface counts as near-surface for snapshot rendering.
///
/// Ground surface (type 1) plus height-above-ground (type 103) up to 10 m,
/// which covers 2 m temperature and 10 m winds.
pub fn is_near_surface(level_type: u8, level_value: u32) -> bool {
    match level_type {
        1 => true,
        103 => level_value <= 10,
        _ => false,
    }
}
