//! Variable-name normalization.
//!
//! Providers disagree on short names for the same physical field: NCEP
//! tables say TMP/UGRD/VGRD, ECMWF GRIB says 2t/10u/10v, cfgrib-derived
//! files say t2m/u10/v10. Fixed alias tables map whatever the file exposes
//! onto canonical roles.

use grib2_parser::SurfaceField;

/// Canonical field roles the renderer consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Temperature,
    WindU,
    WindV,
}

const TEMPERATURE_ALIASES: &[&str] = &["TMP", "T2M", "2T", "T"];
const WIND_U_ALIASES: &[&str] = &["UGRD", "U10", "10U", "U"];
const WIND_V_ALIASES: &[&str] = &["VGRD", "V10", "10V", "V"];

impl FieldRole {
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            FieldRole::Temperature => TEMPERATURE_ALIASES,
            FieldRole::WindU => WIND_U_ALIASES,
            FieldRole::WindV => WIND_V_ALIASES,
        }
    }
}

/// Find the field filling a role, if any.
///
/// Aliases are matched case-insensitively against field short names, in
/// alias-table order. Never fails: an unmatched role is simply `None`.
pub fn find_role<'a>(fields: &'a [SurfaceField], role: FieldRole) -> Option<&'a SurfaceField> {
    role.aliases()
        .iter()
        .find_map(|alias| fields.iter().find(|f| f.name.eq_ignore_ascii_case(alias)))
}
