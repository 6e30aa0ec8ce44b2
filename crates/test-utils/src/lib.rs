//! Shared test utilities.

pub mod grib2;

pub use grib2::Grib2MessageBuilder;
