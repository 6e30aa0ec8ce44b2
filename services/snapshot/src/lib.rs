//! Library surface of the snapshot service, exposed for integration tests.

pub mod config;
pub mod normalize;
pub mod pipeline;
pub mod resolve;
