//! Object storage access for public forecast buckets.

pub mod bucket;

pub use bucket::BucketClient;
