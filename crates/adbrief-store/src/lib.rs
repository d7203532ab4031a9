//! Persisted set of ad ids that have already been featured in a digest.
//!
//! The backing record is a small JSON document read once at the start of a
//! run and rewritten once, atomically, at commit time.

pub mod dedup;
pub mod error;

pub use dedup::DedupStore;
pub use error::StoreError;
