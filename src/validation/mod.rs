//! Validation of data arriving from exchanges

pub mod snapshot;

pub use snapshot::*;
