//! Core data types and structures

pub mod snapshot;
pub mod arbitrage;
pub mod fees;
pub mod sizing;
pub mod execution;
pub mod statistics;

pub use snapshot::*;
pub use arbitrage::*;
pub use fees::*;
pub use sizing::*;
pub use execution::*;
pub use statistics::*;
