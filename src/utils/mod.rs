//! Logging and console output helpers

pub mod logging;
pub mod display;

pub use logging::*;
pub use display::*;
