//! Opportunity detection, ranking and trade sizing

pub mod evaluator;
pub mod scanner;
pub mod sizer;
pub mod statistics;

pub use evaluator::*;
pub use scanner::*;
pub use sizer::*;
pub use statistics::*;
