//! Balance module: aggregation of net positions and debt simplification

pub mod aggregator;
pub mod simplifier;

pub use aggregator::*;
pub use simplifier::*;
