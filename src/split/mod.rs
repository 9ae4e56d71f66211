//! Split module: per-mode specifications, allocation, and mode conversion

pub mod allocator;
pub mod convert;
pub mod spec;

pub use allocator::*;
pub use spec::*;
