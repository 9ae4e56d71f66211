//! Currency module: rate tables, normalization, and the supported-currency catalog

pub mod catalog;
pub mod rates;

pub use catalog::*;
pub use rates::*;
