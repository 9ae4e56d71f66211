//! Settlement module: confirmed payments and settledness

pub mod ledger;

pub use ledger::*;
