//! # Tripsplit Core
//!
//! Shared-expense ledger engine for group trips: split allocation,
//! multi-currency normalization, balance aggregation, debt simplification,
//! and settlement tracking.
//!
//! ## Features
//!
//! - **Split allocation**: Equal, exact, percentage, and share-based splits with cent-exact rounding
//! - **Mode conversion**: Switch a split between modes without losing its intent
//! - **Multi-currency**: Expenses in any trip currency, normalized into the base currency
//! - **Balances**: Zero-sum net positions recomputed from expenses and settlements
//! - **Debt simplification**: At most n-1 suggested transfers to settle a trip
//! - **Settlements**: Full and partial payments with automatic settled tracking
//! - **Storage abstraction**: Backend-agnostic sessions with optimistic updates and rollback
//!
//! ## Quick Start
//!
//! ```rust
//! use tripsplit_core::{Member, SplitAllocator, SplitSpec};
//! use bigdecimal::BigDecimal;
//!
//! let members = vec![
//!     Member::new("a", "Asha"),
//!     Member::new("b", "Bilal"),
//!     Member::new("c", "Chen"),
//! ];
//! let spec = SplitSpec::equal_among(&members);
//! let splits = SplitAllocator::default().allocate(&BigDecimal::from(100), &spec, &members);
//!
//! let total: BigDecimal = splits.iter().map(|s| &s.amount_owed).sum();
//! assert_eq!(total, BigDecimal::from(100));
//! ```

pub mod balance;
pub mod config;
pub mod currency;
pub mod settlement;
pub mod split;
pub mod traits;
pub mod trip;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use balance::*;
pub use config::*;
pub use currency::*;
pub use settlement::*;
pub use split::*;
pub use traits::*;
pub use trip::*;
pub use types::*;
