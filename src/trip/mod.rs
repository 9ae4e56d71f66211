//! Trip orchestration: pricing drafts, summaries, and persisted sessions

pub mod engine;
pub mod expense;
pub mod optimistic;
pub mod session;
pub mod summary;

pub use engine::*;
pub use expense::*;
pub use optimistic::*;
pub use session::*;
pub use summary::*;
