//! Outcome history (SQLite via sqlx).
//!
//! One row per batch and one row per finished job, so past runs can be
//! listed with their per-outcome counts.

mod batches;
pub mod db;
pub mod types;

#[cfg(test)]
mod tests;

pub use db::HistoryDb;
#[cfg(test)]
pub(crate) use db::open_memory;
pub use types::*;
