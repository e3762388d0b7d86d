//! Persistence of the accumulated weekly table between runs.
//!
//! The table is read once at start and overwritten wholesale at the end of
//! a run. There is no locking: two concurrent runs race and the last writer
//! wins.

pub mod table;

pub use table::{load_or_init, save};
