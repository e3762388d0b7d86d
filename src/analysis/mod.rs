//! Weekly aggregation, merging and editing.

pub mod aggregator;
pub mod edits;
pub mod merger;

pub use aggregator::{aggregate, snapshot_report};
pub use edits::{apply_edits, CellEdit};
pub use merger::merge;
