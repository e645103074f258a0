//! # perfmon Reshape
//!
//! Turns the long-format measurement snapshot (one row per athlete, metric and
//! timestamp) into wide views the aggregation and flagging stages can read.
//!
//! - **Pure functions:** every operation borrows the snapshot and returns a new
//!   value. Running the same call twice gives identical output.
//! - **Missing is not zero:** null readings never enter a cell, and a metric
//!   with no reading is absent from the row rather than filled with `0.0`.
//! - **Collisions average:** several readings of the same metric for the same
//!   athlete and timestamp collapse to their arithmetic mean.

pub mod pivot;
pub mod table;

pub use pivot::{aggregate_by_entity, latest_per_entity, pivot, pivot_entity};
pub use table::WideTable;
