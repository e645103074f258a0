//! # perfmon Aggregation Engine
//!
//! Partition-relative statistics over a measurement snapshot: means, sample
//! standard deviations, percentiles, z-scores and percent differences, plus
//! the correlation and effect-size helpers the research questions rely on.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** A pure logic crate. It depends only on `core-types` (Layer 0).
//! - **Undefined is a value:** A statistic that cannot be computed (no data,
//!   one reading, zero denominator) is returned as `Err(Undefined)` inside a
//!   `Derived`, never as `NaN` or a silent zero. Only caller mistakes such as
//!   an out-of-range percentile are reported as `AnalyticsError`.
//!
//! ## Public API
//!
//! - `AggregationEngine`: groups observations by partition and computes `GroupStat`s.
//! - `stats`: the free-standing statistical functions.
//! - `yearly_means`: per-year trend table.

pub mod engine;
pub mod error;
pub mod report;
pub mod stats;
pub mod trends;

pub use engine::{AggregationEngine, PartitionSample, summarize_pct_diff};
pub use error::AnalyticsError;
pub use report::{GroupStat, PctDiffSummary, RelativeMeasurement, YearlyMean};
pub use stats::SampleStats;
pub use trends::yearly_means;
