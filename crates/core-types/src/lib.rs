//! # perfmon core types
//!
//! Layer 0 of the workspace: the value records every other crate passes around.
//! Nothing in here performs I/O or holds state; all types are immutable once built.

pub mod enums;
pub mod error;
pub mod metrics;
pub mod partition;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Gender, RiskLabel, Side, Sport};
pub use error::{CoreError, Derived, Undefined};
pub use partition::{Partition, PartitionKey, TeamDirectory, TeamProfile};
pub use structs::{EntityRecord, Measurement, Observation, WideRecord};
