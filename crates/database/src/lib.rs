//! # perfmon Record Store
//!
//! Read-only adapters that turn external measurement tables into the
//! in-memory snapshot the engine works on.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** All source-specific logic (CSV dialects, SQL,
//!   timestamp spellings) lives here. The rest of the workspace only ever
//!   sees `Measurement`s.
//! - **Drop and count:** A row that cannot become a measurement is left out
//!   and counted by reason in a `LoadSummary`; it never aborts the load.
//!
//! ## Public API
//!
//! - `load_csv` / `read_csv`: snapshot files.
//! - `connect` and `DbRepository::fetch_measurements`: a PostgreSQL table.
//! - `Snapshot`, `LoadSummary`, `DropReason`.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod csv_source;
pub mod error;
pub mod repository;
pub mod snapshot;
pub mod timestamp;

// Re-export the key components to create a clean, public-facing API.
pub use connection::connect;
pub use csv_source::{load_csv, read_csv};
pub use error::DbError;
pub use repository::{DbRepository, validate_table_name};
pub use snapshot::{DropReason, LoadSummary, Snapshot, parse_value};
pub use timestamp::parse_timestamp;
