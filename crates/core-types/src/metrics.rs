//! Metric names as they appear in the source table.

pub const ACCEL_LOAD_ACCUM: &str = "accel_load_accum";
pub const JUMP_HEIGHT: &str = "Jump Height(m)";
pub const PEAK_PROPULSIVE_FORCE: &str = "Peak Propulsive Force(N)";
pub const DISTANCE_TOTAL: &str = "distance_total";
pub const LEFT_MAX_FORCE: &str = "leftMaxForce";
pub const RIGHT_MAX_FORCE: &str = "rightMaxForce";

/// The six metrics the monitoring program tracks.
pub const DEFAULT_METRICS: [&str; 6] = [
    ACCEL_LOAD_ACCUM,
    JUMP_HEIGHT,
    PEAK_PROPULSIVE_FORCE,
    DISTANCE_TOTAL,
    LEFT_MAX_FORCE,
    RIGHT_MAX_FORCE,
];
