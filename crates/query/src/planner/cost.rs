//! Planner cost model constants.
//!
//! These are the only tunables the planner exposes; everything else is
//! derived from row-count estimates times one of these per-row factors.

/// Cost per row for a forward (ascending) scan.
pub const SCAN_FACTOR: f64 = 1.0;

/// Cost per row for a reverse (descending) scan. Always strictly greater
/// than [`SCAN_FACTOR`] - reading backwards against a forward-sorted
/// storage layout costs more.
pub const DESC_SCAN_FACTOR: f64 = 1.5;

/// Cost per row for attaching a `Selection`/`Aggregation`/`Projection`
/// onto an already-planned task.
pub const CPU_FACTOR: f64 = 0.3;

/// Cost per row for finishing a `CopTask`: shipping its rows up to the
/// SQL layer.
pub const NET_FACTOR: f64 = 1.2;
