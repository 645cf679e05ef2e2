//! Runs: repeated catalog placements along a path.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::ids::{CatalogId, RunId, ShellId};

/// A distribution of repeated catalog items along a path.
///
/// The produced instance sequence is derived, never authored: the run
/// placer regenerates it whenever the path or policy changes. Only the run
/// definition below is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Unique id.
    pub id: RunId,
    /// The catalog definition placed at each instance.
    pub def: CatalogId,
    /// The path the run follows.
    pub path: RunPath,
    /// How instances are distributed along the usable length.
    pub policy: SpacingPolicy,
    /// Unused length at the start of the path, in meters.
    #[serde(default)]
    pub start_offset: f64,
    /// Unused length at the end of the path, in meters.
    #[serde(default)]
    pub end_offset: f64,
}

impl Run {
    /// Create a run with a fresh id and zero offsets.
    #[must_use]
    pub fn new(def: CatalogId, path: RunPath, policy: SpacingPolicy) -> Self {
        Self {
            id: RunId::new(),
            def,
            path,
            policy,
            start_offset: 0.0,
            end_offset: 0.0,
        }
    }

    /// Set start/end offsets, builder style.
    #[must_use]
    pub fn with_offsets(mut self, start: f64, end: f64) -> Self {
        self.start_offset = start;
        self.end_offset = end;
        self
    }
}

/// The path a run follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunPath {
    /// An explicit polyline in plan space.
    Points(Vec<Point2<f64>>),
    /// The centerline of a shell. A non-owning binding: if the shell is
    /// deleted the run is orphaned and removed by the session.
    Shell(ShellId),
}

/// How instances are distributed along a run's usable length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpacingPolicy {
    /// One instance every `spacing` meters from the start offset.
    FixedSpacing {
        /// Distance between consecutive instances, in meters. Always > 0.
        spacing: f64,
        /// When the usable length is not a whole multiple of `spacing`,
        /// stretch the intervals to absorb the remainder instead of leaving
        /// the final partial interval empty.
        absorb_remainder: bool,
    },
    /// Exactly `n` instances dividing the usable length into `n - 1` equal
    /// intervals. `n == 1` places a single instance at the start.
    FixedCount(u32),
    /// As many instances as fit at the definition's nominal width, with the
    /// leftover length redistributed evenly between instances
    /// (center-balanced).
    FillWithRemainder {
        /// Nominal per-instance width used to compute the count, in meters.
        /// Always > 0.
        item_width: f64,
    },
}
