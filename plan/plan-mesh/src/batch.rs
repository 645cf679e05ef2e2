//! Batch regeneration across independent segments.

use rayon::prelude::*;

use plan_types::{Plan, SegmentId};

use crate::config::MeshConfig;
use crate::error::MeshResult;
use crate::patch::MeshPatch;
use crate::slab::compute_segment_mesh;

/// Compute patches for a set of segments in parallel.
///
/// Each patch depends only on its own segment's inputs, so the fan-out is
/// embarrassingly parallel. Segments not found in the plan are skipped
/// (they were removed while the remesh was queued). Output order follows
/// the input order regardless of scheduling, keeping batch results
/// deterministic.
#[must_use]
pub fn compute_patches(
    plan: &Plan,
    segments: &[SegmentId],
    config: &MeshConfig,
) -> Vec<(SegmentId, MeshResult<MeshPatch>)> {
    segments
        .par_iter()
        .filter_map(|id| {
            plan.segment(*id)
                .map(|(_, segment)| (*id, compute_segment_mesh(segment, config)))
        })
        .collect()
}
