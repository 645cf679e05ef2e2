//! Spacing-policy solving.

use nalgebra::Point2;
use tracing::debug;

use plan_types::{Plan, Run, SpacingPolicy};

use crate::error::{RunError, RunResult};
use crate::path::{bound_path, Polyline};

/// One derived placement along a run.
///
/// Never authored and never persisted; regenerated whenever the bound path
/// or the policy changes.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedInstance {
    /// Position in the derived sequence, from zero.
    pub index: usize,
    /// Distance along the path, in meters from the path start.
    pub distance: f64,
    /// Position in plan space.
    pub position: Point2<f64>,
    /// Orientation: the path tangent angle at this distance, in radians.
    pub angle_rad: f64,
}

/// Resolve a run against an explicit path.
///
/// Pure and deterministic: identical `(path, policy, offsets)` inputs
/// yield identical sequences, across invocations and machines. An empty
/// sequence (usable length too short, zero count) is a valid result, not
/// an error.
///
/// # Errors
///
/// [`RunError::DegeneratePath`] when the path cannot carry placements, or
/// [`RunError::InvalidPolicy`] for non-positive spacing/width parameters.
pub fn resolve(run: &Run, path: &[Point2<f64>]) -> RunResult<Vec<PlacedInstance>> {
    let polyline = Polyline::new(path.to_vec());
    if polyline.is_degenerate() {
        return Err(RunError::DegeneratePath { run: run.id });
    }

    let total = polyline.total_length();
    let usable = total - run.start_offset - run.end_offset;
    if usable < 0.0 {
        return Ok(Vec::new());
    }

    let distances = match run.policy {
        SpacingPolicy::FixedSpacing {
            spacing,
            absorb_remainder,
        } => {
            if spacing <= 0.0 {
                return Err(RunError::InvalidPolicy {
                    run: run.id,
                    details: format!("spacing {spacing:.4} m"),
                });
            }
            fixed_spacing(usable, spacing, absorb_remainder)
        }
        SpacingPolicy::FixedCount(count) => fixed_count(usable, count),
        SpacingPolicy::FillWithRemainder { item_width } => {
            if item_width <= 0.0 {
                return Err(RunError::InvalidPolicy {
                    run: run.id,
                    details: format!("item width {item_width:.4} m"),
                });
            }
            fill_with_remainder(usable, item_width)
        }
    };

    let instances: Vec<PlacedInstance> = distances
        .into_iter()
        .enumerate()
        .map(|(index, offset)| {
            let distance = run.start_offset + offset;
            let (position, tangent) = polyline.sample(distance);
            PlacedInstance {
                index,
                distance,
                position,
                angle_rad: tangent.y.atan2(tangent.x),
            }
        })
        .collect();

    debug!(run = %run.id, count = instances.len(), "run resolved");
    Ok(instances)
}

/// Resolve a run against the plan it lives in, following its path binding.
///
/// # Errors
///
/// [`RunError::UnboundPath`] when the run is bound to a shell that no
/// longer exists, plus everything [`resolve`] reports.
pub fn resolve_for_plan(plan: &Plan, run: &Run) -> RunResult<Vec<PlacedInstance>> {
    let path = bound_path(plan, run).ok_or_else(|| match &run.path {
        plan_types::RunPath::Shell(shell) => RunError::UnboundPath {
            run: run.id,
            shell: *shell,
        },
        plan_types::RunPath::Points(_) => RunError::DegeneratePath { run: run.id },
    })?;
    resolve(run, &path)
}

/// Instances every `spacing` meters; the final partial interval is left
/// empty, or absorbed by stretching all intervals when `absorb` is set.
fn fixed_spacing(usable: f64, spacing: f64, absorb: bool) -> Vec<f64> {
    // Tolerate accumulated float error at the last slot.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let intervals = ((usable / spacing) + 1e-9).floor() as usize;

    if intervals == 0 {
        return vec![0.0];
    }
    let step = if absorb { usable / intervals as f64 } else { spacing };
    (0..=intervals).map(|i| i as f64 * step).collect()
}

/// Exactly `count` instances dividing the usable length into `count - 1`
/// equal intervals.
fn fixed_count(usable: f64, count: u32) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let step = usable / f64::from(count - 1);
            (0..count).map(|i| f64::from(i) * step).collect()
        }
    }
}

/// As many `item_width` slots as fit, with the leftover redistributed
/// evenly as extra spacing, center-balanced. Instances sit at slot
/// centers.
fn fill_with_remainder(usable: f64, item_width: f64) -> Vec<f64> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = ((usable / item_width) + 1e-9).floor() as usize;
    if count == 0 {
        return Vec::new();
    }

    let leftover = usable - item_width * count as f64;
    let gap = leftover / count as f64;
    (0..count)
        .map(|i| gap * 0.5 + item_width * 0.5 + i as f64 * (item_width + gap))
        .collect()
}
