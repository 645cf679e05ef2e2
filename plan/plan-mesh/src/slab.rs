//! Wall slab meshing.
//!
//! Everything here works in the segment's local frame (x along the wall,
//! y across the thickness, z up from the wall base) and transforms to
//! world space at the very end. Plan-scale coordinates never mix into the
//! cut arithmetic, so precision is uniform regardless of where the wall
//! sits.

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use tracing::debug;

use plan_openings::solid_intervals;
use plan_types::{Opening, WallSegment};

use crate::config::MeshConfig;
use crate::error::{MeshError, MeshResult};
use crate::hash::segment_content_hash;
use crate::patch::MeshPatch;

/// Accumulates welded geometry in the local segment frame.
struct PatchBuilder {
    weld_epsilon: f64,
    uv_scale: f64,
    weld: HashMap<(i64, i64, i64), u32>,
    positions: Vec<Point3<f64>>,
    triangles: Vec<[u32; 3]>,
    normals: Vec<Vector3<f64>>,
    uvs: Vec<[[f64; 2]; 3]>,
}

impl PatchBuilder {
    fn new(config: &MeshConfig) -> Self {
        Self {
            weld_epsilon: config.weld_epsilon,
            uv_scale: config.uv_scale,
            weld: HashMap::new(),
            positions: Vec::new(),
            triangles: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
        }
    }

    /// Welded vertex insertion: coincident positions share one index.
    #[allow(clippy::cast_possible_truncation)]
    fn vertex(&mut self, p: Point3<f64>) -> u32 {
        let eps = self.weld_epsilon;
        let key = (
            (p.x / eps).round() as i64,
            (p.y / eps).round() as i64,
            (p.z / eps).round() as i64,
        );
        if let Some(&index) = self.weld.get(&key) {
            return index;
        }
        let index = u32::try_from(self.positions.len()).unwrap_or(u32::MAX);
        self.positions.push(p);
        self.weld.insert(key, index);
        index
    }

    /// Unwelded vertex insertion, for geometry that must stay a separate
    /// component (skirting boxes touching the wall face).
    fn vertex_unwelded(&mut self, p: Point3<f64>) -> u32 {
        let index = u32::try_from(self.positions.len()).unwrap_or(u32::MAX);
        self.positions.push(p);
        index
    }

    fn triangle(&mut self, indices: [u32; 3], normal: Vector3<f64>, uvs: [[f64; 2]; 3]) {
        // Welding can collapse a quad corner; drop the degenerate triangle.
        if indices[0] == indices[1] || indices[1] == indices[2] || indices[0] == indices[2] {
            return;
        }
        self.triangles.push(indices);
        self.normals.push(normal);
        let s = self.uv_scale;
        self.uvs.push([
            [uvs[0][0] * s, uvs[0][1] * s],
            [uvs[1][0] * s, uvs[1][1] * s],
            [uvs[2][0] * s, uvs[2][1] * s],
        ]);
    }

    /// A welded quad as two triangles. Corners CCW viewed from outside.
    fn quad(&mut self, corners: [Point3<f64>; 4], normal: Vector3<f64>, uvs: [[f64; 2]; 4]) {
        let idx = corners.map(|c| self.vertex(c));
        self.triangle([idx[0], idx[1], idx[2]], normal, [uvs[0], uvs[1], uvs[2]]);
        self.triangle([idx[0], idx[2], idx[3]], normal, [uvs[0], uvs[2], uvs[3]]);
    }

    /// A closed axis-aligned box as its own component.
    fn add_box(&mut self, x0: f64, x1: f64, y0: f64, y1: f64, z0: f64, z1: f64) {
        let corners = [
            Point3::new(x0, y0, z0),
            Point3::new(x1, y0, z0),
            Point3::new(x1, y1, z0),
            Point3::new(x0, y1, z0),
            Point3::new(x0, y0, z1),
            Point3::new(x1, y0, z1),
            Point3::new(x1, y1, z1),
            Point3::new(x0, y1, z1),
        ];
        let idx = corners.map(|c| self.vertex_unwelded(c));

        // (face indices, outward normal, uv source per corner)
        let faces: [([usize; 4], Vector3<f64>); 6] = [
            ([3, 0, 4, 7], Vector3::new(-1.0, 0.0, 0.0)),
            ([1, 2, 6, 5], Vector3::new(1.0, 0.0, 0.0)),
            ([0, 1, 5, 4], Vector3::new(0.0, -1.0, 0.0)),
            ([2, 3, 7, 6], Vector3::new(0.0, 1.0, 0.0)),
            ([0, 3, 2, 1], Vector3::new(0.0, 0.0, -1.0)),
            ([4, 5, 6, 7], Vector3::new(0.0, 0.0, 1.0)),
        ];
        for (face, normal) in faces {
            let uvs = face.map(|i| {
                let c = corners[i];
                // Project onto the face plane for stable tiling.
                if normal.x.abs() > 0.5 {
                    [c.y, c.z]
                } else if normal.y.abs() > 0.5 {
                    [c.x, c.z]
                } else {
                    [c.x, c.y]
                }
            });
            self.triangle(
                [idx[face[0]], idx[face[1]], idx[face[2]]],
                normal,
                [uvs[0], uvs[1], uvs[2]],
            );
            self.triangle(
                [idx[face[0]], idx[face[2]], idx[face[3]]],
                normal,
                [uvs[0], uvs[2], uvs[3]],
            );
        }
    }
}

/// Sorted, deduplicated cut positions.
fn cuts(bounds: (f64, f64), interior: impl IntoIterator<Item = f64>, eps: f64) -> Vec<f64> {
    let mut values = vec![bounds.0, bounds.1];
    for v in interior {
        let clamped = v.clamp(bounds.0, bounds.1);
        values.push(clamped);
    }
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| (*a - *b).abs() <= eps);
    values
}

fn cell_open(openings: &[&Opening], x0: f64, x1: f64, z0: f64, z1: f64) -> bool {
    let xm = (x0 + x1) * 0.5;
    let zm = (z0 + z1) * 0.5;
    openings.iter().any(|o| {
        let ext = o.extent();
        ext.start < xm && xm < ext.end && o.sill < zm && zm < o.head()
    })
}

/// Deterministically mesh one wall segment with its active openings.
///
/// The returned patch is a closed manifold surface per connected component:
/// the wall slab with every opening's volume subtracted, plus one closed
/// box per skirting-board stretch when the segment carries a skirting
/// profile. Normals face outward; UVs tile continuously along the wall's
/// length axis.
///
/// # Errors
///
/// [`MeshError::InvalidSegment`] for non-positive dimensions or zero
/// length: recoverable, the segment itself is unusable.
/// [`MeshError::InvariantViolation`] when an active opening lies outside
/// the segment's bounds or overlaps another: the opening manager
/// guarantees this cannot happen, so hitting it means a validation bug
/// upstream. It must be surfaced to diagnostics, never ignored.
pub fn compute_segment_mesh(segment: &WallSegment, config: &MeshConfig) -> MeshResult<MeshPatch> {
    let length = segment.length();
    let height = segment.height;
    let thickness = segment.thickness;

    if thickness <= 0.0 || height <= 0.0 || length <= 0.0 {
        return Err(MeshError::InvalidSegment {
            segment: segment.id,
            details: format!(
                "length {length:.4} m, thickness {thickness:.4} m, height {height:.4} m"
            ),
        });
    }

    let eps = config.weld_epsilon;
    let mut openings: Vec<&Opening> = segment.active_openings().collect();
    openings.sort_by(|a, b| a.offset.total_cmp(&b.offset));

    // The opening manager owns validation; anything invalid reaching the
    // kernel is an upstream bug and is reported as such.
    for pair in openings.windows(2) {
        if pair[0].end_offset() > pair[1].offset + eps {
            return Err(MeshError::InvariantViolation {
                segment: segment.id,
                details: format!(
                    "openings {} and {} overlap",
                    pair[0].id, pair[1].id
                ),
            });
        }
    }
    for opening in &openings {
        let ext = opening.extent();
        if ext.start < -eps || ext.end > length + eps {
            return Err(MeshError::InvariantViolation {
                segment: segment.id,
                details: format!("opening {} footprint exceeds segment length", opening.id),
            });
        }
        if opening.sill < -eps || opening.head() > height + eps {
            return Err(MeshError::InvariantViolation {
                segment: segment.id,
                details: format!("opening {} exceeds segment height range", opening.id),
            });
        }
    }

    let content_hash = segment_content_hash(segment);
    let t2 = thickness * 0.5;

    let x_cuts = cuts(
        (0.0, length),
        openings
            .iter()
            .flat_map(|o| [o.extent().start, o.extent().end]),
        eps,
    );
    let z_cuts = cuts(
        (0.0, height),
        openings.iter().flat_map(|o| [o.sill, o.head()]),
        eps,
    );

    let mut b = PatchBuilder::new(config);

    // Wall faces: grid cells skipped inside openings.
    for xw in x_cuts.windows(2) {
        let (x0, x1) = (xw[0], xw[1]);
        for zw in z_cuts.windows(2) {
            let (z0, z1) = (zw[0], zw[1]);
            if cell_open(&openings, x0, x1, z0, z1) {
                continue;
            }
            // Left face (+y).
            b.quad(
                [
                    Point3::new(x0, t2, z0),
                    Point3::new(x0, t2, z1),
                    Point3::new(x1, t2, z1),
                    Point3::new(x1, t2, z0),
                ],
                Vector3::new(0.0, 1.0, 0.0),
                [[x0, z0], [x0, z1], [x1, z1], [x1, z0]],
            );
            // Right face (-y).
            b.quad(
                [
                    Point3::new(x0, -t2, z0),
                    Point3::new(x1, -t2, z0),
                    Point3::new(x1, -t2, z1),
                    Point3::new(x0, -t2, z1),
                ],
                Vector3::new(0.0, -1.0, 0.0),
                [[x0, z0], [x1, z0], [x1, z1], [x0, z1]],
            );
        }
    }

    // Top and bottom caps per x-strip, interrupted where an opening
    // reaches the respective surface.
    for xw in x_cuts.windows(2) {
        let (x0, x1) = (xw[0], xw[1]);
        let xm = (x0 + x1) * 0.5;
        let covering = openings
            .iter()
            .find(|o| o.extent().start < xm && xm < o.extent().end);

        let top_open = covering.is_some_and(|o| o.head() >= height - eps);
        if !top_open {
            b.quad(
                [
                    Point3::new(x0, -t2, height),
                    Point3::new(x1, -t2, height),
                    Point3::new(x1, t2, height),
                    Point3::new(x0, t2, height),
                ],
                Vector3::new(0.0, 0.0, 1.0),
                [[x0, 0.0], [x1, 0.0], [x1, thickness], [x0, thickness]],
            );
        }

        let bottom_open = covering.is_some_and(|o| o.sill <= eps);
        if !bottom_open {
            b.quad(
                [
                    Point3::new(x0, -t2, 0.0),
                    Point3::new(x0, t2, 0.0),
                    Point3::new(x1, t2, 0.0),
                    Point3::new(x1, -t2, 0.0),
                ],
                Vector3::new(0.0, 0.0, -1.0),
                [[x0, 0.0], [x0, thickness], [x1, thickness], [x1, 0.0]],
            );
        }
    }

    // Start and end caps per z-strip, interrupted where an opening abuts
    // the segment end.
    for zw in z_cuts.windows(2) {
        let (z0, z1) = (zw[0], zw[1]);
        let zm = (z0 + z1) * 0.5;

        let start_open = openings
            .iter()
            .any(|o| o.extent().start <= eps && o.sill < zm && zm < o.head());
        if !start_open {
            b.quad(
                [
                    Point3::new(0.0, t2, z0),
                    Point3::new(0.0, -t2, z0),
                    Point3::new(0.0, -t2, z1),
                    Point3::new(0.0, t2, z1),
                ],
                Vector3::new(-1.0, 0.0, 0.0),
                [[thickness, z0], [0.0, z0], [0.0, z1], [thickness, z1]],
            );
        }

        let end_open = openings
            .iter()
            .any(|o| o.extent().end >= length - eps && o.sill < zm && zm < o.head());
        if !end_open {
            b.quad(
                [
                    Point3::new(length, t2, z0),
                    Point3::new(length, t2, z1),
                    Point3::new(length, -t2, z1),
                    Point3::new(length, -t2, z0),
                ],
                Vector3::new(1.0, 0.0, 0.0),
                [[thickness, z0], [thickness, z1], [0.0, z1], [0.0, z0]],
            );
        }
    }

    // Reveal faces close each cut through the thickness.
    for opening in &openings {
        let ext = opening.extent();
        let (a, e) = (ext.start, ext.end);
        let (sill, head) = (opening.sill, opening.head());

        // Near jamb faces into the opening (+x); absent when the opening
        // abuts the segment start.
        if a > eps {
            for zw in z_cuts.windows(2) {
                let (z0, z1) = (zw[0], zw[1]);
                if z0 < sill - eps || z1 > head + eps {
                    continue;
                }
                b.quad(
                    [
                        Point3::new(a, t2, z0),
                        Point3::new(a, t2, z1),
                        Point3::new(a, -t2, z1),
                        Point3::new(a, -t2, z0),
                    ],
                    Vector3::new(1.0, 0.0, 0.0),
                    [[thickness, z0], [thickness, z1], [0.0, z1], [0.0, z0]],
                );
            }
        }

        // Far jamb (-x).
        if e < length - eps {
            for zw in z_cuts.windows(2) {
                let (z0, z1) = (zw[0], zw[1]);
                if z0 < sill - eps || z1 > head + eps {
                    continue;
                }
                b.quad(
                    [
                        Point3::new(e, t2, z0),
                        Point3::new(e, -t2, z0),
                        Point3::new(e, -t2, z1),
                        Point3::new(e, t2, z1),
                    ],
                    Vector3::new(-1.0, 0.0, 0.0),
                    [[thickness, z0], [0.0, z0], [0.0, z1], [thickness, z1]],
                );
            }
        }

        // Lintel underside (-z); absent when the opening reaches the top.
        if head < height - eps {
            b.quad(
                [
                    Point3::new(a, -t2, head),
                    Point3::new(a, t2, head),
                    Point3::new(e, t2, head),
                    Point3::new(e, -t2, head),
                ],
                Vector3::new(0.0, 0.0, -1.0),
                [[a, 0.0], [a, thickness], [e, thickness], [e, 0.0]],
            );
        }

        // Sill top (+z); absent for floor-level openings.
        if sill > eps {
            b.quad(
                [
                    Point3::new(a, -t2, sill),
                    Point3::new(e, -t2, sill),
                    Point3::new(e, t2, sill),
                    Point3::new(a, t2, sill),
                ],
                Vector3::new(0.0, 0.0, 1.0),
                [[a, 0.0], [e, 0.0], [e, thickness], [a, thickness]],
            );
        }
    }

    // Skirting boards: closed boxes along the stretches not interrupted by
    // a floor-level opening. Windows above the board height do not break
    // the run.
    if let Some(profile) = segment.skirting {
        let interrupting: Vec<&Opening> = openings
            .iter()
            .copied()
            .filter(|o| o.sill < profile.height - eps)
            .collect();
        for interval in solid_intervals(length, interrupting.iter().copied()) {
            if interval.length() <= eps {
                continue;
            }
            // One box per wall face.
            b.add_box(
                interval.start,
                interval.end,
                t2,
                t2 + profile.thickness,
                0.0,
                profile.height,
            );
            b.add_box(
                interval.start,
                interval.end,
                -t2 - profile.thickness,
                -t2,
                0.0,
                profile.height,
            );
        }
    }

    // Out of the local frame: rotate into plan space, lift by the base
    // height.
    let dir = segment.direction();
    let left = segment.left_normal();
    let origin = segment.start;

    let positions: Vec<Point3<f64>> = b
        .positions
        .iter()
        .map(|p| {
            Point3::new(
                origin.x + dir.x * p.x + left.x * p.y,
                origin.y + dir.y * p.x + left.y * p.y,
                segment.base_z + p.z,
            )
        })
        .collect();
    let normals: Vec<Vector3<f64>> = b
        .normals
        .iter()
        .map(|n| {
            Vector3::new(
                dir.x * n.x + left.x * n.y,
                dir.y * n.x + left.y * n.y,
                n.z,
            )
        })
        .collect();

    debug!(
        segment = %segment.id,
        vertices = positions.len(),
        triangles = b.triangles.len(),
        openings = openings.len(),
        "segment mesh computed"
    );

    Ok(MeshPatch {
        segment: segment.id,
        content_hash,
        version: plan_types::PlanVersion::ZERO,
        positions,
        triangles: b.triangles,
        normals: b.normals,
        uvs: b.uvs,
    })
}
