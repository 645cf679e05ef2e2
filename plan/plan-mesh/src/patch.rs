//! The derived mesh patch for one wall segment.

use nalgebra::{Point3, Vector3};

use plan_types::{PlanVersion, SegmentId};

/// Cached, derived triangle mesh for one wall segment.
///
/// Topology is indexed positions; normals are flat per triangle and UVs per
/// triangle corner, the overlay layout renderers consume directly. A patch
/// carries the content hash of the inputs it was computed from: the session
/// only publishes a patch whose hash still matches the live segment, which
/// is what makes superseded in-flight computations harmless.
///
/// Patches are never persisted; they are recomputed from the plan.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPatch {
    /// The segment this patch was computed for.
    pub segment: SegmentId,
    /// Hash of the meshing inputs, from
    /// [`segment_content_hash`](crate::segment_content_hash).
    pub content_hash: u64,
    /// The plan version the patch was computed at. Stamped by the session
    /// at publish time; zero until then.
    pub version: PlanVersion,
    /// Welded vertex positions, world space.
    pub positions: Vec<Point3<f64>>,
    /// Triangles as indices into `positions`, CCW from outside.
    pub triangles: Vec<[u32; 3]>,
    /// One outward normal per triangle (flat shading).
    pub normals: Vec<Vector3<f64>>,
    /// One UV per triangle corner.
    pub uvs: Vec<[[f64; 2]; 3]>,
}

impl MeshPatch {
    /// Create an empty patch for a segment.
    #[must_use]
    pub fn empty(segment: SegmentId, content_hash: u64) -> Self {
        Self {
            segment,
            content_hash,
            version: PlanVersion::ZERO,
            positions: Vec::new(),
            triangles: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
        }
    }

    /// Number of welded vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the patch holds no geometry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}
