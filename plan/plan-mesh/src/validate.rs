//! Mesh patch validation.
//!
//! Checks the guarantees the kernel makes: watertight (every edge shared by
//! exactly two triangles), manifold (no edge shared by more), and no
//! degenerate triangles.

use hashbrown::HashMap;

use crate::patch::MeshPatch;

/// Result of validating a mesh patch.
#[derive(Debug, Clone)]
pub struct PatchValidation {
    /// Welded vertex count.
    pub vertex_count: usize,
    /// Triangle count.
    pub triangle_count: usize,
    /// Edges used by exactly one triangle. Zero for a watertight patch.
    pub boundary_edge_count: usize,
    /// Edges used by more than two triangles. Zero for a manifold patch.
    pub non_manifold_edge_count: usize,
    /// Triangles with repeated indices or (near) zero area.
    pub degenerate_triangle_count: usize,
}

impl PatchValidation {
    /// Every edge is shared by exactly two triangles.
    #[must_use]
    pub const fn is_watertight(&self) -> bool {
        self.boundary_edge_count == 0
    }

    /// No edge is shared by more than two triangles and no triangle is
    /// degenerate.
    #[must_use]
    pub const fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0 && self.degenerate_triangle_count == 0
    }

    /// All checks pass.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.is_watertight() && self.is_manifold()
    }
}

impl std::fmt::Display for PatchValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Patch validation:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(
            f,
            "  Watertight: {} (boundary edges: {})",
            if self.is_watertight() { "yes" } else { "NO" },
            self.boundary_edge_count
        )?;
        writeln!(
            f,
            "  Manifold: {} (non-manifold edges: {}, degenerate triangles: {})",
            if self.is_manifold() { "yes" } else { "NO" },
            self.non_manifold_edge_count,
            self.degenerate_triangle_count
        )
    }
}

/// Validate a patch's topology.
#[must_use]
pub fn validate_patch(patch: &MeshPatch) -> PatchValidation {
    let mut edge_use: HashMap<(u32, u32), u32> = HashMap::new();
    let mut degenerate = 0usize;

    for tri in &patch.triangles {
        let [a, b, c] = *tri;
        if a == b || b == c || a == c {
            degenerate += 1;
            continue;
        }

        let pa = patch.positions[a as usize];
        let pb = patch.positions[b as usize];
        let pc = patch.positions[c as usize];
        let area2 = (pb - pa).cross(&(pc - pa)).norm();
        if area2 < 1e-12 {
            degenerate += 1;
        }

        for (u, v) in [(a, b), (b, c), (c, a)] {
            let key = (u.min(v), u.max(v));
            *edge_use.entry(key).or_insert(0) += 1;
        }
    }

    let boundary = edge_use.values().filter(|&&n| n == 1).count();
    let non_manifold = edge_use.values().filter(|&&n| n > 2).count();

    PatchValidation {
        vertex_count: patch.positions.len(),
        triangle_count: patch.triangles.len(),
        boundary_edge_count: boundary,
        non_manifold_edge_count: non_manifold,
        degenerate_triangle_count: degenerate,
    }
}
