//! Geometry kernel for PlanForge.
//!
//! Turns one wall segment plus its validated openings into a closed
//! manifold triangle mesh, the [`MeshPatch`], deterministically, in a
//! local segment frame, with outward normals and UVs continuous along the
//! wall's length axis.
//!
//! # Approach
//!
//! Openings on a wall are axis-aligned rectangles in the wall's own frame,
//! so the kernel cuts them by rectangle decomposition instead of a general
//! mesh boolean: each wall face becomes a grid of cells bounded by every
//! opening edge, cells inside an opening are skipped, and reveal faces
//! (jambs, lintel, sill) close the cut through the wall's thickness. The
//! decomposition is exact and cannot produce sliver triangles; a snapping
//! epsilon still welds coincident grid vertices.
//!
//! # Contract
//!
//! Inputs must already be validated by the opening manager: openings
//! non-overlapping and inside the segment's bounds. The kernel re-checks
//! and reports [`MeshError::InvariantViolation`] if that contract is
//! broken; that is a bug upstream, not a recoverable condition.
//!
//! # Example
//!
//! ```
//! use plan_mesh::{compute_segment_mesh, validate_patch, MeshConfig};
//! use plan_types::{Point2, WallSegment};
//!
//! let segment = WallSegment::new(
//!     Point2::new(0.0, 0.0),
//!     Point2::new(5.0, 0.0),
//!     0.2,
//!     2.7,
//! );
//! let patch = compute_segment_mesh(&segment, &MeshConfig::default()).unwrap();
//! assert!(validate_patch(&patch).is_watertight());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod batch;
mod config;
mod error;
mod hash;
mod patch;
mod slab;
mod validate;

pub use batch::compute_patches;
pub use config::MeshConfig;
pub use error::{MeshError, MeshResult};
pub use hash::segment_content_hash;
pub use patch::MeshPatch;
pub use slab::compute_segment_mesh;
pub use validate::{validate_patch, PatchValidation};
