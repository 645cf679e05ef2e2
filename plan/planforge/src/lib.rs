//! PlanForge: a procedural shell-geometry and opening-cutout engine.
//!
//! PlanForge turns a 2D architectural plan (wall loops, door and window
//! placements, repeated fixture runs) into validated, editable,
//! renderable 3D geometry, kept consistent across concurrently-editing
//! clients. This facade crate re-exports the whole family:
//!
//! - [`types`] - The plain-data model: plans, shells, segments, openings, runs
//! - [`catalog`] - Read-only catalog definitions and the source seam
//! - [`topology`] - Segment operations, joints, corner resolution
//! - [`openings`] - Opening validation, solid intervals, orphan tracking
//! - [`mesh`] - The geometry kernel: manifold wall slabs with cutouts
//! - [`runs`] - Deterministic run placement along paths
//! - [`net`] - Intent/delta messages and the ordered channel seam
//! - [`session`] - Authority and client session coordination
//! - [`spatial`] - Snap and proximity queries
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use planforge::catalog::{CatalogDefinition, HostKind, StaticCatalog};
//! use planforge::net::{EditIntent, EditOp};
//! use planforge::session::{PlanAuthority, SessionConfig};
//! use planforge::types::{AuthorId, Plan, Point2, Shell, WallSegment};
//!
//! let catalog = Arc::new(StaticCatalog::from_definitions(vec![
//!     CatalogDefinition::new("door", 0.9, 2.1).with_host(HostKind::Wall),
//! ]));
//! let mut authority = PlanAuthority::new(Plan::new(), catalog, SessionConfig::default());
//!
//! let author = AuthorId::new();
//! let shell = Shell::new_open();
//! let shell_id = shell.id;
//! let outcome = authority.submit(&EditIntent::new(
//!     author,
//!     authority.version(),
//!     EditOp::AddShell { shell },
//! ));
//! # let _ = outcome;
//!
//! let outcome = authority.submit(&EditIntent::new(
//!     author,
//!     authority.version(),
//!     EditOp::AddSegment {
//!         shell: shell_id,
//!         segment: WallSegment::new(
//!             Point2::new(0.0, 0.0),
//!             Point2::new(5.0, 0.0),
//!             0.2,
//!             2.7,
//!         ),
//!     },
//! ));
//! # let _ = outcome;
//!
//! let patches = authority.regenerate_meshes();
//! assert_eq!(patches.published.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

/// The plain-data model.
pub mod types {
    pub use plan_types::*;
}

/// Read-only catalog definitions.
pub mod catalog {
    pub use plan_catalog::*;
}

/// Shell topology management.
pub mod topology {
    pub use plan_topology::*;
}

/// Opening placement and validation.
pub mod openings {
    pub use plan_openings::*;
}

/// The geometry kernel.
pub mod mesh {
    pub use plan_mesh::*;
}

/// Run placement.
pub mod runs {
    pub use plan_runs::*;
}

/// Session messages and channels.
pub mod net {
    pub use plan_net::*;
}

/// Session coordination.
pub mod session {
    pub use plan_session::*;
}

/// Snap and proximity queries.
pub mod spatial {
    pub use pf_spatial::*;
}
