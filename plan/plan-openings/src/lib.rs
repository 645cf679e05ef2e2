//! Opening management for PlanForge.
//!
//! Doors and windows live on wall segments. This crate validates their
//! placement (bounds, height range, pairwise clearance), applies edits
//! all-or-nothing, tracks openings orphaned by host-segment changes, and
//! computes the solid intervals a wall decomposes into once its openings
//! are subtracted, the primitive both the geometry kernel and skirting
//! placement build on.
//!
//! Validation order is fixed: (1) footprint within segment length,
//! (2) sill and head within the segment height range, (3) clearance against
//! the other openings on the same segment. The first failing check is the
//! error reported.
//!
//! # Example
//!
//! ```
//! use plan_openings::{OpeningOps, OpeningConfig};
//! use plan_catalog::{CatalogDefinition, HostKind, StaticCatalog};
//! use plan_types::{Plan, Shell, WallSegment, Point2, CatalogId};
//!
//! let mut plan = Plan::new();
//! let mut shell = Shell::new_open();
//! shell.segments.push(WallSegment::new(
//!     Point2::new(0.0, 0.0),
//!     Point2::new(5.0, 0.0),
//!     0.2,
//!     2.7,
//! ));
//! let segment_id = shell.segments[0].id;
//! plan.shells.push(shell);
//!
//! let catalog = StaticCatalog::from_definitions(vec![
//!     CatalogDefinition::new("door", 0.9, 2.1).with_host(HostKind::Wall),
//! ]);
//! let ops = OpeningOps::new(OpeningConfig::default());
//! let opening_id = ops
//!     .place(&mut plan, &catalog, segment_id, &CatalogId::new("door"), 2.0, 0.0)
//!     .unwrap();
//! assert!(plan.host_of_opening(opening_id).is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod intervals;
mod ops;

pub use error::{OpeningError, OpeningResult};
pub use intervals::{solid_intervals, Interval};
pub use ops::{OpeningConfig, OpeningOps, RevalidationOutcome};
