//! Run placement for PlanForge.
//!
//! A [`Run`](plan_types::Run) describes repeated catalog items along a
//! path; this crate turns one into the derived, never-persisted sequence of
//! [`PlacedInstance`]s. [`resolve`] is a pure function of the path
//! geometry, the spacing policy, and the start/end offsets: identical
//! inputs produce identical sequences, across invocations and across
//! machines, which is what lets every session member recompute placements
//! locally instead of replicating them.
//!
//! # Example
//!
//! ```
//! use plan_runs::resolve;
//! use plan_types::{CatalogId, Point2, Run, RunPath, SpacingPolicy};
//!
//! let run = Run::new(
//!     CatalogId::new("downlight"),
//!     RunPath::Points(vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)]),
//!     SpacingPolicy::FixedCount(5),
//! );
//! let path = [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)];
//! let instances = resolve(&run, &path).unwrap();
//! assert_eq!(instances.len(), 5);
//! assert!((instances[1].distance - 2.5).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod path;
mod solver;

pub use error::{RunError, RunResult};
pub use path::{bound_path, Polyline};
pub use solver::{resolve, resolve_for_plan, PlacedInstance};
