//! Core data model for PlanForge.
//!
//! This crate provides the plain-data aggregates that every other PlanForge
//! crate operates on:
//!
//! - [`Plan`] - Root aggregate: shells, runs, and a monotonic [`PlanVersion`]
//! - [`Shell`] - Ordered chain or loop of [`WallSegment`]s
//! - [`WallSegment`] - A straight wall with thickness, height range, and openings
//! - [`Opening`] - A door/window instance hosted by a segment
//! - [`Run`] - A repeated-placement definition along a path
//!
//! # Ownership
//!
//! A `Plan` owns its `Shell`s, which own their `WallSegment`s, which own
//! their `Opening`s as values. Runs hold a non-owning path binding to the
//! shell they follow. Nothing here references engine or session state; all
//! services take an explicit `&Plan` or `&mut Plan`.
//!
//! # Units and Coordinates
//!
//! Plan space is 2D with `f64` coordinates in meters. Heights (`base_z`,
//! segment height, sill) are meters along the world Z axis. Derived 3D
//! geometry uses a right-handed system, Z up.
//!
//! # Example
//!
//! ```
//! use plan_types::{Plan, Shell, WallSegment, Point2};
//!
//! let mut plan = Plan::new();
//! let mut shell = Shell::new_open();
//! shell.segments.push(WallSegment::new(
//!     Point2::new(0.0, 0.0),
//!     Point2::new(5.0, 0.0),
//!     0.2,
//!     2.7,
//! ));
//! let shell_id = shell.id;
//! plan.shells.push(shell);
//!
//! assert!(plan.shell(shell_id).is_some());
//! assert_eq!(plan.version.get(), 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod ids;
mod opening;
mod plan;
mod run;
mod segment;
mod shell;
mod version;

pub use error::{PlanError, PlanResult};
pub use ids::{
    AuthorId, CatalogId, EntityRef, IntentId, JointId, OpeningId, PlanId, RunId, SegmentId,
    ShellId,
};
pub use opening::{Opening, OpeningExtent};
pub use plan::Plan;
pub use run::{Run, RunPath, SpacingPolicy};
pub use segment::{SkirtingProfile, WallSegment};
pub use shell::Shell;
pub use version::PlanVersion;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};
