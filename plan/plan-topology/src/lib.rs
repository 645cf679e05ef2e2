//! Shell topology management for PlanForge.
//!
//! This crate maintains the wall-loop graph: which segments exist, how they
//! chain into shells, where their shared endpoints (joints) sit, and what
//! corner geometry each joint resolves to. The topology operations
//! ([`ShellTopology::add_segment`], [`ShellTopology::split_segment`],
//! [`ShellTopology::move_joint`], [`ShellTopology::remove_segment`]) report
//! the set of entities they invalidated so the caller can schedule remeshing
//! and revalidation.
//!
//! # Corner resolution
//!
//! A joint with exactly two adjacent segments resolves to a mitered corner:
//! the intersection of the two segments' offset boundary lines on each side.
//! Joints with three or more adjacent segments fall back to a butt join
//! (each segment end capped flat). Full N-way miter resolution is a known
//! simplification deliberately not attempted.
//!
//! # Example
//!
//! ```
//! use plan_topology::{ShellTopology, TopologyConfig};
//! use plan_types::{Plan, Shell, WallSegment, Point2};
//!
//! let mut plan = Plan::new();
//! let shell = Shell::new_open();
//! let shell_id = shell.id;
//! plan.shells.push(shell);
//!
//! let mut topology = ShellTopology::new(TopologyConfig::default());
//! let seg = WallSegment::new(Point2::new(0.0, 0.0), Point2::new(5.0, 0.0), 0.2, 2.7);
//! let invalidated = topology.add_segment(&mut plan, shell_id, seg).unwrap();
//! assert_eq!(invalidated.segments.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod corner;
mod error;
pub mod geom;
mod joints;
mod ops;

pub use corner::{resolve_corner, CornerGeometry};
pub use error::{TopologyError, TopologyResult};
pub use joints::{Joint, JointTable, SegmentEnd};
pub use ops::{Invalidated, ShellTopology, TopologyConfig};
