//! Catalog definitions for placeable parts.
//!
//! The catalog is an external collaborator: this crate only defines the
//! read-only metadata shape the engine consumes ([`CatalogDefinition`]),
//! the seam it consumes it through ([`CatalogSource`]), and a vec-backed
//! [`StaticCatalog`] for embedding and tests. Definitions are assumed
//! stable for the duration of an edit; the engine never synchronizes
//! catalog access.
//!
//! # Example
//!
//! ```
//! use plan_catalog::{CatalogDefinition, CatalogSource, HostKind, StaticCatalog};
//! use plan_types::CatalogId;
//!
//! let catalog = StaticCatalog::from_definitions(vec![
//!     CatalogDefinition::new("door_single_90", 0.9, 2.1).with_host(HostKind::Wall),
//! ]);
//!
//! let def = catalog.definition(&CatalogId::new("door_single_90")).unwrap();
//! assert_eq!(def.nominal_width, 0.9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

use plan_types::CatalogId;

/// Where a catalog part may be hosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HostKind {
    /// Free-standing on the floor.
    #[default]
    Floor,
    /// Cut into or mounted on a wall segment (doors, windows).
    Wall,
    /// Mounted on the ceiling (downlights, vents).
    Ceiling,
}

/// Frame offsets for wall-hosted parts.
///
/// Distances from the nominal opening rectangle to the visible frame, used
/// by the renderer collaborator; the cutout itself uses the nominal size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameOffsets {
    /// Offset at the head (top), in meters.
    pub head: f64,
    /// Offset at each jamb (side), in meters.
    pub jamb: f64,
    /// Offset at the sill (bottom), in meters.
    pub sill: f64,
}

/// Read-only parametric metadata for one placeable part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDefinition {
    /// Stable catalog id.
    pub id: CatalogId,
    /// Human-readable name.
    pub display_name: String,
    /// Nominal width, in meters.
    pub nominal_width: f64,
    /// Nominal height, in meters.
    pub nominal_height: f64,
    /// Frame offsets for wall-hosted parts.
    #[serde(default)]
    pub frame_offsets: FrameOffsets,
    /// Where this part may be hosted.
    #[serde(default)]
    pub host: HostKind,
    /// Free-form classification tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CatalogDefinition {
    /// Create a definition with the given id and nominal size.
    #[must_use]
    pub fn new(id: impl Into<String>, nominal_width: f64, nominal_height: f64) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id: CatalogId::new(id),
            nominal_width,
            nominal_height,
            frame_offsets: FrameOffsets::default(),
            host: HostKind::default(),
            tags: Vec::new(),
        }
    }

    /// Set the host kind, builder style.
    #[must_use]
    pub fn with_host(mut self, host: HostKind) -> Self {
        self.host = host;
        self
    }

    /// Set the frame offsets, builder style.
    #[must_use]
    pub fn with_frame_offsets(mut self, offsets: FrameOffsets) -> Self {
        self.frame_offsets = offsets;
        self
    }

    /// Add a classification tag, builder style.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// Errors from catalog lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No definition with the requested id.
    #[error("unknown catalog definition: {id}")]
    UnknownDefinition {
        /// The id that failed to resolve.
        id: CatalogId,
    },
}

/// Result type for catalog lookups.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// The seam the engine consumes catalog metadata through.
pub trait CatalogSource {
    /// Look up a definition by id. `None` if unknown.
    fn definition(&self, id: &CatalogId) -> Option<&CatalogDefinition>;

    /// Look up a definition by id, as a result.
    ///
    /// # Errors
    ///
    /// [`CatalogError::UnknownDefinition`] if the id does not resolve.
    fn require(&self, id: &CatalogId) -> CatalogResult<&CatalogDefinition> {
        self.definition(id)
            .ok_or_else(|| CatalogError::UnknownDefinition { id: id.clone() })
    }
}

/// A vec-backed catalog for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    definitions: Vec<CatalogDefinition>,
}

impl StaticCatalog {
    /// Build a catalog from a list of definitions.
    #[must_use]
    pub fn from_definitions(definitions: Vec<CatalogDefinition>) -> Self {
        Self { definitions }
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl CatalogSource for StaticCatalog {
    fn definition(&self, id: &CatalogId) -> Option<&CatalogDefinition> {
        self.definitions.iter().find(|d| &d.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StaticCatalog {
        StaticCatalog::from_definitions(vec![
            CatalogDefinition::new("door_single_90", 0.9, 2.1)
                .with_host(HostKind::Wall)
                .with_tag("door"),
            CatalogDefinition::new("window_120", 1.2, 1.2)
                .with_host(HostKind::Wall)
                .with_frame_offsets(FrameOffsets {
                    head: 0.02,
                    jamb: 0.02,
                    sill: 0.03,
                }),
        ])
    }

    #[test]
    fn lookup_by_id() {
        let catalog = sample();
        let def = catalog.definition(&CatalogId::new("window_120"));
        assert!(def.is_some());
        assert_eq!(def.map(|d| d.host), Some(HostKind::Wall));
    }

    #[test]
    fn require_reports_unknown_ids() {
        let catalog = sample();
        let err = catalog.require(&CatalogId::new("missing"));
        assert!(matches!(
            err,
            Err(CatalogError::UnknownDefinition { .. })
        ));
    }

    #[test]
    fn definition_serde_roundtrip() {
        let def = CatalogDefinition::new("door_single_90", 0.9, 2.1).with_host(HostKind::Wall);
        let json = serde_json::to_string(&def).unwrap();
        let back: CatalogDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, def);
    }
}
