//! Entity identifiers.
//!
//! Every addressable entity in a plan carries a UUID-backed id. Ids are
//! generated client-side at creation time so that speculative local state
//! and the authoritative copy agree on identity without a round trip.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random id.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifies a [`Plan`](crate::Plan).
    PlanId
);
entity_id!(
    /// Identifies a [`Shell`](crate::Shell).
    ShellId
);
entity_id!(
    /// Identifies a [`WallSegment`](crate::WallSegment).
    SegmentId
);
entity_id!(
    /// Identifies a joint (shared segment endpoint).
    JointId
);
entity_id!(
    /// Identifies an [`Opening`](crate::Opening).
    OpeningId
);
entity_id!(
    /// Identifies a [`Run`](crate::Run).
    RunId
);
entity_id!(
    /// Identifies an editing author (a session member).
    AuthorId
);
entity_id!(
    /// Client-generated idempotency id for an edit intent.
    IntentId
);

/// Identifies a catalog definition.
///
/// Catalog definitions are externally owned; their ids are stable strings
/// chosen by the catalog service (e.g. `"door_single_90"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(String);

impl CatalogId {
    /// Create a catalog id from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CatalogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CatalogId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A typed reference to any addressable plan entity.
///
/// Used where an operation targets "some entity" without caring which kind:
/// soft locks, spatial query results, invalidation reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    /// A shell.
    Shell(ShellId),
    /// A wall segment.
    Segment(SegmentId),
    /// A joint.
    Joint(JointId),
    /// An opening.
    Opening(OpeningId),
    /// A run.
    Run(RunId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(SegmentId::new(), SegmentId::new());
    }

    #[test]
    fn id_roundtrips_through_uuid() {
        let id = OpeningId::new();
        assert_eq!(OpeningId::from_uuid(id.as_uuid()), id);
    }

    #[test]
    fn catalog_id_display() {
        let id = CatalogId::new("door_single_90");
        assert_eq!(id.to_string(), "door_single_90");
        assert_eq!(id.as_str(), "door_single_90");
    }

    #[test]
    fn id_serde_is_transparent() {
        let id = SegmentId::new();
        let json = serde_json::to_string(&id).unwrap();
        // A bare UUID string, not a wrapper object.
        assert!(json.starts_with('"'));
        let back: SegmentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
