//! Error types for session coordination.

use thiserror::Error;

use plan_mesh::MeshError;
use plan_net::RejectReason;
use plan_openings::OpeningError;
use plan_runs::RunError;
use plan_topology::TopologyError;

/// Errors from applying an edit operation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Topology operation failed.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// Opening validation failed.
    #[error(transparent)]
    Opening(#[from] OpeningError),

    /// Run resolution failed.
    #[error(transparent)]
    Run(#[from] RunError),

    /// Mesh generation failed.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// A referenced entity does not exist.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// An entity with this id already exists.
    #[error("duplicate entity: {0}")]
    DuplicateEntity(String),
}

impl SessionError {
    /// Map onto the wire-level rejection taxonomy.
    #[must_use]
    pub fn reject_reason(&self) -> RejectReason {
        match self {
            Self::Topology(err) => match err {
                TopologyError::UnknownShell { .. }
                | TopologyError::UnknownSegment { .. }
                | TopologyError::UnknownJoint { .. } => RejectReason::UnknownEntity {
                    message: err.to_string(),
                },
                TopologyError::InvalidDimensions { .. } => RejectReason::Validation {
                    message: err.to_string(),
                },
                _ => RejectReason::GeometryConflict {
                    message: err.to_string(),
                },
            },
            Self::Opening(err) => match err {
                OpeningError::UnknownSegment { .. }
                | OpeningError::UnknownOpening { .. }
                | OpeningError::UnknownDefinition { .. } => RejectReason::UnknownEntity {
                    message: err.to_string(),
                },
                _ => RejectReason::Validation {
                    message: err.to_string(),
                },
            },
            Self::Run(err) => match err {
                RunError::UnboundPath { .. } => RejectReason::UnknownEntity {
                    message: err.to_string(),
                },
                _ => RejectReason::Validation {
                    message: err.to_string(),
                },
            },
            Self::Mesh(err) => RejectReason::Internal {
                message: err.to_string(),
            },
            Self::UnknownEntity(message) => RejectReason::UnknownEntity {
                message: message.clone(),
            },
            Self::DuplicateEntity(message) => RejectReason::Validation {
                message: message.clone(),
            },
        }
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
