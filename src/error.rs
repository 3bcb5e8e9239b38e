//! Error types for burnish.
//!
//! All fallible operations in the crate return [`Result`] with [`MeshError`].
//! Fairing distinguishes recoverable precondition failures
//! ([`MeshError::MissingConstraints`]) from hard numerical failures
//! ([`MeshError::SingularSystem`]) so callers can decide whether to retry
//! after adjusting the constraint set.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh construction, fairing, or I/O.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices (degenerate triangle).
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A directed edge appears in more than one face.
    #[error("edge ({v0}, {v1}) is shared by more than two faces or inconsistently oriented")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// No vertex is locked, so the fairing system has no boundary constraints.
    ///
    /// Raised before any matrix assembly. Recoverable: select vertices or
    /// use a mesh with a boundary, then call again.
    #[error("missing boundary constraints: no vertex is locked")]
    MissingConstraints,

    /// The constrained system restricted to free vertices could not be solved.
    ///
    /// This happens when the lock set fails to pin down the operator's null
    /// space, for example when a connected component of free vertices has no
    /// locked vertex anywhere in it.
    #[error("constrained system is singular or could not be solved")]
    SingularSystem,

    /// Iterative solver exhausted its iteration budget.
    #[error("solver failed to converge after {iterations} iterations")]
    ConvergenceFailed {
        /// Number of iterations attempted.
        iterations: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading a mesh from a file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving a mesh to a file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
