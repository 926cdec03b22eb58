//! Error types for the KD-tree builder.

use thiserror::Error;

/// Errors that can occur while registering triangles or building the tree.
///
/// The build algorithm itself is total; every variant is a caller-side
/// precondition violation surfaced immediately.
#[derive(Error, Debug)]
pub enum KdTreeError {
    /// Triangle index past the count the builder was sized for.
    #[error("triangle index {index} out of range for {count} triangles")]
    IndexOutOfRange {
        /// The offending triangle index.
        index: usize,
        /// The number of triangles the builder was sized for.
        count: usize,
    },

    /// Build invoked before any triangle was registered.
    #[error("no triangles registered")]
    EmptyInput,

    /// An index inside the registered range was never given a triangle.
    #[error("triangle {0} was never registered")]
    MissingTriangle(usize),

    /// Mesh vertex/index buffers are inconsistent.
    #[error("malformed mesh: {0}")]
    MalformedMesh(String),
}

/// Result type for KD-tree operations.
pub type Result<T> = std::result::Result<T, KdTreeError>;
