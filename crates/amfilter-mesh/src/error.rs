//! Error types for the tetrahedral mesh.

use thiserror::Error;

/// Errors from mesh construction and tetrahedron queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Mesh has no tetrahedra or fewer than four nodes.
    #[error("mesh is empty: expected at least one tetrahedron and four nodes")]
    Empty,

    /// A tetrahedron references a node that does not exist.
    #[error("node index {node} out of range for mesh with {node_count} nodes")]
    NodeOutOfRange {
        /// Offending node index.
        node: usize,
        /// Number of nodes in the mesh.
        node_count: usize,
    },

    /// A tetrahedron lists the same node more than once.
    #[error("tetrahedron {0:?} repeats a node index")]
    RepeatedNode([usize; 4]),

    /// Node coordinates are NaN or infinite.
    #[error("node {0} has non-finite coordinates")]
    NonFiniteCoordinate(usize),

    /// Tetrahedron has (near) zero volume.
    #[error("tetrahedron {nodes:?} is singular (determinant {determinant:e})")]
    SingularTetrahedron {
        /// Node indices of the tetrahedron.
        nodes: [usize; 4],
        /// Determinant of its edge matrix.
        determinant: f64,
    },
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
