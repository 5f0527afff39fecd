//! Error types for the printability filter.

use amfilter_grid::GridError;
use amfilter_mesh::MeshError;
use thiserror::Error;

/// Errors that can occur while building or applying the filter.
#[derive(Error, Debug)]
pub enum FilterError {
    /// Invalid tetrahedral mesh or tet query.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Invalid grid construction or grid query.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// A buffer does not have the length the mesh or grid requires.
    #[error("{what} has length {actual}, expected {expected}")]
    SizeMismatch {
        /// Which buffer.
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Provided length.
        actual: usize,
    },

    /// Mesh node index out of range.
    #[error("node index {index} out of range for mesh with {len} nodes")]
    IndexOutOfRange {
        /// Requested node.
        index: usize,
        /// Number of mesh nodes.
        len: usize,
    },

    /// Layer index out of range.
    #[error("layer {layer} out of range for grid with {layers} layers")]
    LayerOutOfRange {
        /// Requested layer.
        layer: usize,
        /// Number of layers.
        layers: usize,
    },

    /// Cached containing tet does not contain its grid point.
    #[error("barycentric weights {weights:?} of grid point {grid_point} out of range")]
    BarycentricOutOfRange {
        /// Serialized grid index.
        grid_point: usize,
        /// Offending weights.
        weights: [f64; 4],
    },

    /// Smooth max of a negative value.
    #[error("smooth max arguments must be non-negative, got {0}")]
    NegativeArgument(f64),

    /// Smooth max of nothing.
    #[error("smooth max needs at least one argument")]
    EmptyArguments,

    /// The corrected exponent `q` is not positive.
    #[error("p-norm exponent {p} is too small for {count} arguments")]
    InvalidExponent {
        /// Requested exponent.
        p: f64,
        /// Number of arguments.
        count: usize,
    },

    /// A mesh node lies in no grid cell.
    #[error("mesh node {0} is outside the grid")]
    NodeOutsideGrid(usize),

    /// Invalid filter settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings could not be parsed.
    #[error("failed to parse settings: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
