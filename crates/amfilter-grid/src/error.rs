//! Error types for the structured grid.

use thiserror::Error;

/// Errors from grid construction, indexing and interpolation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// Grid bounds are not strictly increasing on every axis.
    #[error("invalid grid bounds: {0}")]
    InvalidBounds(String),

    /// Edge length or cell counts are unusable.
    #[error("invalid grid resolution: {0}")]
    InvalidResolution(String),

    /// The number of grid points does not fit in memory addressing.
    #[error("grid with {0:?} cells is too large")]
    TooLarge([usize; 3]),

    /// Grid point index outside the grid.
    #[error("grid index {index:?} out of range for dimensions {dimensions:?}")]
    IndexOutOfRange {
        /// Requested `(i, j, k)`.
        index: [usize; 3],
        /// Grid point counts per axis.
        dimensions: [usize; 3],
    },

    /// Serialized index outside `[0, len)`.
    #[error("serialized index {index} out of range for grid of {len} points")]
    SerializedIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of grid points.
        len: usize,
    },

    /// Cell origin outside the grid's cells.
    #[error("cell {origin:?} out of range for grid with {cells:?} cells")]
    CellOutOfRange {
        /// Minimum corner index of the cell.
        origin: [usize; 3],
        /// Cell counts per axis.
        cells: [usize; 3],
    },

    /// Wrong number of scalar values for interpolation.
    #[error("incorrect number of scalar values: expected {expected}, got {actual}")]
    WrongScalarCount {
        /// Required count.
        expected: usize,
        /// Provided count.
        actual: usize,
    },

    /// Hex corners do not span a positive volume.
    #[error("hex element min corner {min:?} is not below max corner {max:?}")]
    DegenerateHex {
        /// Minimum corner.
        min: [f64; 3],
        /// Maximum corner.
        max: [f64; 3],
    },

    /// Interpolation point outside the hex element.
    #[error("point {0:?} outside hex element")]
    PointOutsideHex([f64; 3]),

    /// No grid cell contains the point.
    #[error("point {0:?} is not inside any grid cell")]
    NoContainingCell([f64; 3]),
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
