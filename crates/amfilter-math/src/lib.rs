#![warn(missing_docs)]

//! Math types for the AM printability filter.
//!
//! Thin wrappers around nalgebra providing the geometric vocabulary shared
//! by the mesh, grid and filter crates: points, vectors, bounding boxes,
//! the orthonormal grid frame and tolerance constants.

use nalgebra::Vector3;
use thiserror::Error;

mod bbox;
mod frame;

pub use bbox::Aabb3;
pub use frame::GridFrame;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// Errors from math type construction.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MathError {
    /// Basis vectors do not form a valid orthonormal right-handed frame.
    #[error("invalid grid frame: {0}")]
    InvalidFrame(String),

    /// A direction vector has zero (or non-finite) length.
    #[error("direction vector has zero length")]
    ZeroDirection,
}

/// Tolerance constants for the filter's geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance;

impl Tolerance {
    /// Absolute slack when testing a point against a hex cell.
    pub const POINT_IN_HEX: f64 = 1e-14;

    /// Allowed excursion of barycentric weights outside `[0, 1]`.
    pub const BARYCENTRIC: f64 = 1e-14;

    /// Tetrahedra with a smaller edge-matrix determinant are singular.
    pub const SINGULAR_TET: f64 = 1e-12;

    /// Unit length / orthogonality slack for grid frame basis vectors.
    pub const BASIS: f64 = 1e-12;

    /// Relative growth of tetrahedron bounding boxes for point location.
    pub const TET_BOX_GROWTH: f64 = 1e-2;
}

/// Determinant of the 3x3 matrix whose columns are `a`, `b`, `c`.
pub fn determinant3(a: &Vec3, b: &Vec3, c: &Vec3) -> f64 {
    a.dot(&b.cross(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinant_identity() {
        let d = determinant3(&Vec3::x(), &Vec3::y(), &Vec3::z());
        assert!((d - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_determinant_swapped_columns() {
        let d = determinant3(&Vec3::y(), &Vec3::x(), &Vec3::z());
        assert!((d + 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_determinant_scaled() {
        let d = determinant3(
            &Vec3::new(2.0, 0.0, 0.0),
            &Vec3::new(0.0, 3.0, 0.0),
            &Vec3::new(1.0, 1.0, 4.0),
        );
        assert!((d - 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_determinant_coplanar_is_zero() {
        let d = determinant3(
            &Vec3::new(1.0, 0.0, 0.0),
            &Vec3::new(0.0, 1.0, 0.0),
            &Vec3::new(1.0, 1.0, 0.0),
        );
        assert_eq!(d, 0.0);
    }
}
