//! Trilinear interpolation on an axis-aligned hex cell.
//!
//! Corner order (bit 0 = x, bit 1 = y, bit 2 = z):
//!
//! ```text
//! 0: (min, min, min)   4: (min, min, max)
//! 1: (max, min, min)   5: (max, min, max)
//! 2: (min, max, min)   6: (min, max, max)
//! 3: (max, max, min)   7: (max, max, max)
//! ```

use amfilter_math::{Point3, Tolerance};

use crate::error::{GridError, Result};

/// Number of corners of a hex cell.
pub const HEX_CORNERS: usize = 8;

/// Axis-aligned hexahedral cell with a trilinear scalar field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegularHex8 {
    min: Point3,
    max: Point3,
    volume: f64,
}

impl RegularHex8 {
    /// Create a cell from its min and max corners.
    pub fn new(min: Point3, max: Point3) -> Result<Self> {
        if !(min.x < max.x && min.y < max.y && min.z < max.z) {
            return Err(GridError::DegenerateHex {
                min: min.into(),
                max: max.into(),
            });
        }
        let e = max - min;
        Ok(Self {
            min,
            max,
            volume: e.x * e.y * e.z,
        })
    }

    /// Minimum corner.
    pub fn min(&self) -> &Point3 {
        &self.min
    }

    /// Maximum corner.
    pub fn max(&self) -> &Point3 {
        &self.max
    }

    /// Product of the edge lengths.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Position of corner `c` (0..8).
    pub fn corner(&self, c: usize) -> Point3 {
        Point3::new(
            if c & 1 == 0 { self.min.x } else { self.max.x },
            if c & 2 == 0 { self.min.y } else { self.max.y },
            if c & 4 == 0 { self.min.z } else { self.max.z },
        )
    }

    /// Interpolate the corner `values` at `point`.
    pub fn interpolate(&self, point: &Point3, values: &[f64]) -> Result<f64> {
        if values.len() != HEX_CORNERS {
            return Err(GridError::WrongScalarCount {
                expected: HEX_CORNERS,
                actual: values.len(),
            });
        }
        self.check_point(point)?;

        let a = self.coefficients(values);
        let (x, y, z) = (point.x, point.y, point.z);
        Ok(a[0]
            + a[1] * x
            + a[2] * y
            + a[3] * z
            + a[4] * x * y
            + a[5] * x * z
            + a[6] * y * z
            + a[7] * x * y * z)
    }

    /// Trilinear shape function values at `point`, one per corner.
    ///
    /// These are the derivatives of [`interpolate`](Self::interpolate) with
    /// respect to each corner value; they sum to one.
    pub fn shape_functions(&self, point: &Point3) -> Result<[f64; HEX_CORNERS]> {
        self.check_point(point)?;
        let mut n = [0.0; HEX_CORNERS];
        for (c, nc) in n.iter_mut().enumerate() {
            let [(ax, bx), (ay, by), (az, bz)] = self.linear_factors(c);
            *nc = (ax + bx * point.x) * (ay + by * point.y) * (az + bz * point.z) / self.volume;
        }
        Ok(n)
    }

    fn check_point(&self, p: &Point3) -> Result<()> {
        let tol = Tolerance::POINT_IN_HEX;
        for axis in 0..3 {
            if p[axis] < self.min[axis] - tol || p[axis] > self.max[axis] + tol {
                return Err(GridError::PointOutsideHex((*p).into()));
            }
        }
        Ok(())
    }

    /// Per-axis `(alpha, beta)` such that corner `c`'s shape function is
    /// `prod(alpha + beta * x) / volume`.
    fn linear_factors(&self, c: usize) -> [(f64, f64); 3] {
        let mut f = [(0.0, 0.0); 3];
        for (axis, fa) in f.iter_mut().enumerate() {
            *fa = if c & (1 << axis) == 0 {
                (self.max[axis], -1.0)
            } else {
                (-self.min[axis], 1.0)
            };
        }
        f
    }

    /// Coefficients `a0..a7` of
    /// `a0 + a1 x + a2 y + a3 z + a4 xy + a5 xz + a6 yz + a7 xyz`.
    fn coefficients(&self, values: &[f64]) -> [f64; 8] {
        let mut a = [0.0; 8];
        for (c, &s) in values.iter().enumerate() {
            let [(ax, bx), (ay, by), (az, bz)] = self.linear_factors(c);
            a[0] += s * ax * ay * az;
            a[1] += s * bx * ay * az;
            a[2] += s * ax * by * az;
            a[3] += s * ax * ay * bz;
            a[4] += s * bx * by * az;
            a[5] += s * bx * ay * bz;
            a[6] += s * ax * by * bz;
            a[7] += s * bx * by * bz;
        }
        a.map(|ak| ak / self.volume)
    }
}
