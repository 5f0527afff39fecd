//! Orthonormal frame of the structured grid.
//!
//! The grid is axis-aligned in its own `(u, v, w)` coordinates. `w` is the
//! build direction: layers are stacked along it.

use serde::{Deserialize, Serialize};

use crate::{determinant3, MathError, Point3, Tolerance, Vec3};

/// Right-handed orthonormal basis `(u, v, w)` of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[[f64; 3]; 3]", into = "[[f64; 3]; 3]")]
pub struct GridFrame {
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl GridFrame {
    /// The world axes; `z` is the build direction.
    pub fn identity() -> Self {
        Self {
            u: Vec3::x(),
            v: Vec3::y(),
            w: Vec3::z(),
        }
    }

    /// Build a frame from three basis vectors.
    ///
    /// Each vector must have unit length and be orthogonal to the others,
    /// and `(u x v) . w` must be positive.
    pub fn new(u: Vec3, v: Vec3, w: Vec3) -> Result<Self, MathError> {
        for (name, b) in [("u", &u), ("v", &v), ("w", &w)] {
            if (b.norm() - 1.0).abs() > Tolerance::BASIS {
                return Err(MathError::InvalidFrame(format!(
                    "basis vector {name} is not unit length"
                )));
            }
        }
        if u.dot(&v).abs() > Tolerance::BASIS
            || u.dot(&w).abs() > Tolerance::BASIS
            || v.dot(&w).abs() > Tolerance::BASIS
        {
            return Err(MathError::InvalidFrame("basis is not orthogonal".into()));
        }
        if determinant3(&u, &v, &w) < 0.0 {
            return Err(MathError::InvalidFrame(
                "basis is not positively oriented".into(),
            ));
        }
        Ok(Self { u, v, w })
    }

    /// Frame whose `w` axis points along `build_direction`.
    ///
    /// A build direction along +z yields the identity frame.
    pub fn from_build_direction(build_direction: Vec3) -> Result<Self, MathError> {
        let norm = build_direction.norm();
        if !norm.is_finite() || norm < 1e-10 {
            return Err(MathError::ZeroDirection);
        }
        let w = build_direction / norm;
        let helper = if w.y.abs() < 0.9 { Vec3::y() } else { Vec3::x() };
        let u = helper.cross(&w).normalize();
        let v = w.cross(&u);
        Self::new(u, v, w)
    }

    /// First in-layer axis.
    pub fn u(&self) -> &Vec3 {
        &self.u
    }

    /// Second in-layer axis.
    pub fn v(&self) -> &Vec3 {
        &self.v
    }

    /// Build direction.
    pub fn w(&self) -> &Vec3 {
        &self.w
    }

    /// Coordinates of a world point in this frame.
    pub fn to_local(&self, p: &Point3) -> Point3 {
        let c = p.coords;
        Point3::new(self.u.dot(&c), self.v.dot(&c), self.w.dot(&c))
    }

    /// World position of a point given in frame coordinates.
    pub fn to_world(&self, local: &Point3) -> Point3 {
        Point3::from(self.u * local.x + self.v * local.y + self.w * local.z)
    }
}

impl Default for GridFrame {
    fn default() -> Self {
        Self::identity()
    }
}

impl TryFrom<[[f64; 3]; 3]> for GridFrame {
    type Error = MathError;

    fn try_from(basis: [[f64; 3]; 3]) -> Result<Self, Self::Error> {
        let [u, v, w] = basis.map(Vec3::from);
        Self::new(u, v, w)
    }
}

impl From<GridFrame> for [[f64; 3]; 3] {
    fn from(frame: GridFrame) -> Self {
        [frame.u.into(), frame.v.into(), frame.w.into()]
    }
}
