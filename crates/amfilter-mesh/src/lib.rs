#![warn(missing_docs)]

//! Tetrahedral design mesh for the AM printability filter.
//!
//! Exposes node coordinates, tet connectivity, barycentric coordinates and
//! point location. The mesh is immutable once built; everything the filter
//! caches is derived from it.
//!
//! # Example
//!
//! ```
//! use amfilter_math::Point3;
//! use amfilter_mesh::TetMesh;
//!
//! let mesh = TetMesh::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!         Point3::new(0.0, 0.0, 1.0),
//!     ],
//!     vec![[0, 1, 2, 3]],
//! )?;
//!
//! let w = mesh.barycentric_coordinates(&[0, 1, 2, 3], &Point3::new(0.25, 0.25, 0.25))?;
//! assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
//! # Ok::<(), amfilter_mesh::MeshError>(())
//! ```

pub mod bvh;
pub mod error;

pub use bvh::TetBvh;
pub use error::{MeshError, Result};

use amfilter_math::{determinant3, Aabb3, GridFrame, Point3, Tolerance, Vec3};
use rayon::prelude::*;

/// Four node indices of a tetrahedron.
pub type Tet = [usize; 4];

/// Unstructured tetrahedral mesh.
#[derive(Debug, Clone)]
pub struct TetMesh {
    coordinates: Vec<Point3>,
    connectivity: Vec<Tet>,
}

impl TetMesh {
    /// Create a mesh from node positions and tetrahedra.
    ///
    /// Requires at least one tetrahedron and four nodes, finite coordinates,
    /// node indices in range, no repeated node within a tetrahedron and a
    /// non-zero volume for every tetrahedron.
    pub fn new(coordinates: Vec<Point3>, connectivity: Vec<Tet>) -> Result<Self> {
        if connectivity.is_empty() || coordinates.len() < 4 {
            return Err(MeshError::Empty);
        }
        if let Some(node) = coordinates
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(MeshError::NonFiniteCoordinate(node));
        }
        for tet in &connectivity {
            check_tet(tet, coordinates.len())?;
            let det = tet_determinant(&coordinates, tet);
            if det.abs() < Tolerance::SINGULAR_TET {
                return Err(MeshError::SingularTetrahedron {
                    nodes: *tet,
                    determinant: det,
                });
            }
        }
        Ok(Self {
            coordinates,
            connectivity,
        })
    }

    /// Create a mesh from raw coordinate triples.
    pub fn from_arrays(coordinates: &[[f64; 3]], connectivity: &[Tet]) -> Result<Self> {
        Self::new(
            coordinates.iter().map(|c| Point3::from(*c)).collect(),
            connectivity.to_vec(),
        )
    }

    /// Node positions, indexed by node id.
    pub fn coordinates(&self) -> &[Point3] {
        &self.coordinates
    }

    /// Tetrahedra, each as four node ids.
    pub fn connectivity(&self) -> &[Tet] {
        &self.connectivity
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.coordinates.len()
    }

    /// Number of tetrahedra.
    pub fn tet_count(&self) -> usize {
        self.connectivity.len()
    }

    /// Barycentric coordinates of `point` with respect to `tet`.
    ///
    /// The four weights sum to one. Points on the boundary may produce
    /// weights slightly outside `[0, 1]`; points outside the tet produce
    /// weights well outside it.
    pub fn barycentric_coordinates(&self, tet: &Tet, point: &Point3) -> Result<[f64; 4]> {
        check_tet(tet, self.coordinates.len())?;

        let r4 = self.coordinates[tet[3]];
        let c1 = self.coordinates[tet[0]] - r4;
        let c2 = self.coordinates[tet[1]] - r4;
        let c3 = self.coordinates[tet[2]] - r4;
        let rhs = point - r4;

        // Cramer's rule on [c1 c2 c3] * (l1, l2, l3) = rhs
        let det = tet_determinant(&self.coordinates, tet);
        if det.abs() < Tolerance::SINGULAR_TET {
            return Err(MeshError::SingularTetrahedron {
                nodes: *tet,
                determinant: det,
            });
        }
        let inv = 1.0 / det;

        let l1 = determinant3(&rhs, &c2, &c3) * inv;
        let l2 = determinant3(&c1, &rhs, &c3) * inv;
        let l3 = determinant3(&c1, &c2, &rhs) * inv;
        Ok([l1, l2, l3, 1.0 - l1 - l2 - l3])
    }

    /// Whether `point` lies inside `tet` (boundary inclusive).
    pub fn contains_point(&self, tet: &Tet, point: &Point3) -> Result<bool> {
        check_tet(tet, self.coordinates.len())?;
        Ok(point_in_tet(&self.coordinates, tet, point))
    }

    /// Bounding box of a tetrahedron in world coordinates.
    pub fn tet_aabb(&self, tet: &Tet) -> Aabb3 {
        Aabb3::from_points(tet.iter().map(|&n| &self.coordinates[n]))
    }

    /// Bounding box of all nodes, expressed in the coordinates of `frame`.
    pub fn bounding_box(&self, frame: &GridFrame) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for p in &self.coordinates {
            aabb.include_point(&frame.to_local(p));
        }
        aabb
    }

    /// Length of the shortest tetrahedron edge.
    pub fn min_edge_length(&self) -> f64 {
        const EDGES: [(usize, usize); 6] = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];

        self.connectivity
            .iter()
            .flat_map(|tet| {
                EDGES.iter().map(move |&(a, b)| {
                    (self.coordinates[tet[a]] - self.coordinates[tet[b]]).norm()
                })
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// Find a tetrahedron containing each point.
    ///
    /// `None` marks a point outside the mesh. When several tetrahedra
    /// contain a point (shared faces, edges or vertices) the one with the
    /// highest index wins.
    pub fn locate_points(&self, points: &[Point3]) -> Vec<Option<usize>> {
        let boxes: Vec<Aabb3> = self
            .connectivity
            .iter()
            .map(|tet| {
                let mut aabb = self.tet_aabb(tet);
                aabb.grow_relative(Tolerance::TET_BOX_GROWTH);
                aabb
            })
            .collect();
        let bvh = TetBvh::build(&boxes);

        let located: Vec<Option<usize>> = points
            .par_iter()
            .map(|p| {
                bvh.candidates(p)
                    .into_iter()
                    .rev()
                    .find(|&id| point_in_tet(&self.coordinates, &self.connectivity[id], p))
            })
            .collect();

        log::debug!(
            "located {} of {} points in {} tetrahedra",
            located.iter().filter(|t| t.is_some()).count(),
            points.len(),
            self.connectivity.len()
        );
        located
    }
}

fn check_tet(tet: &Tet, node_count: usize) -> Result<()> {
    if let Some(&node) = tet.iter().find(|&&n| n >= node_count) {
        return Err(MeshError::NodeOutOfRange { node, node_count });
    }
    for a in 0..4 {
        for b in (a + 1)..4 {
            if tet[a] == tet[b] {
                return Err(MeshError::RepeatedNode(*tet));
            }
        }
    }
    Ok(())
}

/// Determinant of the edge matrix relative to the fourth node; six times the signed volume.
fn tet_determinant(coords: &[Point3], tet: &Tet) -> f64 {
    let r4 = coords[tet[3]];
    determinant3(
        &(coords[tet[0]] - r4),
        &(coords[tet[1]] - r4),
        &(coords[tet[2]] - r4),
    )
}

fn point_in_tet(coords: &[Point3], tet: &Tet, p: &Point3) -> bool {
    let [a, b, c, d] = *tet;
    same_side(coords, a, b, c, d, p)
        && same_side(coords, b, c, d, a, p)
        && same_side(coords, c, d, a, b, p)
        && same_side(coords, d, a, b, c, p)
}

/// Whether `p` lies on the same side of plane `(v1, v2, v3)` as `v4`.
fn same_side(coords: &[Point3], v1: usize, v2: usize, v3: usize, v4: usize, p: &Point3) -> bool {
    let o = coords[v1];
    let normal: Vec3 = (coords[v2] - o).cross(&(coords[v3] - o));
    let d4 = normal.dot(&(coords[v4] - o));
    let dp = normal.dot(&(p - o));
    d4 * dp >= 0.0
}
