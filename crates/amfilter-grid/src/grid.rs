//! Structured orthogonal grid over the design domain.
//!
//! Points are addressed by `(i, j, k)` along the frame's `(u, v, w)` axes,
//! `k` being the layer along the build direction. The serialized index is
//! `i * (ny * nz) + j * nz + k`, so `k` varies fastest.

use amfilter_math::{Aabb3, GridFrame, Point3, Tolerance};
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::hex::{RegularHex8, HEX_CORNERS};
use crate::support::SupportFootprint;

/// How finely the grid divides its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridResolution {
    /// Target cell edge length; each axis gets `floor(L / h)` cells (at least 1).
    EdgeLength(f64),
    /// Explicit cell counts per axis.
    CellCounts([usize; 3]),
}

impl Default for GridResolution {
    fn default() -> Self {
        GridResolution::EdgeLength(0.1)
    }
}

/// A grid cell: its minimum-corner index and the serialized indices of its
/// eight corners in [`RegularHex8`] corner order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexCell {
    /// `(i, j, k)` of the cell's minimum corner.
    pub origin: [usize; 3],
    /// Serialized grid indices of the corners.
    pub corners: [usize; HEX_CORNERS],
}

/// Regular grid of points aligned with a [`GridFrame`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrthogonalGrid {
    frame: GridFrame,
    bounds: Aabb3,
    cells: [usize; 3],
    dims: [usize; 3],
    len: usize,
}

impl OrthogonalGrid {
    /// Build a grid over `bounds`, given in frame-local coordinates.
    pub fn new(frame: GridFrame, bounds: Aabb3, resolution: GridResolution) -> Result<Self> {
        for axis in 0..3 {
            let (lo, hi) = (bounds.min[axis], bounds.max[axis]);
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(GridError::InvalidBounds(format!(
                    "axis {axis}: min {lo} must be below max {hi}"
                )));
            }
        }

        let cells = match resolution {
            GridResolution::EdgeLength(h) => {
                if !(h.is_finite() && h > 0.0) {
                    return Err(GridError::InvalidResolution(format!(
                        "edge length {h} must be positive"
                    )));
                }
                let extent = bounds.extent();
                let mut cells = [0; 3];
                for (axis, n) in cells.iter_mut().enumerate() {
                    // absorb round-off in L / h, e.g. 0.3 / 0.1
                    let ratio = extent[axis] / h * (1.0 + 1e-12);
                    if ratio >= usize::MAX as f64 {
                        return Err(GridError::TooLarge([usize::MAX; 3]));
                    }
                    *n = (ratio.floor() as usize).max(1);
                }
                cells
            }
            GridResolution::CellCounts(cells) => {
                if cells.contains(&0) {
                    return Err(GridError::InvalidResolution(format!(
                        "cell counts {cells:?} must be at least 1"
                    )));
                }
                cells
            }
        };

        let dims = cells.map(|n| n + 1);
        let len = dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or(GridError::TooLarge(cells))?;

        Ok(Self {
            frame,
            bounds,
            cells,
            dims,
            len,
        })
    }

    /// The grid's frame.
    pub fn frame(&self) -> &GridFrame {
        &self.frame
    }

    /// Local-coordinate extent of the grid.
    pub fn bounds(&self) -> &Aabb3 {
        &self.bounds
    }

    /// Point counts `[nx + 1, ny + 1, nz + 1]`.
    pub fn dimensions(&self) -> [usize; 3] {
        self.dims
    }

    /// Cell counts `[nx, ny, nz]`.
    pub fn cell_counts(&self) -> [usize; 3] {
        self.cells
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a grid has at least 8 points.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of points in one layer.
    pub fn layer_len(&self) -> usize {
        self.dims[0] * self.dims[1]
    }

    /// Serialized index of point `(i, j, k)`.
    pub fn serialized_index(&self, i: usize, j: usize, k: usize) -> Result<usize> {
        self.check_index(i, j, k)?;
        Ok(self.index(i, j, k))
    }

    /// Inverse of [`serialized_index`](Self::serialized_index).
    pub fn unserialize(&self, index: usize) -> Result<[usize; 3]> {
        if index >= self.len {
            return Err(GridError::SerializedIndexOutOfRange {
                index,
                len: self.len,
            });
        }
        let [_, ny, nz] = self.dims;
        Ok([index / (ny * nz), (index / nz) % ny, index % nz])
    }

    /// Position of point `(i, j, k)` in frame coordinates.
    pub fn point_local_coordinates(&self, i: usize, j: usize, k: usize) -> Result<Point3> {
        self.check_index(i, j, k)?;
        Ok(self.local_point([i, j, k]))
    }

    /// Position of point `(i, j, k)` in world coordinates.
    pub fn point_world_coordinates(&self, i: usize, j: usize, k: usize) -> Result<Point3> {
        Ok(self.frame.to_world(&self.point_local_coordinates(i, j, k)?))
    }

    /// World positions of every grid point, in serialized order.
    pub fn world_coordinates(&self) -> Vec<Point3> {
        let [nx, ny, nz] = self.dims;
        let mut out = Vec::with_capacity(self.len);
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    out.push(self.frame.to_world(&self.local_point([i, j, k])));
                }
            }
        }
        out
    }

    /// Points of layer `k - 1` supporting `(i, j, k)` under `footprint`,
    /// clipped at the lateral boundary. Empty for `k == 0`.
    pub fn support_indices(
        &self,
        i: usize,
        j: usize,
        k: usize,
        footprint: SupportFootprint,
    ) -> Result<Vec<[usize; 3]>> {
        self.check_index(i, j, k)?;
        if k == 0 {
            return Ok(Vec::new());
        }
        let [nx, ny, _] = self.dims;
        Ok(footprint
            .offsets()
            .iter()
            .filter_map(|&(di, dj)| {
                let si = i.checked_add_signed(di).filter(|&s| s < nx)?;
                let sj = j.checked_add_signed(dj).filter(|&s| s < ny)?;
                Some([si, sj, k - 1])
            })
            .collect())
    }

    /// The cell whose minimum corner is `(i, j, k)`.
    pub fn cell(&self, i: usize, j: usize, k: usize) -> Result<HexCell> {
        let origin = [i, j, k];
        if (0..3).any(|a| origin[a] >= self.cells[a]) {
            return Err(GridError::CellOutOfRange {
                origin,
                cells: self.cells,
            });
        }
        let mut corners = [0; HEX_CORNERS];
        for (c, idx) in corners.iter_mut().enumerate() {
            *idx = self.index(i + (c & 1), j + ((c >> 1) & 1), k + ((c >> 2) & 1));
        }
        Ok(HexCell { origin, corners })
    }

    /// Geometry of `cell` in frame coordinates.
    pub fn cell_hex(&self, cell: &HexCell) -> Result<RegularHex8> {
        let [i, j, k] = cell.origin;
        self.cell(i, j, k)?;
        RegularHex8::new(
            self.local_point([i, j, k]),
            self.local_point([i + 1, j + 1, k + 1]),
        )
    }

    /// All cells containing a world `point` within tolerance; empty if the
    /// point is outside the grid.
    pub fn containing_cells(&self, point: &Point3) -> Vec<HexCell> {
        let local = self.frame.to_local(point);
        let mut ranges: [Vec<usize>; 3] = Default::default();
        for (axis, range) in ranges.iter_mut().enumerate() {
            *range = self.containing_cells_along(axis, local[axis]);
            if range.is_empty() {
                return Vec::new();
            }
        }

        let mut out = Vec::with_capacity(ranges.iter().map(Vec::len).product());
        for &i in &ranges[0] {
            for &j in &ranges[1] {
                for &k in &ranges[2] {
                    if let Ok(cell) = self.cell(i, j, k) {
                        out.push(cell);
                    }
                }
            }
        }
        out
    }

    /// Interpolate at a world `point` from 8 corner values per cell,
    /// averaging over the candidate `cells`.
    pub fn interpolate_scalar(&self, cells: &[HexCell], values: &[f64], point: &Point3) -> Result<f64> {
        if cells.is_empty() {
            return Err(GridError::NoContainingCell((*point).into()));
        }
        let expected = cells.len() * HEX_CORNERS;
        if values.len() != expected {
            return Err(GridError::WrongScalarCount {
                expected,
                actual: values.len(),
            });
        }
        let local = self.frame.to_local(point);
        let mut sum = 0.0;
        for (cell, corner_values) in cells.iter().zip(values.chunks_exact(HEX_CORNERS)) {
            sum += self.cell_hex(cell)?.interpolate(&local, corner_values)?;
        }
        Ok(sum / cells.len() as f64)
    }

    /// Interpolate a full grid field (one value per grid point, serialized
    /// order) at a world `point` over the candidate `cells`.
    pub fn interpolate_field(&self, cells: &[HexCell], field: &[f64], point: &Point3) -> Result<f64> {
        if field.len() != self.len {
            return Err(GridError::WrongScalarCount {
                expected: self.len,
                actual: field.len(),
            });
        }
        let values: Vec<f64> = cells
            .iter()
            .flat_map(|cell| cell.corners.iter().map(|&c| field[c]))
            .collect();
        self.interpolate_scalar(cells, &values, point)
    }

    /// Averaged trilinear weights `(serialized index, weight)` of a world
    /// `point` over the candidate `cells`; weights sum to one.
    pub fn interpolation_weights(&self, cells: &[HexCell], point: &Point3) -> Result<Vec<(usize, f64)>> {
        if cells.is_empty() {
            return Err(GridError::NoContainingCell((*point).into()));
        }
        let local = self.frame.to_local(point);
        let scale = 1.0 / cells.len() as f64;
        let mut out = Vec::with_capacity(cells.len() * HEX_CORNERS);
        for cell in cells {
            let n = self.cell_hex(cell)?.shape_functions(&local)?;
            out.extend(cell.corners.iter().zip(n).map(|(&idx, w)| (idx, w * scale)));
        }
        Ok(out)
    }

    fn index(&self, i: usize, j: usize, k: usize) -> usize {
        let [_, ny, nz] = self.dims;
        i * ny * nz + j * nz + k
    }

    fn check_index(&self, i: usize, j: usize, k: usize) -> Result<()> {
        let index = [i, j, k];
        if (0..3).any(|a| index[a] >= self.dims[a]) {
            return Err(GridError::IndexOutOfRange {
                index,
                dimensions: self.dims,
            });
        }
        Ok(())
    }

    /// Coordinate of grid line `idx` along `axis`; the last line is the
    /// bounds max exactly.
    fn coordinate(&self, axis: usize, idx: usize) -> f64 {
        let n = self.cells[axis];
        let (lo, hi) = (self.bounds.min[axis], self.bounds.max[axis]);
        if idx >= n {
            hi
        } else {
            lo + (idx as f64 * (hi - lo)) / n as f64
        }
    }

    fn local_point(&self, index: [usize; 3]) -> Point3 {
        Point3::new(
            self.coordinate(0, index[0]),
            self.coordinate(1, index[1]),
            self.coordinate(2, index[2]),
        )
    }

    fn containing_cells_along(&self, axis: usize, x: f64) -> Vec<usize> {
        let n = self.cells[axis];
        let (lo, hi) = (self.bounds.min[axis], self.bounds.max[axis]);
        let tol = Tolerance::POINT_IN_HEX;
        if !(x >= lo - tol && x <= hi + tol) {
            return Vec::new();
        }
        let guess = ((x - lo) / (hi - lo) * n as f64).floor().clamp(0.0, (n - 1) as f64) as usize;
        (guess.saturating_sub(1)..=(guess + 1).min(n - 1))
            .filter(|&c| {
                x >= self.coordinate(axis, c) - tol && x <= self.coordinate(axis, c + 1) + tol
            })
            .collect()
    }
}
