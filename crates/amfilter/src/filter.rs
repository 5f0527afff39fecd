//! The printability filter pipeline.
//!
//! A density field on the tet mesh is sampled onto the structured grid
//! (blueprint), swept layer by layer along the build direction so that
//! material without support below is removed (printable), and interpolated
//! back onto the mesh nodes.

use amfilter_grid::{HexCell, OrthogonalGrid};
use amfilter_math::{Point3, Tolerance};
use amfilter_mesh::{Tet, TetMesh};
use log::{debug, info, trace};
use rayon::prelude::*;

use crate::error::{FilterError, Result};
use crate::settings::FilterSettings;
use crate::smooth::{smooth_max, smooth_max_gradient, smooth_min, smooth_min_gradient};
use crate::vector::OptimizationVector;

/// Layer-wise support filter between a tet mesh and a structured grid.
///
/// Everything derived from geometry is computed once in
/// [`new`](Self::new); applying the filter only allocates density buffers.
#[derive(Debug, Clone)]
pub struct PrintabilityFilter {
    mesh: TetMesh,
    settings: FilterSettings,
    grid: OrthogonalGrid,
    grid_points: Vec<Point3>,
    containing_tets: Vec<Option<usize>>,
    node_cells: Vec<Vec<HexCell>>,
    outside_grid_points: usize,
}

impl PrintabilityFilter {
    /// Build the grid over the mesh's bounding box and cache point location.
    pub fn new(mesh: TetMesh, settings: FilterSettings) -> Result<Self> {
        settings.validate()?;

        let bounds = mesh.bounding_box(&settings.frame);
        let grid = OrthogonalGrid::new(settings.frame, bounds, settings.resolution)?;
        let grid_points = grid.world_coordinates();
        let containing_tets = mesh.locate_points(&grid_points);

        let node_cells: Vec<Vec<HexCell>> = mesh
            .coordinates()
            .par_iter()
            .map(|p| grid.containing_cells(p))
            .collect();
        if let Some(node) = node_cells.iter().position(Vec::is_empty) {
            return Err(FilterError::NodeOutsideGrid(node));
        }

        let outside_grid_points = containing_tets.iter().filter(|t| t.is_none()).count();
        info!(
            "printability grid {:?} ({} points) over {} tets, {} points outside the mesh",
            grid.dimensions(),
            grid.len(),
            mesh.tet_count(),
            outside_grid_points
        );
        debug!(
            "grid cell extents {:?}, shortest tet edge {:.3e}",
            (0..3)
                .map(|a| bounds.extent()[a] / grid.cell_counts()[a] as f64)
                .collect::<Vec<_>>(),
            mesh.min_edge_length()
        );

        Ok(Self {
            mesh,
            settings,
            grid,
            grid_points,
            containing_tets,
            node_cells,
            outside_grid_points,
        })
    }

    /// The structured grid.
    pub fn grid(&self) -> &OrthogonalGrid {
        &self.grid
    }

    /// The design mesh.
    pub fn mesh(&self) -> &TetMesh {
        &self.mesh
    }

    /// Filter parameters.
    pub fn settings(&self) -> &FilterSettings {
        &self.settings
    }

    /// Containing tet of each grid point, in serialized order.
    pub fn containing_tets(&self) -> &[Option<usize>] {
        &self.containing_tets
    }

    /// Number of grid points outside every tet.
    pub fn outside_grid_point_count(&self) -> usize {
        self.outside_grid_points
    }

    /// Filter `input` into `output`; both hold one value per mesh node.
    ///
    /// `output` is only written once every value has been computed.
    pub fn apply<V, W>(&self, input: &V, output: &mut W) -> Result<()>
    where
        V: OptimizationVector + Sync + ?Sized,
        W: OptimizationVector + ?Sized,
    {
        self.check_mesh_len("output density", output.get_length())?;
        let blueprint = self.grid_blueprint_density(input)?;
        let printable = self.grid_printable_density(&blueprint)?;
        self.mesh_printable_density(&printable, output)
    }

    /// Chain rule through [`apply`](Self::apply).
    ///
    /// On entry `gradient` holds the derivative of an objective with respect
    /// to the filtered density; on success it is overwritten with the
    /// derivative with respect to `input`.
    pub fn apply_gradient<V, W>(&self, input: &V, gradient: &mut W) -> Result<()>
    where
        V: OptimizationVector + Sync + ?Sized,
        W: OptimizationVector + ?Sized,
    {
        let node_count = self.mesh.node_count();
        self.check_mesh_len("gradient", gradient.get_length())?;
        let blueprint = self.grid_blueprint_density(input)?;
        let (support, printable) = self.layered_densities(&blueprint)?;

        let mut d_printable = vec![0.0; self.grid.len()];
        for node in 0..node_count {
            let g = gradient.get_value(node);
            if g == 0.0 {
                continue;
            }
            let point = &self.mesh.coordinates()[node];
            for (index, w) in self.grid.interpolation_weights(&self.node_cells[node], point)? {
                d_printable[index] += w * g;
            }
        }

        let p = self.settings.p_norm;
        let eps = self.settings.smoothing_epsilon;
        let mut d_blueprint = vec![0.0; self.grid.len()];
        for k in (0..self.layer_count()).rev() {
            let indices = self.layer_indices(k)?;
            let contributions: Vec<(f64, Vec<(usize, f64)>)> = indices
                .par_iter()
                .map(|&index| -> Result<(f64, Vec<(usize, f64)>)> {
                    let (da, ds) = smooth_min_gradient(blueprint[index], support[index], eps);
                    let g = d_printable[index];
                    let g_support = g * ds;

                    let mut below = Vec::new();
                    let sources = self.support_sources(index)?;
                    if g_support != 0.0 && !sources.is_empty() {
                        let args: Vec<f64> = sources.iter().map(|&s| printable[s]).collect();
                        let clamped = self.settings.clamp_support && smooth_max(&args, p)? > 1.0;
                        if !clamped {
                            let slopes = smooth_max_gradient(&args, p)?;
                            below = sources
                                .into_iter()
                                .zip(slopes)
                                .map(|(s, slope)| (s, g_support * slope))
                                .collect();
                        }
                    }
                    Ok((g * da, below))
                })
                .collect::<Result<_>>()?;

            for (&index, (g_blueprint, below)) in indices.iter().zip(contributions) {
                d_blueprint[index] = g_blueprint;
                for (s, g) in below {
                    d_printable[s] += g;
                }
            }
        }

        let mut d_input = vec![0.0; node_count];
        for (index, &g) in d_blueprint.iter().enumerate() {
            if g == 0.0 {
                continue;
            }
            if let Some((tet, weights)) = self.blueprint_terms(index)? {
                if weighted_sum(&tet, &weights, input) < 0.0 {
                    continue;
                }
                for (&node, w) in tet.iter().zip(weights) {
                    d_input[node] += w * g;
                }
            }
        }

        debug!("gradient through {} layers", self.layer_count());
        for (node, g) in d_input.into_iter().enumerate() {
            gradient.set_value(node, g);
        }
        Ok(())
    }

    // Phase A: mesh to grid

    /// Blueprint density at grid point `(i, j, k)`.
    pub fn grid_point_blueprint_density<V>(&self, i: usize, j: usize, k: usize, density: &V) -> Result<f64>
    where
        V: OptimizationVector + ?Sized,
    {
        self.check_mesh_len("mesh density", density.get_length())?;
        let index = self.grid.serialized_index(i, j, k)?;
        self.point_blueprint_density(index, density)
    }

    /// Blueprint density at every grid point, in serialized order.
    pub fn grid_blueprint_density<V>(&self, density: &V) -> Result<Vec<f64>>
    where
        V: OptimizationVector + Sync + ?Sized,
    {
        self.check_mesh_len("mesh density", density.get_length())?;
        let blueprint = (0..self.grid.len())
            .into_par_iter()
            .map(|index| self.point_blueprint_density(index, density))
            .collect::<Result<Vec<f64>>>()?;
        debug!("blueprint density on {} grid points", blueprint.len());
        Ok(blueprint)
    }

    // Phase B: layer sweep

    /// Write the support density of layer `k` into `support`.
    ///
    /// Reads layer `k - 1` of `printable`. Layer 0 rests on the build plate
    /// and gets support 1.
    pub fn layer_support_density(&self, k: usize, printable: &[f64], support: &mut [f64]) -> Result<()> {
        self.check_grid_len("printable density", printable.len())?;
        self.check_grid_len("support density", support.len())?;
        let indices = self.layer_indices(k)?;
        let values = indices
            .par_iter()
            .map(|&index| self.point_support_density(index, printable))
            .collect::<Result<Vec<f64>>>()?;
        for (index, value) in indices.into_iter().zip(values) {
            support[index] = value;
        }
        Ok(())
    }

    /// Write the printable density of layer `k` into `printable`.
    pub fn layer_printable_density(
        &self,
        k: usize,
        blueprint: &[f64],
        support: &[f64],
        printable: &mut [f64],
    ) -> Result<()> {
        self.check_grid_len("blueprint density", blueprint.len())?;
        self.check_grid_len("support density", support.len())?;
        self.check_grid_len("printable density", printable.len())?;
        let eps = self.settings.smoothing_epsilon;
        for index in self.layer_indices(k)? {
            printable[index] = smooth_min(blueprint[index], support[index], eps);
        }
        Ok(())
    }

    /// Printable density at every grid point, sweeping layers bottom-up.
    pub fn grid_printable_density(&self, blueprint: &[f64]) -> Result<Vec<f64>> {
        let (_, printable) = self.layered_densities(blueprint)?;
        Ok(printable)
    }

    // Phase C: grid to mesh

    /// Printable density interpolated at mesh node `node`.
    pub fn node_printable_density(&self, node: usize, grid_printable: &[f64]) -> Result<f64> {
        self.check_grid_len("printable density", grid_printable.len())?;
        let point = self
            .mesh
            .coordinates()
            .get(node)
            .ok_or(FilterError::IndexOutOfRange {
                index: node,
                len: self.mesh.node_count(),
            })?;
        let cells = &self.node_cells[node];
        if cells.is_empty() {
            return Err(FilterError::NodeOutsideGrid(node));
        }
        Ok(self.grid.interpolate_field(cells, grid_printable, point)?)
    }

    /// Interpolate the printable grid density onto every mesh node.
    pub fn mesh_printable_density<W>(&self, grid_printable: &[f64], output: &mut W) -> Result<()>
    where
        W: OptimizationVector + ?Sized,
    {
        self.check_grid_len("printable density", grid_printable.len())?;
        self.check_mesh_len("output density", output.get_length())?;
        let values = (0..self.mesh.node_count())
            .into_par_iter()
            .map(|node| self.node_printable_density(node, grid_printable))
            .collect::<Result<Vec<f64>>>()?;
        debug!("printable density on {} mesh nodes", values.len());
        for (node, value) in values.into_iter().enumerate() {
            output.set_value(node, value);
        }
        Ok(())
    }

    fn layer_count(&self) -> usize {
        self.grid.dimensions()[2]
    }

    /// Serialized indices of layer `k`.
    fn layer_indices(&self, k: usize) -> Result<Vec<usize>> {
        let [nx, ny, nz] = self.grid.dimensions();
        if k >= nz {
            return Err(FilterError::LayerOutOfRange { layer: k, layers: nz });
        }
        let mut out = Vec::with_capacity(self.grid.layer_len());
        for i in 0..nx {
            for j in 0..ny {
                out.push(self.grid.serialized_index(i, j, k)?);
            }
        }
        Ok(out)
    }

    fn layered_densities(&self, blueprint: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        self.check_grid_len("blueprint density", blueprint.len())?;
        let mut support = vec![0.0; self.grid.len()];
        let mut printable = vec![0.0; self.grid.len()];
        for k in 0..self.layer_count() {
            self.layer_support_density(k, &printable, &mut support)?;
            self.layer_printable_density(k, blueprint, &support, &mut printable)?;
            trace!("layer {k} done");
        }
        debug!("printable density over {} layers", self.layer_count());
        Ok((support, printable))
    }

    /// Containing tet and barycentric weights of grid point `index`.
    fn blueprint_terms(&self, index: usize) -> Result<Option<(Tet, [f64; 4])>> {
        let Some(t) = self.containing_tets[index] else {
            return Ok(None);
        };
        let tet = self.mesh.connectivity()[t];
        let weights = self
            .mesh
            .barycentric_coordinates(&tet, &self.grid_points[index])?;
        let tol = Tolerance::BARYCENTRIC;
        if weights.iter().any(|w| !(*w >= -tol && *w <= 1.0 + tol)) {
            return Err(FilterError::BarycentricOutOfRange {
                grid_point: index,
                weights,
            });
        }
        Ok(Some((tet, weights)))
    }

    fn point_blueprint_density<V>(&self, index: usize, density: &V) -> Result<f64>
    where
        V: OptimizationVector + ?Sized,
    {
        Ok(match self.blueprint_terms(index)? {
            Some((tet, weights)) => weighted_sum(&tet, &weights, density).max(0.0),
            None => 0.0,
        })
    }

    /// Serialized indices of the points supporting grid point `index`.
    fn support_sources(&self, index: usize) -> Result<Vec<usize>> {
        let [i, j, k] = self.grid.unserialize(index)?;
        self.grid
            .support_indices(i, j, k, self.settings.footprint)?
            .into_iter()
            .map(|[si, sj, sk]| self.grid.serialized_index(si, sj, sk).map_err(FilterError::from))
            .collect()
    }

    fn point_support_density(&self, index: usize, printable: &[f64]) -> Result<f64> {
        let sources = self.support_sources(index)?;
        if sources.is_empty() {
            return Ok(1.0);
        }
        let args: Vec<f64> = sources.iter().map(|&s| printable[s]).collect();
        let support = smooth_max(&args, self.settings.p_norm)?;
        Ok(if self.settings.clamp_support {
            support.min(1.0)
        } else {
            support
        })
    }

    fn check_mesh_len(&self, what: &'static str, actual: usize) -> Result<()> {
        check_len(what, self.mesh.node_count(), actual)
    }

    fn check_grid_len(&self, what: &'static str, actual: usize) -> Result<()> {
        check_len(what, self.grid.len(), actual)
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(FilterError::SizeMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

fn weighted_sum<V>(tet: &Tet, weights: &[f64; 4], density: &V) -> f64
where
    V: OptimizationVector + ?Sized,
{
    tet.iter()
        .zip(weights)
        .map(|(&node, w)| w * density.get_value(node))
        .sum()
}
