#![warn(missing_docs)]

//! Additive-manufacturing printability filter.
//!
//! Turns a material density field on a tetrahedral design mesh into one that
//! can be printed layer by layer: material with nothing underneath it in the
//! build direction is smoothly removed. All operators are differentiable, so
//! the filter can sit inside a gradient-based topology optimization loop.
//!
//! The filter works in three phases:
//! 1. sample the mesh density onto a structured grid (blueprint density),
//! 2. sweep the grid bottom-up, limiting each point by the smooth max of the
//!    printable density below it (printable density),
//! 3. interpolate the printable grid density back onto the mesh nodes.
//!
//! # Example
//!
//! ```ignore
//! use amfilter::{FilterSettings, PrintabilityFilter};
//!
//! let settings = FilterSettings::from_toml_str(&std::fs::read_to_string("filter.toml")?)?;
//! let filter = PrintabilityFilter::new(mesh, settings)?;
//!
//! let mut printable = vec![0.0; density.len()];
//! filter.apply(&density, &mut printable)?;
//! ```

pub mod error;
pub mod filter;
pub mod settings;
pub mod smooth;
pub mod vector;

pub use error::{FilterError, Result};
pub use filter::PrintabilityFilter;
pub use settings::FilterSettings;
pub use smooth::{smooth_max, smooth_max_gradient, smooth_min, smooth_min_gradient};
pub use vector::OptimizationVector;

pub use amfilter_grid::{GridResolution, OrthogonalGrid, SupportFootprint};
pub use amfilter_math::{GridFrame, Point3, Vec3};
pub use amfilter_mesh::{Tet, TetMesh};
