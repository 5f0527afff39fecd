#![warn(missing_docs)]

//! Structured grid for the AM printability filter.
//!
//! An [`OrthogonalGrid`] covers the design domain with regular cells aligned
//! to a [`GridFrame`](amfilter_math::GridFrame). Layers stack along the
//! frame's build direction; each cell carries a trilinear field through
//! [`RegularHex8`].

mod error;
mod grid;
mod hex;
mod support;

pub use error::{GridError, Result};
pub use grid::{GridResolution, HexCell, OrthogonalGrid};
pub use hex::{RegularHex8, HEX_CORNERS};
pub use support::SupportFootprint;
