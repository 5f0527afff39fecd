//! Support footprints: which points of the layer below hold up a grid point.

use serde::{Deserialize, Serialize};

/// In-layer neighbourhood in layer `k - 1` that supports point `(i, j, k)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportFootprint {
    /// Only the point directly below.
    Below,
    /// The point below and its four edge neighbours.
    #[default]
    Cross,
    /// The full 3x3 neighbourhood below.
    Square,
}

const BELOW: [(isize, isize); 1] = [(0, 0)];
const CROSS: [(isize, isize); 5] = [(-1, 0), (0, -1), (0, 0), (0, 1), (1, 0)];
const SQUARE: [(isize, isize); 9] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl SupportFootprint {
    /// `(di, dj)` offsets, ascending.
    pub fn offsets(self) -> &'static [(isize, isize)] {
        match self {
            SupportFootprint::Below => &BELOW,
            SupportFootprint::Cross => &CROSS,
            SupportFootprint::Square => &SQUARE,
        }
    }

    /// Largest support set size, reached away from the lateral boundary.
    pub fn max_len(self) -> usize {
        self.offsets().len()
    }
}
