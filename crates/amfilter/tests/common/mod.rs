#![allow(dead_code)]

use amfilter::{FilterSettings, GridResolution, Point3, TetMesh};

/// Box `[0, size]` split into `cells` cubes, six tets per cube, all sharing
/// the cube's main diagonal so neighbouring cubes conform.
pub fn box_mesh(cells: [usize; 3], size: [f64; 3]) -> TetMesh {
    let [cx, cy, cz] = cells;
    let node = |i: usize, j: usize, k: usize| i + (cx + 1) * (j + (cy + 1) * k);

    let mut coordinates = Vec::new();
    for k in 0..=cz {
        for j in 0..=cy {
            for i in 0..=cx {
                coordinates.push(Point3::new(
                    size[0] * i as f64 / cx as f64,
                    size[1] * j as f64 / cy as f64,
                    size[2] * k as f64 / cz as f64,
                ));
            }
        }
    }

    const KUHN: [[usize; 4]; 6] = [
        [0, 1, 3, 7],
        [0, 1, 5, 7],
        [0, 2, 3, 7],
        [0, 2, 6, 7],
        [0, 4, 5, 7],
        [0, 4, 6, 7],
    ];
    let mut connectivity = Vec::new();
    for k in 0..cz {
        for j in 0..cy {
            for i in 0..cx {
                let corner = |c: usize| node(i + (c & 1), j + ((c >> 1) & 1), k + ((c >> 2) & 1));
                for tet in KUHN {
                    connectivity.push(tet.map(corner));
                }
            }
        }
    }
    TetMesh::new(coordinates, connectivity).unwrap()
}

pub fn unit_cube() -> TetMesh {
    box_mesh([1, 1, 1], [1.0, 1.0, 1.0])
}

pub fn settings(cells: [usize; 3], p_norm: f64) -> FilterSettings {
    FilterSettings {
        resolution: GridResolution::CellCounts(cells),
        p_norm,
        ..Default::default()
    }
}
