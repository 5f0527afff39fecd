mod common;

use amfilter::{
    smooth_min, FilterSettings, GridFrame, GridResolution, PrintabilityFilter, SupportFootprint,
    Vec3,
};
use approx::assert_relative_eq;
use common::{box_mesh, settings, unit_cube};

#[test_log::test]
fn test_dense_unit_cube() {
    for cells in [[1, 1, 1], [2, 2, 2]] {
        let mesh = unit_cube();
        let filter = PrintabilityFilter::new(mesh, settings(cells, 6.0)).unwrap();
        assert_eq!(filter.outside_grid_point_count(), 0);

        let density = vec![1.0; 8];
        let mut printable = vec![0.0; 8];
        filter.apply(&density, &mut printable).unwrap();
        for value in printable {
            assert!((value - 1.0).abs() <= 1e-3, "cells {cells:?}: {value}");
        }
    }
}

#[test]
fn test_dense_box_round_trip() {
    let mesh = box_mesh([2, 1, 3], [1.0, 0.5, 1.5]);
    let settings = FilterSettings {
        resolution: GridResolution::EdgeLength(0.25),
        ..Default::default()
    };
    let filter = PrintabilityFilter::new(mesh, settings).unwrap();
    assert_eq!(filter.grid().cell_counts(), [4, 2, 6]);
    assert_eq!(filter.outside_grid_point_count(), 0);

    let n = filter.mesh().node_count();
    let blueprint = filter.grid_blueprint_density(&vec![1.0; n]).unwrap();
    let printable = filter.grid_printable_density(&blueprint).unwrap();
    for value in &printable {
        assert_relative_eq!(*value, 1.0, epsilon = 1e-9);
    }

    let mut output = vec![0.0; n];
    filter.mesh_printable_density(&printable, &mut output).unwrap();
    for value in output {
        assert_relative_eq!(value, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_outside_grid_points_are_empty() {
    let mesh = amfilter::TetMesh::from_arrays(
        &[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ],
        &[[0, 1, 2, 3]],
    )
    .unwrap();
    let filter = PrintabilityFilter::new(mesh, settings([4, 4, 4], 6.0)).unwrap();
    assert!(filter.outside_grid_point_count() > 0);

    let blueprint = filter.grid_blueprint_density(&vec![1.0; 4]).unwrap();
    for (index, tet) in filter.containing_tets().iter().enumerate() {
        match tet {
            None => assert_eq!(blueprint[index], 0.0),
            Some(_) => assert_relative_eq!(blueprint[index], 1.0, epsilon = 1e-14),
        }
    }
    assert_eq!(filter.grid_point_blueprint_density(4, 4, 4, &vec![1.0; 4]).unwrap(), 0.0);
}

#[test]
fn test_build_plate_layer() {
    let mesh = box_mesh([2, 2, 2], [1.0, 1.0, 1.0]);
    let n = mesh.node_count();
    let filter = PrintabilityFilter::new(mesh, settings([4, 4, 4], 6.0)).unwrap();

    let density: Vec<f64> = (0..n).map(|i| ((i * 7) % 11) as f64 / 10.0).collect();
    let blueprint = filter.grid_blueprint_density(&density).unwrap();
    let printable = filter.grid_printable_density(&blueprint).unwrap();

    let grid = filter.grid();
    let [nx, ny, _] = grid.dimensions();
    for i in 0..nx {
        for j in 0..ny {
            let index = grid.serialized_index(i, j, 0).unwrap();
            assert_eq!(printable[index], smooth_min(blueprint[index], 1.0, 1e-4));
        }
    }
}

#[test]
fn test_printable_field_is_left_alone() {
    let mesh = box_mesh([2, 2, 3], [1.0, 1.0, 1.5]);
    let filter = PrintabilityFilter::new(mesh, settings([2, 2, 3], 200.0)).unwrap();
    let grid = filter.grid();

    // each layer is well below the support the layer underneath provides
    let blueprint: Vec<f64> = (0..grid.len())
        .map(|index| {
            let [_, _, k] = grid.unserialize(index).unwrap();
            0.9 - 0.2 * k as f64
        })
        .collect();
    let printable = filter.grid_printable_density(&blueprint).unwrap();
    let tolerance = filter.settings().smoothing_epsilon.sqrt();
    for (p, b) in printable.iter().zip(&blueprint) {
        assert!((p - b).abs() <= tolerance, "{p} vs {b}");
    }
}

/// A solid block resting on empty space.
fn overhang(frame: GridFrame) -> (Vec<f64>, Vec<f64>) {
    let mesh = box_mesh([1, 1, 4], [1.0, 1.0, 4.0]);
    let density: Vec<f64> = mesh
        .coordinates()
        .iter()
        .map(|p| if p.z >= 2.0 { 1.0 } else { 0.0 })
        .collect();
    let settings = FilterSettings {
        frame,
        ..settings([1, 1, 4], 6.0)
    };
    let filter = PrintabilityFilter::new(mesh, settings).unwrap();
    let mut printable = vec![0.0; density.len()];
    filter.apply(&density, &mut printable).unwrap();
    (density, printable)
}

#[test]
fn test_unsupported_material_is_removed() {
    let (density, printable) = overhang(GridFrame::identity());
    for (d, p) in density.iter().zip(&printable) {
        assert!(*p < 0.05, "density {d} printed as {p}");
    }
}

#[test]
fn test_build_direction_decides_support() {
    let frame = GridFrame::from_build_direction(Vec3::new(0.0, 0.0, -1.0)).unwrap();
    let (density, printable) = overhang(frame);
    for (d, p) in density.iter().zip(&printable) {
        if *d == 1.0 {
            assert_relative_eq!(*p, 1.0, epsilon = 1e-9);
        } else {
            assert!(*p < 0.05, "empty node printed as {p}");
        }
    }
}

#[test]
fn test_footprints_agree_on_dense_field() {
    let mesh = box_mesh([2, 2, 2], [1.0, 1.0, 1.0]);
    let n = mesh.node_count();
    for footprint in [
        SupportFootprint::Below,
        SupportFootprint::Cross,
        SupportFootprint::Square,
    ] {
        let settings = FilterSettings {
            footprint,
            ..settings([4, 4, 4], 20.0)
        };
        let filter = PrintabilityFilter::new(mesh.clone(), settings).unwrap();
        let mut printable = vec![0.0; n];
        filter.apply(&vec![1.0; n], &mut printable).unwrap();
        for value in printable {
            assert_relative_eq!(value, 1.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_apply_is_repeatable() {
    let mesh = box_mesh([2, 2, 2], [1.0, 1.0, 1.0]);
    let n = mesh.node_count();
    let filter = PrintabilityFilter::new(mesh, settings([4, 4, 4], 6.0)).unwrap();
    let density: Vec<f64> = (0..n).map(|i| 0.05 * (i % 17) as f64).collect();

    let mut first = vec![0.0; n];
    let mut second = vec![0.0; n];
    filter.apply(&density, &mut first).unwrap();
    filter.apply(density.as_slice(), second.as_mut_slice()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_settings_from_toml() {
    let settings = FilterSettings::from_toml_str(
        r#"
        p_norm = 6.0
        smoothing_epsilon = 1e-4
        resolution = { cell_counts = [2, 2, 2] }
        "#,
    )
    .unwrap();
    let filter = PrintabilityFilter::new(unit_cube(), settings).unwrap();
    assert_eq!(filter.grid().dimensions(), [3, 3, 3]);

    let mut printable = vec![0.0; 8];
    filter.apply(&vec![1.0; 8], &mut printable).unwrap();
    assert!(printable.iter().all(|v| (v - 1.0).abs() <= 1e-3));
}
