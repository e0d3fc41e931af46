// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end clash detection tests

use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3};
use polyframe_clash::clash::{
    meshes_clash, BroadPhase, ClashConfig, ClashDetector, CombineMode, PlacedMesh,
};
use polyframe_clash::geometry::{
    transform_mesh, triangles_intersect, BoundingBox, Primitive, Transform, TriangleMesh,
    DEFAULT_TOLERANCE,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn translation(x: f64, y: f64, z: f64) -> Transform {
    Transform::new_translation(&Vector3::new(x, y, z))
}

fn unit_cube_at(x: f64, y: f64, z: f64) -> PlacedMesh<String> {
    PlacedMesh::new(
        Primitive::unit_cube().to_mesh(),
        translation(x, y, z),
        format!("cube@{x},{y},{z}"),
    )
}

fn random_triangle(rng: &mut StdRng) -> [Point3<f64>; 3] {
    [(); 3].map(|_| {
        Point3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        )
    })
}

/// Cubes scattered in a 12-unit region, dense enough for plenty of overlaps
fn random_scene(seed: u64, n: usize) -> Vec<PlacedMesh<String>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            unit_cube_at(
                rng.gen_range(0.0..12.0),
                rng.gen_range(0.0..12.0),
                rng.gen_range(0.0..3.0),
            )
        })
        .collect()
}

#[test]
fn test_intersection_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut hits = 0;
    for _ in 0..2000 {
        let a = random_triangle(&mut rng);
        let b = random_triangle(&mut rng);
        let forward = triangles_intersect(&a, &b, DEFAULT_TOLERANCE);
        assert_eq!(forward, triangles_intersect(&b, &a, DEFAULT_TOLERANCE));
        hits += forward as usize;
    }
    // Both outcomes must actually be exercised
    assert!(hits > 0 && hits < 2000);
}

#[test]
fn test_broad_phase_never_misses_a_narrow_hit() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..2000 {
        let a = random_triangle(&mut rng);
        let b = random_triangle(&mut rng);
        if triangles_intersect(&a, &b, DEFAULT_TOLERANCE) {
            assert!(BoundingBox::from_triangle(&a).overlaps(&BoundingBox::from_triangle(&b)));
        }
    }
}

#[test]
fn test_translation_invariance() {
    let mut rng = StdRng::seed_from_u64(1234);
    let shift = Vector3::new(1000.0, -250.0, 37.5);
    for _ in 0..1000 {
        let a = random_triangle(&mut rng);
        let b = random_triangle(&mut rng);
        let moved_a = a.map(|p| p + shift);
        let moved_b = b.map(|p| p + shift);
        assert_eq!(
            triangles_intersect(&a, &b, DEFAULT_TOLERANCE),
            triangles_intersect(&moved_a, &moved_b, DEFAULT_TOLERANCE)
        );
    }
}

#[test]
fn test_mesh_translation_invariance() {
    let config = ClashConfig::default();
    let shift = translation(-5000.0, 120.0, 9.0);
    for offset in [0.25, 0.5, 1.0, 1.01, 2.0] {
        let a = Primitive::unit_cube().to_mesh();
        let b = a.transformed(&translation(offset, 0.0, 0.0));
        assert_eq!(
            meshes_clash(&a, &b, &config).unwrap(),
            meshes_clash(&a.transformed(&shift), &b.transformed(&shift), &config).unwrap(),
            "offset {offset}"
        );
    }
}

#[test]
fn test_touching_boxes_overlap() {
    let a = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    let b = BoundingBox::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
    assert!(a.overlaps(&b));
    assert!(b.overlaps(&a));
}

#[test]
fn test_disjoint_cubes_skip_narrow_phase() {
    let input = [unit_cube_at(0.0, 0.0, 0.0), unit_cube_at(10.0, 0.0, 0.0)];
    let report = ClashDetector::default().detect(&input).unwrap();

    assert!(report.is_empty());
    assert_eq!(report.stats.pair_count, 1);
    assert_eq!(report.stats.candidate_count, 0);
    assert_eq!(report.stats.triangle_tests, 0);
}

#[test]
fn test_coplanar_shared_edge_intersects() {
    let a = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let b = [
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
    ];
    assert!(triangles_intersect(&a, &b, DEFAULT_TOLERANCE));
    assert!(triangles_intersect(&b, &a, DEFAULT_TOLERANCE));
}

#[test]
fn test_face_to_face_cubes_clash() {
    let input = [unit_cube_at(0.0, 0.0, 0.0), unit_cube_at(1.0, 0.0, 0.0)];
    let report = ClashDetector::default().detect(&input).unwrap();
    assert_eq!(report.pairs(), vec![(0, 1)]);
    assert!(report.results[0].confirmed);
}

#[test]
fn test_nested_cube_is_box_clash_only() {
    let outer = PlacedMesh::new(
        Primitive::cube(Vector3::new(4.0, 4.0, 4.0), true).to_mesh(),
        Transform::identity(),
        "outer".to_string(),
    );
    let input = [outer, unit_cube_at(0.0, 0.0, 0.0)];

    let exact = ClashDetector::default().detect(&input).unwrap();
    assert!(exact.is_empty());
    assert_eq!(exact.stats.candidate_count, 1);

    let boxes = ClashDetector::new(ClashConfig::bounding_box_only())
        .unwrap()
        .detect(&input)
        .unwrap();
    assert_eq!(boxes.pairs(), vec![(0, 1)]);
    assert!(!boxes.results[0].confirmed);
}

#[test]
fn test_transform_composition() {
    let mesh = Primitive::tetrahedron(1.5).to_mesh();
    let first = translation(0.3, -0.2, 0.1);
    let second = Transform::new_rotation(Vector3::new(0.0, 0.4, 0.0));

    let stepwise = transform_mesh(&transform_mesh(&mesh, &first), &second);
    let composed = transform_mesh(&mesh, &(second * first));
    for (a, b) in stepwise.vertices().iter().zip(composed.vertices()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-12);
    }

    // Placing a local mesh equals handing over the pre-transformed one
    let other = PlacedMesh::in_world(Primitive::unit_cube().to_mesh(), "cube".to_string());
    let placed = [
        PlacedMesh::new(mesh.clone(), second * first, "tet".to_string()),
        other.clone(),
    ];
    let prebaked = [PlacedMesh::in_world(composed, "tet".to_string()), other];

    let detector = ClashDetector::default();
    assert_eq!(
        detector.detect(&placed).unwrap().pairs(),
        detector.detect(&prebaked).unwrap().pairs()
    );
}

#[test]
fn test_bounds_idempotent() {
    let mesh = Primitive::tetrahedron(3.0)
        .to_mesh()
        .transformed(&translation(2.0, 1.0, -4.0));
    let first = mesh.bounding_box().unwrap();
    let second = mesh.bounding_box().unwrap();
    assert_eq!(first, second);

    let mut reversed = mesh.vertices().to_vec();
    reversed.reverse();
    assert_eq!(BoundingBox::from_points(&reversed).unwrap(), first);
}

#[test]
fn test_bvh_matches_all_pairs() {
    let input = random_scene(99, 80);
    for bbox_only in [true, false] {
        let all_pairs = ClashDetector::new(ClashConfig {
            bounding_box_only: bbox_only,
            ..ClashConfig::default()
        })
        .unwrap()
        .detect(&input)
        .unwrap();
        let bvh = ClashDetector::new(ClashConfig {
            bounding_box_only: bbox_only,
            broad_phase: BroadPhase::Bvh,
            ..ClashConfig::default()
        })
        .unwrap()
        .detect(&input)
        .unwrap();

        assert!(!all_pairs.is_empty());
        assert_eq!(all_pairs.pairs(), bvh.pairs());
        assert_eq!(all_pairs.stats.candidate_count, bvh.stats.candidate_count);
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let input = random_scene(5, 60);
    let parallel = ClashDetector::default().detect(&input).unwrap();
    let sequential = ClashDetector::new(ClashConfig::default().with_parallel(false))
        .unwrap()
        .detect(&input)
        .unwrap();

    assert_eq!(parallel.results, sequential.results);
    assert_eq!(parallel.stats.triangle_tests, sequential.stats.triangle_tests);
}

#[test]
fn test_exact_results_are_subset_of_box_results() {
    let input = random_scene(17, 60);
    let exact = ClashDetector::default().detect(&input).unwrap();
    let boxes = ClashDetector::new(ClashConfig::bounding_box_only())
        .unwrap()
        .detect(&input)
        .unwrap();

    assert!(exact.results.iter().all(|r| r.confirmed));
    assert!(boxes.results.iter().all(|r| !r.confirmed));
    let box_pairs = boxes.pairs();
    assert!(exact.pairs().iter().all(|p| box_pairs.contains(p)));
    assert_eq!(boxes.stats.triangle_tests, 0);
}

#[test]
fn test_per_clash_geometry() {
    let input = [unit_cube_at(0.0, 0.0, 0.0), unit_cube_at(0.5, 0.5, 0.0)];
    let report = ClashDetector::new(ClashConfig::default().with_combine(CombineMode::PerClash))
        .unwrap()
        .detect(&input)
        .unwrap();

    let geometry = report.results[0].geometry.as_ref().unwrap();
    assert_eq!(geometry.vertex_count(), 16);
    assert_eq!(geometry.triangle_count(), 24);
    assert!(report.combined.is_none());

    // World-space vertices of the second cube follow the first one's
    let bounds = geometry.bounding_box().unwrap();
    assert_eq!(bounds.min, Point3::new(-0.5, -0.5, -0.5));
    assert_eq!(bounds.max, Point3::new(1.0, 1.0, 0.5));
}

#[test]
fn test_union_geometry() {
    let input = [
        unit_cube_at(0.0, 0.0, 0.0),
        unit_cube_at(0.5, 0.0, 0.0),
        unit_cube_at(1.0, 0.0, 0.0),
        unit_cube_at(20.0, 0.0, 0.0),
    ];
    let report = ClashDetector::new(ClashConfig::default().with_combine(CombineMode::Union))
        .unwrap()
        .detect(&input)
        .unwrap();

    assert_eq!(report.pairs(), vec![(0, 1), (0, 2), (1, 2)]);
    let combined: &TriangleMesh = report.combined.as_ref().unwrap();
    // Three distinct meshes, the far cube left out
    assert_eq!(combined.vertex_count(), 24);
    assert!(report.results.iter().all(|r| r.geometry.is_none()));
}

#[test]
fn test_fewer_than_two_meshes() {
    let detector = ClashDetector::default();
    assert!(detector.detect::<String>(&[]).unwrap().is_empty());
    assert!(detector
        .detect(&[unit_cube_at(0.0, 0.0, 0.0)])
        .unwrap()
        .is_empty());
}
