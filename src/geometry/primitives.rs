// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closed primitive meshes for fixtures, demos and benchmarks

use super::{Triangle, TriangleMesh};
use nalgebra::{Point3, Vector3};

/// Geometric primitives
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Cube { size: Vector3<f64>, center: bool },
    Tetrahedron { size: f64 },
}

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    /// Unit-edged cube centred on the origin
    pub fn unit_cube() -> Self {
        Self::cube(Vector3::new(1.0, 1.0, 1.0), true)
    }

    /// Right-corner tetrahedron with legs of length `size` along +x, +y, +z
    pub fn tetrahedron(size: f64) -> Self {
        Self::Tetrahedron { size }
    }

    pub fn to_mesh(&self) -> TriangleMesh {
        match self {
            Self::Cube { size, center } => generate_cube_mesh(*size, *center),
            Self::Tetrahedron { size } => generate_tetrahedron_mesh(*size),
        }
    }
}

fn generate_cube_mesh(size: Vector3<f64>, center: bool) -> TriangleMesh {
    let min = if center {
        Point3::from(-size / 2.0)
    } else {
        Point3::origin()
    };
    let max = min + size;

    // 8 shared corners
    let positions = vec![
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];

    // Two outward-wound triangles per face
    #[rustfmt::skip]
    let faces = [
        [4, 5, 6], [4, 6, 7], // z+
        [1, 0, 3], [1, 3, 2], // z-
        [5, 1, 2], [5, 2, 6], // x+
        [0, 4, 7], [0, 7, 3], // x-
        [7, 6, 2], [7, 2, 3], // y+
        [0, 1, 5], [0, 5, 4], // y-
    ];

    TriangleMesh::from_trusted(positions, faces.map(Triangle::new).to_vec())
}

fn generate_tetrahedron_mesh(size: f64) -> TriangleMesh {
    let positions = vec![
        Point3::origin(),
        Point3::new(size, 0.0, 0.0),
        Point3::new(0.0, size, 0.0),
        Point3::new(0.0, 0.0, size),
    ];
    let faces = [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];

    TriangleMesh::from_trusted(positions, faces.map(Triangle::new).to_vec())
}
