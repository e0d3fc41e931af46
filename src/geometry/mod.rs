// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - meshes, bounds and intersection tests

mod bbox;
mod bvh;
mod mesh;
mod primitives;
pub mod robust_predicates;
pub mod triangle_intersection;

pub use bbox::BoundingBox;
pub use bvh::{Bvh, BvhNode};
pub use mesh::{transform_mesh, Triangle, TriangleMesh};
pub use primitives::Primitive;
pub use triangle_intersection::{
    triangle_triangle_intersection, triangles_intersect, IntersectionType, TriangleIntersector,
    DEFAULT_TOLERANCE,
};

pub use nalgebra::Point3;

/// Local-to-world affine transform (homogeneous 4x4)
pub type Transform = nalgebra::Matrix4<f64>;
