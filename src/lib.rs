// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Clash
//!
//! Clash detection between triangle meshes placed in a building scene.
//! Meshes are moved into world space, pruned pairwise by bounding-box
//! overlap, and optionally confirmed with an exact triangle-triangle test.

pub mod clash;
pub mod cli;
pub mod error;
pub mod geometry;
pub mod io;
pub mod scene;
pub mod utils;

pub use clash::{
    CancellationToken, ClashConfig, ClashDetector, ClashReport, ClashResult, ClashStats,
    PlacedMesh,
};
pub use error::{ClashError, Result};
pub use geometry::{BoundingBox, Point3, Primitive, Transform, TriangleMesh};
pub use io::{load_scene, parse_scene};
pub use scene::{NodeRef, Scene, SceneNode};

/// Flatten `scene` and run one detection pass over every mesh in it
pub fn detect_scene(scene: &Scene, config: ClashConfig) -> Result<ClashReport<NodeRef>> {
    ClashDetector::new(config)?.detect(&scene.flatten())
}
