// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Clash detection pipeline
//!
//! placed meshes -> world-space meshes + bounds -> broad phase (box overlap)
//! -> optional narrow phase (triangle pairs) -> report.
//!
//! Every pass is a pure function of its input; nothing is cached between calls.

use super::cancel::CancellationToken;
use super::config::{BroadPhase, ClashConfig, CombineMode};
use crate::error::Result;
use crate::geometry::{BoundingBox, Bvh, Point3, Transform, TriangleIntersector, TriangleMesh};
use rayon::prelude::*;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn};

/// A mesh placed in the world by its owning node's transform
#[derive(Debug, Clone)]
pub struct PlacedMesh<N> {
    pub mesh: TriangleMesh,
    pub transform: Transform,
    pub node: N,
}

impl<N> PlacedMesh<N> {
    pub fn new(mesh: TriangleMesh, transform: Transform, node: N) -> Self {
        Self {
            mesh,
            transform,
            node,
        }
    }

    /// Mesh already expressed in world space
    pub fn in_world(mesh: TriangleMesh, node: N) -> Self {
        Self::new(mesh, Transform::identity(), node)
    }
}

/// World-space copy of a placed mesh with its cached bounds
#[derive(Debug, Clone)]
pub struct WorldMesh {
    pub mesh: TriangleMesh,
    pub bounds: BoundingBox,
}

impl WorldMesh {
    /// Transform into world space. `None` for meshes that cannot take part:
    /// no vertices, or non-finite coordinates after transformation.
    pub fn prepare(mesh: &TriangleMesh, transform: &Transform) -> Option<Self> {
        let world = mesh.transformed(transform);
        if !world.is_finite() {
            return None;
        }
        let bounds = world.bounding_box().ok()?;
        Some(Self {
            mesh: world,
            bounds,
        })
    }
}

/// One reported clash between two input meshes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClashResult<N> {
    /// Index of the first mesh in the input (`mesh_a < mesh_b`)
    pub mesh_a: usize,
    pub mesh_b: usize,
    pub node_a: N,
    pub node_b: N,
    /// `true` when a triangle pair was found to intersect; `false` when only
    /// the bounding boxes were compared
    pub confirmed: bool,
    /// Both meshes' world geometry, when [`CombineMode::PerClash`] is set
    #[serde(skip)]
    pub geometry: Option<TriangleMesh>,
}

/// Counters gathered during one detection pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClashStats {
    /// Meshes in the input
    pub mesh_count: usize,
    /// Meshes left out because they were empty or became non-finite
    pub skipped_meshes: usize,
    /// Unordered pairs considered by the broad phase
    pub pair_count: usize,
    /// Pairs whose boxes overlap
    pub candidate_count: usize,
    /// Pairs confirmed by the narrow phase
    pub confirmed_count: usize,
    /// Triangle-triangle tests run
    pub triangle_tests: u64,
    pub elapsed: Duration,
}

/// Outcome of a detection pass
#[derive(Debug, Clone, Serialize)]
pub struct ClashReport<N> {
    /// Sorted by `(mesh_a, mesh_b)`
    pub results: Vec<ClashResult<N>>,
    pub stats: ClashStats,
    /// Union of every clashing mesh, when [`CombineMode::Union`] is set
    #[serde(skip)]
    pub combined: Option<TriangleMesh>,
}

impl<N> ClashReport<N> {
    fn empty(stats: ClashStats) -> Self {
        Self {
            results: Vec::new(),
            stats,
            combined: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClashResult<N>> {
        self.results.iter()
    }

    /// Index pairs of every reported clash
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.results.iter().map(|r| (r.mesh_a, r.mesh_b)).collect()
    }
}

/// Clash detector
#[derive(Debug, Clone)]
pub struct ClashDetector {
    config: ClashConfig,
    intersector: TriangleIntersector,
}

impl ClashDetector {
    pub fn new(config: ClashConfig) -> Result<Self> {
        config.validate()?;
        let intersector = TriangleIntersector::new(config.tolerance)?;
        Ok(Self {
            config,
            intersector,
        })
    }

    pub fn config(&self) -> &ClashConfig {
        &self.config
    }

    /// Run a full detection pass
    pub fn detect<N>(&self, input: &[PlacedMesh<N>]) -> Result<ClashReport<N>>
    where
        N: Clone + Send + Sync,
    {
        self.detect_with_cancel(input, &CancellationToken::new())
    }

    /// Run a full detection pass, aborting with `ClashError::Cancelled` once
    /// `cancel` fires. The token is checked between candidate pairs.
    pub fn detect_with_cancel<N>(
        &self,
        input: &[PlacedMesh<N>],
        cancel: &CancellationToken,
    ) -> Result<ClashReport<N>>
    where
        N: Clone + Send + Sync,
    {
        let _span = info_span!("clash_detect", meshes = input.len()).entered();
        let start = Instant::now();

        let mut stats = ClashStats {
            mesh_count: input.len(),
            ..ClashStats::default()
        };

        let world = self.prepare_world(input);
        stats.skipped_meshes = world.iter().filter(|w| w.is_none()).count();

        let boxes: Vec<(usize, BoundingBox)> = world
            .iter()
            .enumerate()
            .filter_map(|(i, w)| w.as_ref().map(|w| (i, w.bounds)))
            .collect();

        if boxes.len() < 2 {
            info!("Not enough meshes to compare.");
            stats.elapsed = start.elapsed();
            return Ok(ClashReport::empty(stats));
        }

        stats.pair_count = boxes.len() * (boxes.len() - 1) / 2;
        let candidates = self.broad_phase(&boxes, cancel)?;
        stats.candidate_count = candidates.len();
        debug!(
            pairs = stats.pair_count,
            candidates = candidates.len(),
            strategy = ?self.config.broad_phase,
            "broad phase done"
        );

        let outcomes = self.narrow_phase(input, &world, &candidates, cancel)?;

        let mut results = Vec::with_capacity(outcomes.len());
        for (result, tests) in outcomes {
            stats.triangle_tests += tests;
            results.extend(result);
        }
        results.sort_by_key(|r| (r.mesh_a, r.mesh_b));
        stats.confirmed_count = results.iter().filter(|r| r.confirmed).count();

        let combined = (self.config.combine == CombineMode::Union && !results.is_empty())
            .then(|| Self::combine_clashing(&world, &results));

        stats.elapsed = start.elapsed();
        info!(
            clashes = results.len(),
            candidates = stats.candidate_count,
            triangle_tests = stats.triangle_tests,
            elapsed_ms = stats.elapsed.as_secs_f64() * 1000.0,
            "clash detection finished"
        );

        Ok(ClashReport {
            results,
            stats,
            combined,
        })
    }

    fn prepare_world<N: Sync>(&self, input: &[PlacedMesh<N>]) -> Vec<Option<WorldMesh>> {
        let prepare = |(i, placed): (usize, &PlacedMesh<N>)| {
            let world = WorldMesh::prepare(&placed.mesh, &placed.transform);
            if world.is_none() {
                if placed.mesh.is_empty() {
                    warn!(mesh = i, "skipping mesh without vertices");
                } else {
                    warn!(mesh = i, "skipping mesh with non-finite world coordinates");
                }
            }
            world
        };

        if self.config.parallel {
            input.par_iter().enumerate().map(prepare).collect()
        } else {
            input.iter().enumerate().map(prepare).collect()
        }
    }

    /// Candidate pairs `(i, j)`, `i < j`, in ascending order
    pub fn broad_phase(
        &self,
        boxes: &[(usize, BoundingBox)],
        cancel: &CancellationToken,
    ) -> Result<Vec<(usize, usize)>> {
        match self.config.broad_phase {
            BroadPhase::Bvh => {
                cancel.check()?;
                Ok(Bvh::build(boxes.to_vec()).overlapping_pairs())
            }
            BroadPhase::AllPairs => {
                let row = |a: usize| -> Result<Vec<(usize, usize)>> {
                    cancel.check()?;
                    let (i, box_i) = boxes[a];
                    Ok(boxes[a + 1..]
                        .iter()
                        .filter(|(_, box_j)| box_i.overlaps(box_j))
                        .map(|&(j, _)| (i.min(j), i.max(j)))
                        .collect())
                };

                let rows: Vec<Vec<(usize, usize)>> = if self.config.parallel {
                    (0..boxes.len()).into_par_iter().map(row).collect::<Result<_>>()?
                } else {
                    (0..boxes.len()).map(row).collect::<Result<_>>()?
                };

                let mut pairs: Vec<_> = rows.into_iter().flatten().collect();
                pairs.sort_unstable();
                Ok(pairs)
            }
        }
    }

    fn narrow_phase<N>(
        &self,
        input: &[PlacedMesh<N>],
        world: &[Option<WorldMesh>],
        candidates: &[(usize, usize)],
        cancel: &CancellationToken,
    ) -> Result<Vec<(Option<ClashResult<N>>, u64)>>
    where
        N: Clone + Send + Sync,
    {
        let test = |&(i, j): &(usize, usize)| -> Result<(Option<ClashResult<N>>, u64)> {
            cancel.check()?;
            let (Some(a), Some(b)) = (&world[i], &world[j]) else {
                return Ok((None, 0));
            };

            let (confirmed, tests) = if self.config.bounding_box_only {
                (false, 0)
            } else {
                let (hit, tests) = self.meshes_intersect(a, b);
                if !hit {
                    return Ok((None, tests));
                }
                (true, tests)
            };

            let geometry =
                (self.config.combine == CombineMode::PerClash).then(|| a.mesh.merge(&b.mesh));

            Ok((
                Some(ClashResult {
                    mesh_a: i,
                    mesh_b: j,
                    node_a: input[i].node.clone(),
                    node_b: input[j].node.clone(),
                    confirmed,
                    geometry,
                }),
                tests,
            ))
        };

        if self.config.parallel {
            candidates.par_iter().map(test).collect()
        } else {
            candidates.iter().map(test).collect()
        }
    }

    /// Exhaustive triangle-pair search, stopping at the first intersecting pair.
    ///
    /// Triangles are first restricted to those whose box reaches the other
    /// mesh's box, and pairs with disjoint triangle boxes are rejected before
    /// the exact test. Returns the hit flag and the number of exact tests run.
    pub fn meshes_intersect(&self, a: &WorldMesh, b: &WorldMesh) -> (bool, u64) {
        let near_b = triangles_near(&a.mesh, &b.bounds);
        let near_a = triangles_near(&b.mesh, &a.bounds);

        let mut tests = 0;
        for (tri_a, box_a) in &near_b {
            for (tri_b, box_b) in &near_a {
                if !box_a.overlaps(box_b) {
                    continue;
                }
                tests += 1;
                if self.intersector.intersects(tri_a, tri_b) {
                    return (true, tests);
                }
            }
        }
        (false, tests)
    }

    fn combine_clashing<N>(
        world: &[Option<WorldMesh>],
        results: &[ClashResult<N>],
    ) -> TriangleMesh {
        let mut involved: Vec<usize> = results
            .iter()
            .flat_map(|r| [r.mesh_a, r.mesh_b])
            .collect();
        involved.sort_unstable();
        involved.dedup();

        TriangleMesh::combine_all(
            involved
                .into_iter()
                .filter_map(|i| world[i].as_ref().map(|w| &w.mesh)),
        )
    }
}

impl Default for ClashDetector {
    fn default() -> Self {
        Self {
            config: ClashConfig::default(),
            intersector: TriangleIntersector::default(),
        }
    }
}

fn triangles_near(
    mesh: &TriangleMesh,
    region: &BoundingBox,
) -> Vec<([Point3<f64>; 3], BoundingBox)> {
    mesh.triangle_iter()
        .map(|tri| (tri, BoundingBox::from_triangle(&tri)))
        .filter(|(_, bbox)| bbox.overlaps(region))
        .collect()
}

/// Pairwise check of two world-space meshes.
///
/// Box overlap first; with `bounding_box_only` that is the answer, otherwise
/// the triangle search decides.
pub fn meshes_clash(a: &TriangleMesh, b: &TriangleMesh, config: &ClashConfig) -> Result<bool> {
    let detector = ClashDetector::new(config.clone())?;
    let world_a = WorldMesh {
        bounds: a.bounding_box()?,
        mesh: a.clone(),
    };
    let world_b = WorldMesh {
        bounds: b.bounding_box()?,
        mesh: b.clone(),
    };

    if !world_a.bounds.overlaps(&world_b.bounds) {
        return Ok(false);
    }
    if config.bounding_box_only {
        return Ok(true);
    }
    Ok(detector.meshes_intersect(&world_a, &world_b).0)
}
