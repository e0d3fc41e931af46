// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Clash detection between world-placed meshes

mod cancel;
mod config;
mod detector;

pub use cancel::CancellationToken;
pub use config::{BroadPhase, ClashConfig, CombineMode, DEFAULT_CONFIG_FILE};
pub use detector::{
    meshes_clash, ClashDetector, ClashReport, ClashResult, ClashStats, PlacedMesh, WorldMesh,
};
