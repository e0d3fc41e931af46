// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene JSON importer

use crate::scene::Scene;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse a scene document.
///
/// ```json
/// { "name": "site", "root": { "id": "n0", "transform": [16 numbers, column-major],
///   "meshes": [{ "vertices": [[0,0,0], ...], "triangles": [[0,1,2], ...] }],
///   "properties": { "ifc_type": "IfcWall" }, "children": [] } }
/// ```
pub fn parse_scene(source: &str) -> Result<Scene> {
    serde_json::from_str(source).context("Failed to parse scene JSON")
}

/// Read and parse a scene file
pub fn load_scene(path: impl AsRef<Path>) -> Result<Scene> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene file: {}", path.display()))?;

    parse_scene(&source).with_context(|| format!("Failed to load scene file: {}", path.display()))
}

/// Write a scene back out as pretty-printed JSON
pub fn save_scene(scene: &Scene, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(scene).context("Failed to serialize scene")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write scene file: {}", path.display()))?;
    Ok(())
}
