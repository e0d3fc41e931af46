// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Writes clashing geometry for visual inspection

use super::{export_obj, export_stl};
use crate::clash::{ClashReport, ClashResult};
use crate::geometry::TriangleMesh;
use crate::scene::NodeRef;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Mesh file format for clash geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshFormat {
    #[default]
    Obj,
    Stl,
}

impl MeshFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Obj => "obj",
            Self::Stl => "stl",
        }
    }
}

impl FromStr for MeshFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "obj" => Ok(Self::Obj),
            "stl" => Ok(Self::Stl),
            other => bail!("unsupported mesh format '{other}' (expected 'obj' or 'stl')"),
        }
    }
}

/// Export a mesh in the given format
pub fn export_mesh(mesh: &TriangleMesh, path: impl AsRef<Path>, format: MeshFormat) -> Result<()> {
    match format {
        MeshFormat::Obj => export_obj(mesh, path),
        MeshFormat::Stl => export_stl(mesh, path),
    }
}

/// File stem for one clash, e.g. `clash_0_wall-1_3_slab-2`.
///
/// Mesh indices keep the stem unique when a node carries several meshes.
pub fn clash_file_stem(result: &ClashResult<NodeRef>) -> String {
    format!(
        "clash_{}_{}_{}_{}",
        result.mesh_a,
        sanitize(&result.node_a.id),
        result.mesh_b,
        sanitize(&result.node_b.id)
    )
}

fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Write every geometry attached to `report` into `dir`: one file per clash
/// that carries geometry, plus `clashes_combined.<ext>` for a union mesh.
/// Returns the written paths in report order.
pub fn export_clashes(
    report: &ClashReport<NodeRef>,
    dir: impl AsRef<Path>,
    format: MeshFormat,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let mut written = Vec::new();
    for result in report.iter() {
        let Some(geometry) = &result.geometry else {
            continue;
        };
        let path = dir.join(format!(
            "{}.{}",
            clash_file_stem(result),
            format.extension()
        ));
        export_mesh(geometry, &path, format)?;
        debug!(path = %path.display(), "wrote clash geometry");
        written.push(path);
    }

    if let Some(combined) = &report.combined {
        let path = dir.join(format!("clashes_combined.{}", format.extension()));
        export_mesh(combined, &path, format)?;
        debug!(path = %path.display(), "wrote combined clash geometry");
        written.push(path);
    }

    Ok(written)
}
