// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - scene import and mesh export

mod clash_export;
mod export_obj;
mod exporter;
mod scene_json;

pub use clash_export::{clash_file_stem, export_clashes, export_mesh, MeshFormat};
pub use export_obj::{export_obj, write_obj};
pub use exporter::{export_stl, write_stl};
pub use scene_json::{load_scene, parse_scene, save_scene};
