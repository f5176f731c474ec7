// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - importing meshes and exporting split pieces

mod gltf;
mod importer;
mod json;
mod obj;
mod stl;

pub use gltf::export_gltf;
pub use importer::{import_mesh, import_meshes};
pub use json::{export_json, import_json, parse_json};
pub use obj::{export_obj, import_obj, parse_obj, parse_obj_objects, write_obj};
pub use stl::{export_stl, import_stl, stl_triangles};

use crate::geometry::Mesh;
use ahash::AHashSet;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output format for split pieces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One OBJ file with an `o` block per piece, world-space positions
    Obj,
    /// JSON array of meshes, local positions plus transforms
    Json,
    /// A directory with one world-space STL file per piece
    Stl,
    /// GLTF with a sidecar .bin, one node per piece
    Gltf,
    /// Binary GLTF, one node per piece
    Glb,
}

impl ExportFormat {
    /// Guess the format from an output path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "obj" => Ok(ExportFormat::Obj),
            "json" => Ok(ExportFormat::Json),
            "stl" => Ok(ExportFormat::Stl),
            "gltf" => Ok(ExportFormat::Gltf),
            "glb" => Ok(ExportFormat::Glb),
            other => Err(format!(
                "unsupported format '{}' (expected obj, json, stl, gltf or glb)",
                other
            )),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Obj => "obj",
            ExportFormat::Json => "json",
            ExportFormat::Stl => "stl",
            ExportFormat::Gltf => "gltf",
            ExportFormat::Glb => "glb",
        };
        write!(f, "{}", name)
    }
}

/// Write pieces to `path` in the given format and return the files written
pub fn export_pieces(pieces: &[Mesh], path: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
    match format {
        ExportFormat::Obj => export_obj(pieces, path, true)?,
        ExportFormat::Json => export_json(pieces, path)?,
        ExportFormat::Stl => return export_stl(pieces, path),
        ExportFormat::Gltf => return gltf::export_gltf_separate(pieces, path),
        ExportFormat::Glb => gltf::export_glb(pieces, path)?,
    }
    Ok(vec![path.to_path_buf()])
}

/// One output path per batch input: `<dir>/<stem>.<ext>`, or `<dir>/<stem>/`
/// for stl
///
/// Inputs sharing a file stem get a `-2`, `-3`, ... suffix in input order.
pub fn batch_targets(inputs: &[PathBuf], dir: &Path, format: ExportFormat) -> Vec<PathBuf> {
    let mut used = AHashSet::new();
    inputs
        .iter()
        .map(|input| {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "mesh".to_string());
            let stem = unique_stem(&mut used, &stem);
            match format {
                ExportFormat::Stl => dir.join(stem),
                other => dir.join(format!("{}.{}", stem, other)),
            }
        })
        .collect()
}

/// Return `base`, or `base-N` with the smallest free `N >= 2`
///
/// Names are compared case-insensitively so the result is also unique on
/// case-folding file systems.
pub(crate) fn unique_stem(used: &mut AHashSet<String>, base: &str) -> String {
    let mut stem = base.to_string();
    let mut n = 2;
    while !used.insert(stem.to_lowercase()) {
        stem = format!("{}-{}", base, n);
        n += 1;
    }
    stem
}
