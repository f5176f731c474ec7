// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh file importer

use super::{json, obj, stl};
use crate::geometry::Mesh;
use anyhow::{bail, Result};
use std::path::Path;

/// Import every mesh stored in a file, dispatching on its extension
///
/// OBJ files yield one mesh per `o` object, JSON files one mesh per document
/// entry, STL files a single mesh.
pub fn import_meshes(path: impl AsRef<Path>) -> Result<Vec<Mesh>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "obj" => obj::import_obj(path),
        "json" => json::import_json(path),
        "stl" => Ok(vec![stl::import_stl(path)?]),
        other => bail!(
            "Unsupported input format '{}' for {} (expected obj, json or stl)",
            other,
            path.display()
        ),
    }
}

/// Import a file that must contain exactly one mesh
pub fn import_mesh(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    let mut meshes = import_meshes(path)?;
    if meshes.len() != 1 {
        bail!(
            "{} contains {} meshes, expected exactly one",
            path.display(),
            meshes.len()
        );
    }
    Ok(meshes.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_import_obj_file() -> Result<()> {
        let mut file = NamedTempFile::with_suffix(".obj")?;
        writeln!(file, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3")?;

        let mesh = import_mesh(file.path())?;
        assert_eq!(mesh.face_count(), 1);
        assert!(!mesh.name.is_empty());
        Ok(())
    }

    #[test]
    fn test_import_multi_object_as_single_fails() -> Result<()> {
        let mut file = NamedTempFile::with_suffix(".obj")?;
        writeln!(
            file,
            "o a\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\no b\nv 5 0 0\nf 2 3 4"
        )?;

        assert_eq!(import_meshes(file.path())?.len(), 2);
        assert!(import_mesh(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_unknown_extension() -> Result<()> {
        let file = NamedTempFile::with_suffix(".ply")?;
        let err = import_meshes(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported input format"));
        Ok(())
    }
}
