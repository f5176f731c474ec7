// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Split a file, export the pieces, read them back

use anyhow::Result;
use approx::assert_relative_eq;
use meshsplit::io::{self, ExportFormat};
use meshsplit::{split, split_all, CenterMode, PartitionMode, SplitConfig};
use nalgebra::{Matrix4, Point3, Vector3};
use tempfile::tempdir;

const CRATES: &str = "\
# two crates and a lid, lid shares an edge with the first crate
o crates
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 4 0 0
v 5 0 0
v 5 1 0
v 4 1 0
v 0 2 0
v 1 2 0
usemtl wood
f 1 2 3 4
f 5 6 7 8
usemtl metal
f 4 3 10 9
";

#[test]
fn test_obj_round_trip_keeps_pieces() -> Result<()> {
    let mesh = io::parse_obj(CRATES)?;
    assert_eq!(mesh.name, "crates");
    assert_eq!(mesh.materials, vec!["wood".to_string(), "metal".to_string()]);

    let pieces = split(&mesh, &SplitConfig::default())?;
    assert_eq!(pieces.len(), 2);
    assert_eq!(pieces[0].face_count(), 2);
    assert_eq!(pieces[1].face_count(), 1);

    let dir = tempdir()?;
    let path = dir.path().join("pieces.obj");
    let written = io::export_pieces(&pieces, &path, ExportFormat::Obj)?;
    assert_eq!(written, vec![path.clone()]);

    let reread = io::import_meshes(&path)?;
    assert_eq!(reread.len(), 2);
    for (original, copy) in pieces.iter().zip(&reread) {
        assert_eq!(copy.name, original.name);
        assert_eq!(copy.vertex_count(), original.vertex_count());
        assert_eq!(copy.face_count(), original.face_count());
        for face in 0..copy.face_count() {
            assert_eq!(copy.material_name(face), original.material_name(face));
            // local numbering may differ, corner positions may not
            let corners = |mesh: &meshsplit::Mesh| -> Vec<Point3<f64>> {
                mesh.faces[face]
                    .vertices
                    .iter()
                    .map(|&v| mesh.positions[v])
                    .collect()
            };
            assert_eq!(corners(copy), corners(original));
        }
    }
    Ok(())
}

#[test]
fn test_material_split_through_files() -> Result<()> {
    let mesh = io::parse_obj(CRATES)?;
    let config = SplitConfig {
        mode: PartitionMode::ByMaterial,
        clear_unused_materials: true,
        ..SplitConfig::default()
    };

    let pieces = split(&mesh, &config)?;
    assert_eq!(pieces.len(), 2);
    assert_eq!(pieces[0].materials, vec!["wood".to_string()]);
    assert_eq!(pieces[1].materials, vec!["metal".to_string()]);
    assert_eq!(pieces[1].vertex_count(), 4);
    Ok(())
}

#[test]
fn test_json_round_trip_keeps_recentered_transform() -> Result<()> {
    let mut mesh = io::parse_obj(CRATES)?;
    mesh.transform = Matrix4::new_translation(&Vector3::new(0.0, 0.0, 10.0));

    let config = SplitConfig {
        recenter: true,
        center: CenterMode::Bounds,
        ..SplitConfig::default()
    };
    let pieces = split(&mesh, &config)?;

    let dir = tempdir()?;
    let path = dir.path().join("pieces.json");
    io::export_pieces(&pieces, &path, ExportFormat::Json)?;
    let reread = io::import_meshes(&path)?;
    assert_eq!(reread, pieces);

    // second crate: bounds center (4.5, 0.5, 0) in the source frame
    let origin = reread[1].transform.transform_point(&Point3::origin());
    assert_relative_eq!(origin, Point3::new(4.5, 0.5, 10.0));
    assert_relative_eq!(
        reread[1].world_positions()[0],
        Point3::new(4.0, 0.0, 10.0),
        epsilon = 1e-12
    );
    Ok(())
}

#[test]
fn test_stl_export_writes_one_file_per_piece() -> Result<()> {
    let mesh = io::parse_obj(CRATES)?;
    let pieces = split(&mesh, &SplitConfig::default())?;

    let dir = tempdir()?;
    let out = dir.path().join("stl");
    let files = io::export_pieces(&pieces, &out, ExportFormat::Stl)?;
    assert_eq!(files.len(), pieces.len());

    for (file, piece) in files.iter().zip(&pieces) {
        let reread = io::import_stl(file)?;
        assert_eq!(reread.face_count(), piece.triangle_count());
    }
    Ok(())
}

#[test]
fn test_glb_export_of_split_pieces() -> Result<()> {
    let mesh = io::parse_obj(CRATES)?;
    let pieces = split(&mesh, &SplitConfig::default())?;

    let dir = tempdir()?;
    let path = dir.path().join("pieces.glb");
    io::export_pieces(&pieces, &path, ExportFormat::Glb)?;

    let bytes = std::fs::read(&path)?;
    assert_eq!(&bytes[0..4], b"glTF");
    let declared = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    assert_eq!(declared as usize, bytes.len());
    Ok(())
}

#[test]
fn test_multi_object_file_splits_every_object() -> Result<()> {
    let source = format!("{}o extra\nv 9 9 9\nv 9 8 9\nv 8 9 9\nf -3 -2 -1\n", CRATES);
    let dir = tempdir()?;
    let path = dir.path().join("scene.obj");
    std::fs::write(&path, source)?;

    let meshes = io::import_meshes(&path)?;
    assert_eq!(meshes.len(), 2);
    assert_eq!(meshes[1].name, "extra");

    let outcomes = split_all(&meshes, &SplitConfig::default())?;
    assert_eq!(outcomes[0].source, "crates");
    assert_eq!(outcomes[0].pieces.len(), 2);
    assert_eq!(outcomes[1].pieces.len(), 1);
    Ok(())
}
