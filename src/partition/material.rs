// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Face grouping by material index

use super::{Island, IslandGroup};
use crate::geometry::Mesh;
use crate::progress::Progress;
use ahash::AHashMap;

/// Group faces by material index, groups ordered by first appearance
///
/// Faces without a material form their own group. A vertex shared by faces of
/// different materials belongs to every one of those groups.
pub(super) fn material_islands(mesh: &Mesh, progress: &Progress) -> Vec<Island> {
    let mut slots: AHashMap<Option<u32>, usize> = AHashMap::new();
    let mut islands: Vec<Island> = Vec::new();

    for (face_index, face) in mesh.faces.iter().enumerate() {
        let slot = *slots.entry(face.material).or_insert_with(|| {
            islands.push(Island::new(
                IslandGroup::Material(face.material),
                Vec::new(),
                Vec::new(),
            ));
            islands.len() - 1
        });
        islands[slot].faces.push(face_index);
    }

    // stamp[v] == island index + 1 once v has joined that island
    let mut stamp = vec![0usize; mesh.vertex_count()];
    let total = islands.len();
    for (index, island) in islands.iter_mut().enumerate() {
        for &face_index in &island.faces {
            for &vertex in &mesh.faces[face_index].vertices {
                if stamp[vertex] != index + 1 {
                    stamp[vertex] = index + 1;
                    island.vertices.push(vertex);
                }
            }
        }
        progress.report(index + 1, total, "material groups");
    }

    islands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Face;
    use nalgebra::Point3;

    fn strip(materials: &[Option<u32>]) -> Mesh {
        // a strip of triangles, each sharing an edge with the next
        let mut mesh = Mesh::new("strip");
        for i in 0..materials.len() + 2 {
            mesh.add_vertex(Point3::new(i as f64, (i % 2) as f64, 0.0));
        }
        for (i, material) in materials.iter().enumerate() {
            mesh.add_face(Face {
                vertices: vec![i, i + 1, i + 2],
                material: *material,
            });
        }
        mesh
    }

    #[test]
    fn test_groups_follow_first_appearance() {
        let mesh = strip(&[Some(1), Some(0), Some(1), Some(0), Some(1)]);
        let islands = material_islands(&mesh, &Progress::none());

        assert_eq!(islands.len(), 2);
        assert_eq!(islands[0].group, IslandGroup::Material(Some(1)));
        assert_eq!(islands[0].faces, vec![0, 2, 4]);
        assert_eq!(islands[1].group, IslandGroup::Material(Some(0)));
        assert_eq!(islands[1].faces, vec![1, 3]);
    }

    #[test]
    fn test_shared_vertices_join_both_groups() {
        let mesh = strip(&[Some(0), Some(1)]);
        let islands = material_islands(&mesh, &Progress::none());

        assert_eq!(islands[0].vertices, vec![0, 1, 2]);
        assert_eq!(islands[1].vertices, vec![1, 2, 3]);
    }

    #[test]
    fn test_unassigned_faces_form_their_own_group() {
        let mesh = strip(&[None, Some(0), None]);
        let islands = material_islands(&mesh, &Progress::none());

        assert_eq!(islands.len(), 2);
        assert_eq!(islands[0].group, IslandGroup::Material(None));
        assert_eq!(islands[0].faces, vec![0, 2]);
    }
}
