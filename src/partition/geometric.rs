// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Connected components by iterative flood fill

use super::{AdjacencyGraph, Island, IslandGroup};
use crate::geometry::Mesh;
use crate::progress::Progress;

const UNLABELED: usize = usize::MAX;

/// Find the connected components of the face-referenced vertices
///
/// Seeds are taken in ascending vertex id; each component is expanded with an
/// explicit work stack. Faces are then assigned to the component of their
/// first vertex, which is the component of all their vertices since every
/// face loop is connected in the graph.
pub(super) fn connected_islands(
    mesh: &Mesh,
    graph: &AdjacencyGraph,
    progress: &Progress,
) -> Vec<Island> {
    let vertex_count = mesh.vertex_count();
    let referenced = mesh.referenced_vertices();
    let total = referenced.iter().filter(|&&used| used).count();
    let mut visited = 0usize;
    let mut label = vec![UNLABELED; vertex_count];
    let mut islands: Vec<Island> = Vec::new();
    let mut stack = Vec::new();

    for seed in 0..vertex_count {
        if label[seed] != UNLABELED || !referenced[seed] {
            continue;
        }

        let island_index = islands.len();
        let mut vertices = Vec::new();
        stack.push(seed);

        while let Some(vertex) = stack.pop() {
            if label[vertex] != UNLABELED {
                continue;
            }
            label[vertex] = island_index;
            vertices.push(vertex);

            stack.extend(
                graph
                    .neighbors(vertex)
                    .iter()
                    .copied()
                    .filter(|&next| label[next] == UNLABELED),
            );
        }

        visited += vertices.len();
        islands.push(Island::new(IslandGroup::Connected, vertices, Vec::new()));
        progress.report(visited, total, "flood fill");
    }

    for (face_index, face) in mesh.faces.iter().enumerate() {
        let owner = label[face.vertices[0]];
        debug_assert!(face.vertices.iter().all(|&v| label[v] == owner));
        islands[owner].faces.push(face_index);
    }

    islands
}
