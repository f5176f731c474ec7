// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Vertex adjacency derived from face boundary loops

use crate::geometry::Mesh;
use ahash::AHashSet;

/// Undirected edge between two vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub v0: usize,
    pub v1: usize,
}

impl Edge {
    pub fn new(v0: usize, v1: usize) -> Self {
        // Always store edges with smaller index first for consistent hashing
        if v0 < v1 {
            Self { v0, v1 }
        } else {
            Self { v0: v1, v1: v0 }
        }
    }
}

/// Vertex adjacency lists, one per vertex of the source mesh
///
/// Two vertices are adjacent when they are consecutive in some face loop.
/// Each undirected edge is stored once per endpoint no matter how many faces
/// share it.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    neighbors: Vec<Vec<usize>>,
    edge_count: usize,
}

impl AdjacencyGraph {
    /// Build the graph for a validated mesh
    pub fn build(mesh: &Mesh) -> Self {
        let mut neighbors = vec![Vec::new(); mesh.vertex_count()];
        let mut seen: AHashSet<Edge> = AHashSet::with_capacity(mesh.faces.len() * 3);

        for face in &mesh.faces {
            for (a, b) in face.edges() {
                if a == b {
                    continue;
                }
                if seen.insert(Edge::new(a, b)) {
                    neighbors[a].push(b);
                    neighbors[b].push(a);
                }
            }
        }

        Self {
            neighbors,
            edge_count: seen.len(),
        }
    }

    pub fn neighbors(&self, vertex: usize) -> &[usize] {
        self.neighbors.get(vertex).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn vertex_count(&self) -> usize {
        self.neighbors.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}
