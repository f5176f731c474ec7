// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygon mesh representation and utilities

use super::BoundingBox;
use crate::error::MeshDefect;
use nalgebra::{Matrix4, Point3};
use serde::{Deserialize, Serialize};

/// Polygon defined by an ordered loop of vertex indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub vertices: Vec<usize>,
    /// Index into the owning mesh's material slots; `None` when unassigned
    #[serde(default)]
    pub material: Option<u32>,
}

impl Face {
    pub fn new(vertices: Vec<usize>) -> Self {
        Self {
            vertices,
            material: None,
        }
    }

    pub fn with_material(vertices: Vec<usize>, material: u32) -> Self {
        Self {
            vertices,
            material: Some(material),
        }
    }

    pub fn triangle(indices: [usize; 3]) -> Self {
        Self::new(indices.to_vec())
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Consecutive vertex pairs of the loop, including the closing pair
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Fan triangulation of the loop around its first vertex
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let n = self.vertices.len();
        (1..n.saturating_sub(1))
            .map(move |i| [self.vertices[0], self.vertices[i], self.vertices[i + 1]])
    }
}

fn identity() -> Matrix4<f64> {
    Matrix4::identity()
}

/// Polygon mesh with per-face material assignment and a world placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(default)]
    pub name: String,
    pub positions: Vec<Point3<f64>>,
    pub faces: Vec<Face>,
    /// Material slot names, addressed by `Face::material`
    #[serde(default)]
    pub materials: Vec<String>,
    /// Local-to-world transform
    #[serde(default = "identity")]
    pub transform: Matrix4<f64>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positions: Vec::new(),
            faces: Vec::new(),
            materials: Vec::new(),
            transform: Matrix4::identity(),
        }
    }

    pub fn empty() -> Self {
        Self::new("")
    }

    pub fn with_capacity(name: impl Into<String>, vertex_count: usize, face_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            ..Self::new(name)
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        let index = self.positions.len();
        self.positions.push(position);
        index
    }

    /// Add a face and return its index
    pub fn add_face(&mut self, face: Face) -> usize {
        let index = self.faces.len();
        self.faces.push(face);
        index
    }

    /// Return the slot index for a material name, appending it if missing
    pub fn material_slot(&mut self, name: &str) -> u32 {
        if let Some(index) = self.materials.iter().position(|m| m == name) {
            return index as u32;
        }
        self.materials.push(name.to_string());
        (self.materials.len() - 1) as u32
    }

    /// Name of the material assigned to a face, if the slot exists
    pub fn material_name(&self, face: usize) -> Option<&str> {
        let index = self.faces.get(face)?.material?;
        self.materials.get(index as usize).map(String::as_str)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of triangles after fan triangulation
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(|f| f.len().saturating_sub(2)).sum()
    }

    /// Check that every face has at least three vertices and that all
    /// referenced vertices exist
    pub fn validate(&self) -> std::result::Result<(), MeshDefect> {
        let vertex_count = self.positions.len();
        for (face_index, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(MeshDefect::FaceTooSmall {
                    face: face_index,
                    len: face.len(),
                });
            }
            if let Some(&vertex) = face.vertices.iter().find(|&&v| v >= vertex_count) {
                return Err(MeshDefect::VertexOutOfRange {
                    face: face_index,
                    vertex,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Flags for vertices used by at least one face
    pub fn referenced_vertices(&self) -> Vec<bool> {
        let mut used = vec![false; self.positions.len()];
        for face in &self.faces {
            for &v in &face.vertices {
                if let Some(flag) = used.get_mut(v) {
                    *flag = true;
                }
            }
        }
        used
    }

    /// Vertex positions mapped through the world transform
    pub fn world_positions(&self) -> Vec<Point3<f64>> {
        self.positions
            .iter()
            .map(|p| self.transform.transform_point(p))
            .collect()
    }

    /// Compute the local-space bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.positions)
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::empty()
    }
}
