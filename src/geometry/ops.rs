// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Post-split mesh operations: origin recentering and material slot cleanup

use super::Mesh;
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// How the center of a piece is computed when recentering its origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CenterMode {
    /// Mean of all vertex positions
    #[default]
    Median,
    /// Center of the axis-aligned bounding box
    Bounds,
    /// Area-weighted centroid of the surface
    SurfaceMass,
}

impl FromStr for CenterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "median" => Ok(CenterMode::Median),
            "bounds" => Ok(CenterMode::Bounds),
            "mass" | "surface_mass" | "surface-mass" => Ok(CenterMode::SurfaceMass),
            other => Err(format!(
                "unknown center mode '{}' (expected median, bounds or mass)",
                other
            )),
        }
    }
}

impl fmt::Display for CenterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CenterMode::Median => write!(f, "median"),
            CenterMode::Bounds => write!(f, "bounds"),
            CenterMode::SurfaceMass => write!(f, "mass"),
        }
    }
}

/// Local-space center of a mesh, `None` when it has no vertices
pub fn centroid(mesh: &Mesh, mode: CenterMode) -> Option<Point3<f64>> {
    if mesh.positions.is_empty() {
        return None;
    }

    match mode {
        CenterMode::Median => Some(median_point(&mesh.positions)),
        CenterMode::Bounds => Some(mesh.bounding_box().center()),
        CenterMode::SurfaceMass => {
            surface_center(mesh).or_else(|| Some(median_point(&mesh.positions)))
        }
    }
}

fn median_point(points: &[Point3<f64>]) -> Point3<f64> {
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

fn surface_center(mesh: &Mesh) -> Option<Point3<f64>> {
    let mut weighted = Vector3::zeros();
    let mut total_area = 0.0;

    for face in &mesh.faces {
        for [a, b, c] in face.triangles() {
            let (Some(pa), Some(pb), Some(pc)) = (
                mesh.positions.get(a),
                mesh.positions.get(b),
                mesh.positions.get(c),
            ) else {
                continue;
            };
            let area = 0.5 * (pb - pa).cross(&(pc - pa)).norm();
            weighted += (pa.coords + pb.coords + pc.coords) / 3.0 * area;
            total_area += area;
        }
    }

    if total_area <= f64::EPSILON {
        return None;
    }
    Some(Point3::from(weighted / total_area))
}

/// Move the mesh origin to its center without moving it in world space
///
/// Local positions are shifted by the negated center and the transform is
/// post-multiplied by the matching translation. Returns the applied offset.
pub fn recenter(mesh: &mut Mesh, mode: CenterMode) -> Option<Vector3<f64>> {
    let offset = centroid(mesh, mode)?.coords;

    for position in &mut mesh.positions {
        *position -= offset;
    }
    mesh.transform *= Matrix4::new_translation(&offset);

    debug!(mesh = %mesh.name, ?mode, x = offset.x, y = offset.y, z = offset.z, "recentered origin");
    Some(offset)
}

/// Remove material slots no face refers to and compact the remaining indices
///
/// Faces pointing past the end of the slot list keep their index unchanged.
/// Returns the number of removed slots.
pub fn clear_unused_materials(mesh: &mut Mesh) -> usize {
    let slot_count = mesh.materials.len();
    let mut used = vec![false; slot_count];
    for face in &mesh.faces {
        if let Some(slot) = face.material.and_then(|m| used.get_mut(m as usize)) {
            *slot = true;
        }
    }

    let mut remap = vec![None; slot_count];
    let mut kept = Vec::with_capacity(slot_count);
    for (index, name) in mesh.materials.drain(..).enumerate() {
        if used[index] {
            remap[index] = Some(kept.len() as u32);
            kept.push(name);
        }
    }
    mesh.materials = kept;

    for face in &mut mesh.faces {
        if let Some(new_index) = face
            .material
            .and_then(|m| remap.get(m as usize).copied().flatten())
        {
            face.material = Some(new_index);
        }
    }

    let removed = slot_count - mesh.materials.len();
    if removed > 0 {
        debug!(mesh = %mesh.name, removed, "cleared unused material slots");
    }
    removed
}
