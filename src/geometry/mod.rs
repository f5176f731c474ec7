// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation and post-split operations

mod bbox;
mod mesh;
pub mod ops;

pub use bbox::BoundingBox;
pub use mesh::{Face, Mesh};
pub use ops::{centroid, clear_unused_materials, recenter, CenterMode};
