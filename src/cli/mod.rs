// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI subsystem for meshsplit

pub mod reporter;
pub mod summary;

pub use reporter::Reporter;
pub use summary::{IslandSummary, MeshSummary};
