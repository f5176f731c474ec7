// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use super::summary::MeshSummary;
use crate::partition::IslandGroup;
use colored::*;
use std::path::PathBuf;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Print the island table of one mesh
    pub fn report_islands(summary: &MeshSummary) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Mesh:".bold(), summary.name.cyan());
        println!(
            "  {} {}   {} {}   {} {}",
            "Vertices:".bright_black(),
            summary.vertex_count.to_string().cyan(),
            "Faces:".bright_black(),
            summary.face_count.to_string().cyan(),
            "Islands:".bright_black(),
            summary.islands.len().to_string().green().bold()
        );
        println!("{}", "━".repeat(80).bright_black());

        for island in &summary.islands {
            let materials = if island.materials.is_empty() {
                "-".to_string()
            } else {
                island.materials.join(", ")
            };
            println!(
                "  {:>4}  {:<18} {:>8} v {:>8} f  {} ({:.3}, {:.3}, {:.3})  {}",
                format!("#{}", island.index + 1).bold(),
                Self::group_label(island.group),
                island.vertex_count,
                island.face_count,
                "center".bright_black(),
                island.center[0],
                island.center[1],
                island.center[2],
                materials.yellow()
            );
        }

        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report a finished split
    pub fn report_split(source: &str, pieces: usize, files: &[PathBuf], duration: Duration) {
        println!(
            "{} {} {} {} {}",
            "✅".green(),
            source.cyan(),
            "→".bright_black(),
            format!("{} pieces", pieces).green().bold(),
            format!("({})", Self::format_duration(duration)).bright_black()
        );
        for file in files {
            println!("   {}", file.display().to_string().bright_black());
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    fn group_label(group: IslandGroup) -> String {
        match group {
            IslandGroup::Connected => "loose part".to_string(),
            IslandGroup::Material(Some(index)) => format!("material {}", index),
            IslandGroup::Material(None) => "unassigned".to_string(),
            IslandGroup::Orphan => "orphan vertex".to_string(),
        }
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
